//! Exon intervals and a containment index over them
//!
//! Uses rust-lapper for O(log n + k) position lookups.

use crate::core::association::AssociationRecord;
use crate::core::error::{CoreError, CoreResult};
use rust_lapper::{Interval, Lapper};

/// One exon of a transcript, in genomic coordinates (inclusive on both ends)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExonInterval {
    pub gene_id: String,
    pub transcript_id: String,
    pub start: i64,
    pub end: i64,
    /// Gene span, as reported by the annotation source
    pub gene_start: i64,
    pub gene_end: i64,
    pub gene_name: String,
    pub exon_id: String,
}

impl ExonInterval {
    /// Create an exon with only the fields the core needs
    ///
    /// Fails with `InvalidInput` when `start > end`.
    pub fn new(exon_id: impl Into<String>, start: i64, end: i64) -> CoreResult<Self> {
        let exon_id = exon_id.into();
        if start > end {
            return Err(CoreError::InvalidInput(format!(
                "exon {}: start ({}) > end ({})",
                exon_id, start, end
            )));
        }
        Ok(Self {
            gene_id: String::new(),
            transcript_id: String::new(),
            start,
            end,
            gene_start: start,
            gene_end: end,
            gene_name: String::new(),
            exon_id,
        })
    }

    /// Width of the exon in bases
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    /// True for a zero-width exon
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `position` lies within the exon, ends included
    pub fn contains(&self, position: i64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Move both boundaries by `-shift`
    pub(crate) fn shift_left(&mut self, shift: i64) {
        self.start -= shift;
        self.end -= shift;
    }
}

/// Position lookup over a set of exons
///
/// Coordinates are rebased onto the smallest exon start so that exons pushed
/// below zero by an overlap shift can still be indexed.
pub struct ExonIndex<'a> {
    exons: &'a [ExonInterval],
    lapper: Lapper<u64, usize>,
    origin: i64,
}

impl<'a> ExonIndex<'a> {
    /// Build the index; each interval stores its position in `exons`
    pub fn new(exons: &'a [ExonInterval]) -> Self {
        let origin = exons.iter().map(|e| e.start).min().unwrap_or(0);
        let intervals = exons
            .iter()
            .enumerate()
            .map(|(i, exon)| Interval {
                start: (exon.start - origin) as u64,
                // Lapper stops are exclusive
                stop: (exon.end - origin) as u64 + 1,
                val: i,
            })
            .collect();

        Self {
            exons,
            lapper: Lapper::new(intervals),
            origin,
        }
    }

    /// All exons containing `position`, in index order
    pub fn find(&self, position: i64) -> Vec<&'a ExonInterval> {
        if position < self.origin {
            return Vec::new();
        }
        let pos = (position - self.origin) as u64;
        let mut hits: Vec<usize> = self.lapper.find(pos, pos + 1).map(|iv| iv.val).collect();
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.exons[i]).collect()
    }

    /// The first exon containing `position`, if any
    pub fn locate(&self, position: i64) -> Option<&'a ExonInterval> {
        self.find(position).into_iter().next()
    }

    /// Number of indexed exons
    pub fn len(&self) -> usize {
        self.exons.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }
}

/// Record which exon each association falls in
///
/// Run on genomic coordinates, before gap compression: compressed intronic
/// positions can sit on an exon boundary. Records outside every exon get
/// `None`.
pub fn annotate_exons(records: &mut [AssociationRecord], exons: &[ExonInterval]) {
    let index = ExonIndex::new(exons);
    for record in records.iter_mut() {
        record.exon_id = index.locate(record.position).map(|e| e.exon_id.clone());
    }
}

/// Restrict an exon table to one transcript
pub fn filter_transcript(exons: &[ExonInterval], transcript_id: &str) -> Vec<ExonInterval> {
    exons
        .iter()
        .filter(|e| e.transcript_id == transcript_id)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(id: &str, start: i64, end: i64) -> ExonInterval {
        ExonInterval::new(id, start, end).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(ExonInterval::new("E1", 200, 100).is_err());
        assert!(ExonInterval::new("E1", 100, 100).is_ok());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let e = exon("E1", 100, 150);
        assert!(e.contains(100));
        assert!(e.contains(150));
        assert!(!e.contains(99));
        assert!(!e.contains(151));
        assert_eq!(e.len(), 50);
    }

    #[test]
    fn test_index_locate() {
        let exons = vec![exon("E1", 100, 150), exon("E2", 200, 260), exon("E3", 500, 520)];
        let index = ExonIndex::new(&exons);

        assert_eq!(index.len(), 3);
        assert_eq!(index.locate(120).map(|e| e.exon_id.as_str()), Some("E1"));
        assert_eq!(index.locate(260).map(|e| e.exon_id.as_str()), Some("E2"));
        assert_eq!(index.locate(500).map(|e| e.exon_id.as_str()), Some("E3"));
        assert!(index.locate(300).is_none());
        assert!(index.locate(50).is_none());
        assert!(index.locate(521).is_none());
    }

    #[test]
    fn test_index_overlapping_exons() {
        let exons = vec![exon("E1", 100, 200), exon("E2", 150, 250)];
        let index = ExonIndex::new(&exons);
        let hits = index.find(175);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].exon_id, "E1");
        assert_eq!(hits[1].exon_id, "E2");
    }

    #[test]
    fn test_index_negative_coordinates() {
        let exons = vec![exon("E1", -40, -10), exon("E2", 0, 20)];
        let index = ExonIndex::new(&exons);
        assert_eq!(index.locate(-20).map(|e| e.exon_id.as_str()), Some("E1"));
        assert!(index.locate(-5).is_none());
        assert!(index.locate(-100).is_none());
    }

    #[test]
    fn test_annotate_exons() {
        let exons = vec![exon("E1", 100, 150), exon("E2", 200, 260)];
        let mut records = vec![
            AssociationRecord::new(150, 1.0, 1.0, "a"),
            AssociationRecord::new(180, 1.0, 1.0, "a"),
            AssociationRecord::new(200, 1.0, 1.0, "a"),
        ];
        records[1].exon_id = Some("stale".to_string());
        annotate_exons(&mut records, &exons);
        let ids: Vec<Option<&str>> = records.iter().map(|r| r.exon_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("E1"), None, Some("E2")]);
    }

    #[test]
    fn test_filter_transcript() {
        let mut a = exon("E1", 1, 2);
        a.transcript_id = "ENST1".to_string();
        let mut b = exon("E2", 3, 4);
        b.transcript_id = "ENST2".to_string();
        let filtered = filter_transcript(&[a, b], "ENST2");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].exon_id, "E2");
    }
}
