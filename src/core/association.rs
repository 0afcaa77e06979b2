//! Association results drawn as lollipops

/// One association result at a genomic position
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRecord {
    /// Genomic coordinate (rewritten by gap compression)
    pub position: i64,
    /// Marker height, e.g. -log10 p-value
    pub score: f64,
    /// Signed effect size; its magnitude sets the marker size
    pub effect_size: f64,
    /// Sign of this value places the marker above or below the baseline
    pub direction: f64,
    /// Grouping key for colour and legend
    pub category: String,
    /// Variant identifier, if the source table has one
    pub id: Option<String>,
    /// Exon containing the position in genomic coordinates, set by
    /// [`annotate_exons`](crate::core::annotate_exons)
    pub exon_id: Option<String>,
}

impl AssociationRecord {
    /// Create a record whose direction follows its effect size
    pub fn new(position: i64, score: f64, effect_size: f64, category: impl Into<String>) -> Self {
        Self {
            position,
            score,
            effect_size,
            direction: effect_size,
            category: category.into(),
            id: None,
            exon_id: None,
        }
    }

    /// Attach a variant identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Signed marker height: `score * sign(direction)`, zero on the baseline
    pub fn signed_score(&self) -> f64 {
        self.score * sign(self.direction)
    }
}

/// Sign with `sign(0) = 0`
///
/// # Examples
/// ```
/// use lolliplot::core::sign;
/// assert_eq!(sign(2.5), 1.0);
/// assert_eq!(sign(-0.1), -1.0);
/// assert_eq!(sign(0.0), 0.0);
/// ```
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_score() {
        assert_eq!(AssociationRecord::new(1, 3.0, 0.5, "a").signed_score(), 3.0);
        assert_eq!(AssociationRecord::new(1, 3.0, -0.5, "a").signed_score(), -3.0);
        assert_eq!(AssociationRecord::new(1, 3.0, 0.0, "a").signed_score(), 0.0);
    }

    #[test]
    fn test_direction_overrides_effect_sign() {
        let mut record = AssociationRecord::new(1, 2.0, 0.5, "a");
        record.direction = -1.0;
        assert_eq!(record.signed_score(), -2.0);
    }

    #[test]
    fn test_with_id() {
        let record = AssociationRecord::new(1, 2.0, 0.5, "a").with_id("rs1");
        assert_eq!(record.id.as_deref(), Some("rs1"));
    }
}
