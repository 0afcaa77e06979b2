//! Mask annotation reader and join
//!
//! Mask files (regenie `--anno-file`) list one variant per line:
//!
//! ```text
//! ID TID MASK
//! ```
//!
//! where `TID` names the transcript(s) the variant was annotated against.
//! Joining them with association results restricts the results to one
//! transcript and assigns each record its mask as category.

use crate::core::io::{data_lines, open_text};
use crate::core::{AssociationRecord, TableError, TableResult};
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Number of columns in a mask row
pub const MASK_COLUMNS: usize = 3;

/// One variant's mask annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskAnnotation {
    pub id: String,
    pub transcript: String,
    pub mask: String,
}

/// Parse one mask row
pub fn parse_mask_line(line: &str, line_number: usize) -> TableResult<MaskAnnotation> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != MASK_COLUMNS {
        return Err(TableError::FieldCount {
            line: line_number,
            expected: MASK_COLUMNS,
            found: fields.len(),
        });
    }
    Ok(MaskAnnotation {
        id: fields[0].to_string(),
        transcript: fields[1].to_string(),
        mask: fields[2].to_string(),
    })
}

/// Read mask annotations from any reader
pub fn read_mask_table<R: BufRead>(reader: R) -> TableResult<Vec<MaskAnnotation>> {
    let mut masks = Vec::new();
    for line in data_lines(reader) {
        let (line_number, line) = line?;
        masks.push(parse_mask_line(&line, line_number)?);
    }
    debug!("Read {} mask annotations", masks.len());
    Ok(masks)
}

/// Read mask annotations from a plain or compressed file
pub fn read_mask_file(path: &Path) -> TableResult<Vec<MaskAnnotation>> {
    if !path.exists() {
        return Err(TableError::FileNotFound(path.to_path_buf()));
    }
    read_mask_table(open_text(path)?)
}

/// Inner-join masks of one transcript with association records on variant id
///
/// A mask row is kept when its `TID` field contains `transcript_id`. Output
/// follows mask order, then record order for repeated ids; each record's
/// category becomes its mask. Records without an id never match.
pub fn merge_masks(
    masks: &[MaskAnnotation],
    records: &[AssociationRecord],
    transcript_id: &str,
) -> Vec<AssociationRecord> {
    let mut by_id: HashMap<&str, Vec<&AssociationRecord>> = HashMap::new();
    for record in records {
        if let Some(id) = record.id.as_deref() {
            by_id.entry(id).or_default().push(record);
        }
    }

    let mut merged = Vec::new();
    for mask in masks.iter().filter(|m| m.transcript.contains(transcript_id)) {
        if let Some(matches) = by_id.get(mask.id.as_str()) {
            for record in matches {
                let mut record = (*record).clone();
                record.category = mask.mask.clone();
                merged.push(record);
            }
        }
    }

    debug!(
        "Joined {} of {} association rows with masks for {}",
        merged.len(),
        records.len(),
        transcript_id
    );
    merged
}
