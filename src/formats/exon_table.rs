//! Exon table reader
//!
//! Reads the Ensembl BioMart exon export: eight whitespace-separated columns,
//! no header.
//!
//! ```text
//! gene_id transcript_id exon_start exon_end gene_start gene_end gene_name exon_id
//! ```

use crate::core::io::{data_lines, open_text};
use crate::core::{ExonInterval, TableError, TableResult};
use log::debug;
use std::io::BufRead;
use std::path::Path;

/// Number of columns in an exon table row
pub const EXON_COLUMNS: usize = 8;

/// All exons of an annotation file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExonTable {
    pub exons: Vec<ExonInterval>,
}

impl ExonTable {
    /// Exons of a single transcript, in file order
    pub fn transcript(&self, transcript_id: &str) -> Vec<ExonInterval> {
        crate::core::filter_transcript(&self.exons, transcript_id)
    }

    /// Exons of every transcript of a gene, matched by gene name or id
    pub fn gene(&self, gene: &str) -> Vec<ExonInterval> {
        self.exons
            .iter()
            .filter(|e| e.gene_name == gene || e.gene_id == gene)
            .cloned()
            .collect()
    }

    /// Transcript ids belonging to a gene, in first-seen order
    pub fn transcripts_of(&self, gene: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for exon in self.exons.iter().filter(|e| e.gene_name == gene || e.gene_id == gene) {
            if !ids.contains(&exon.transcript_id) {
                ids.push(exon.transcript_id.clone());
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.exons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }
}

fn parse_coord(field: &str, name: &str, line: usize) -> TableResult<i64> {
    field.parse().map_err(|_| TableError::InvalidNumber {
        line,
        field: name.to_string(),
        value: field.to_string(),
    })
}

/// Parse one exon row
pub fn parse_exon_line(line: &str, line_number: usize) -> TableResult<ExonInterval> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != EXON_COLUMNS {
        return Err(TableError::FieldCount {
            line: line_number,
            expected: EXON_COLUMNS,
            found: fields.len(),
        });
    }

    let start = parse_coord(fields[2], "exon start", line_number)?;
    let end = parse_coord(fields[3], "exon end", line_number)?;
    if start > end {
        return Err(TableError::InvalidRange {
            line: line_number,
            start,
            end,
        });
    }

    Ok(ExonInterval {
        gene_id: fields[0].to_string(),
        transcript_id: fields[1].to_string(),
        start,
        end,
        gene_start: parse_coord(fields[4], "gene start", line_number)?,
        gene_end: parse_coord(fields[5], "gene end", line_number)?,
        gene_name: fields[6].to_string(),
        exon_id: fields[7].to_string(),
    })
}

/// Read an exon table from any reader
pub fn read_exon_table<R: BufRead>(reader: R) -> TableResult<ExonTable> {
    let mut table = ExonTable::default();
    for line in data_lines(reader) {
        let (line_number, line) = line?;
        table.exons.push(parse_exon_line(&line, line_number)?);
    }
    debug!("Read {} exon rows", table.exons.len());
    Ok(table)
}

/// Read an exon table from a plain or compressed file
pub fn read_exon_file(path: &Path) -> TableResult<ExonTable> {
    if !path.exists() {
        return Err(TableError::FileNotFound(path.to_path_buf()));
    }
    read_exon_table(open_text(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
ENSG00000140443\tENST00000649865\t98648539\t98649524\t98648539\t98964530\tIGF1R\tENSE00003829343
ENSG00000140443\tENST00000649865\t98701760\t98701968\t98648539\t98964530\tIGF1R\tENSE00003814553
ENSG00000140443\tENST00000268035\t98648539\t98649524\t98648539\t98964530\tIGF1R\tENSE00001205417
";

    #[test]
    fn test_parse_exon_line() {
        let exon = parse_exon_line("G1 T1 100 150 90 600 GENE E1", 1).unwrap();
        assert_eq!(exon.gene_id, "G1");
        assert_eq!(exon.transcript_id, "T1");
        assert_eq!((exon.start, exon.end), (100, 150));
        assert_eq!((exon.gene_start, exon.gene_end), (90, 600));
        assert_eq!(exon.gene_name, "GENE");
        assert_eq!(exon.exon_id, "E1");
    }

    #[test]
    fn test_parse_exon_line_errors() {
        assert!(matches!(
            parse_exon_line("G1 T1 100 150", 3),
            Err(TableError::FieldCount { line: 3, expected: 8, found: 4 })
        ));
        assert!(matches!(
            parse_exon_line("G1 T1 abc 150 90 600 GENE E1", 2),
            Err(TableError::InvalidNumber { line: 2, .. })
        ));
        assert!(matches!(
            parse_exon_line("G1 T1 200 150 90 600 GENE E1", 5),
            Err(TableError::InvalidRange { line: 5, start: 200, end: 150 })
        ));
    }

    #[test]
    fn test_read_table_and_filter() {
        let table = read_exon_table(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.transcript("ENST00000649865").len(), 2);
        assert_eq!(table.gene("IGF1R").len(), 3);
        assert_eq!(
            table.transcripts_of("IGF1R"),
            vec!["ENST00000649865".to_string(), "ENST00000268035".to_string()]
        );
    }

    #[test]
    fn test_error_line_number_counts_comments() {
        let text = "# header comment\nG1 T1 1 2 1 2 G E1\nbroken\n";
        match read_exon_table(text.as_bytes()) {
            Err(TableError::FieldCount { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = read_exon_file(Path::new("/nonexistent/exons.tsv")).unwrap_err();
        assert!(matches!(err, TableError::FileNotFound(_)));
    }
}
