//! Association table reader
//!
//! Reads whitespace-delimited association results with a header line, such
//! as regenie step 2 output. Lines starting with `#` are skipped. Which
//! columns feed which plot role is set by a [`ColumnConfig`].

use crate::core::io::{data_lines, open_text};
use crate::core::{AssociationRecord, CoreError, CoreResult, TableError, TableResult};
use log::{debug, warn};
use std::io::BufRead;
use std::path::Path;

/// Missing-value marker written by regenie and R
pub const MISSING_VALUE: &str = "NA";

/// Column names for each plot role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    /// Genomic position (x axis)
    pub position_col: String,
    /// Marker height (y axis)
    pub score_col: String,
    /// Marker size
    pub size_col: String,
    /// Marker colour / legend group
    pub color_col: String,
    /// Sign places the marker above or below the baseline
    pub direction_col: String,
    /// Variant identifier, used to join mask annotations
    pub id_col: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            position_col: "GENPOS".to_string(),
            score_col: "LOG10P".to_string(),
            size_col: "BETA".to_string(),
            color_col: "MASK".to_string(),
            direction_col: "BETA".to_string(),
            id_col: "ID".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Create a validated column configuration
    pub fn new(
        position_col: impl Into<String>,
        score_col: impl Into<String>,
        size_col: impl Into<String>,
        color_col: impl Into<String>,
        direction_col: impl Into<String>,
        id_col: impl Into<String>,
    ) -> CoreResult<Self> {
        let config = Self {
            position_col: position_col.into(),
            score_col: score_col.into(),
            size_col: size_col.into(),
            color_col: color_col.into(),
            direction_col: direction_col.into(),
            id_col: id_col.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Column names must be non-empty single tokens
    pub fn validate(&self) -> CoreResult<()> {
        for (role, name) in self.roles() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(CoreError::InvalidInput(format!(
                    "{} column name '{}' must be a non-empty single word",
                    role, name
                )));
            }
        }
        Ok(())
    }

    fn roles(&self) -> [(&'static str, &str); 6] {
        [
            ("position", self.position_col.as_str()),
            ("score", self.score_col.as_str()),
            ("size", self.size_col.as_str()),
            ("color", self.color_col.as_str()),
            ("direction", self.direction_col.as_str()),
            ("id", self.id_col.as_str()),
        ]
    }
}

/// Where record categories come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySource {
    /// The configured colour column must exist in the table
    #[default]
    Column,
    /// Categories are assigned later (e.g. by a mask join); the colour
    /// column is used if present
    External,
}

/// Header positions of each configured column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub position: usize,
    pub score: usize,
    pub size: usize,
    pub direction: usize,
    pub color: Option<usize>,
    pub id: Option<usize>,
}

impl ColumnIndices {
    /// Resolve configured names against a header line
    pub fn resolve(header: &str, config: &ColumnConfig, source: CategorySource) -> TableResult<Self> {
        let names: Vec<&str> = header.split_whitespace().collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &str| find(name).ok_or_else(|| TableError::MissingColumn(name.to_string()));

        let color = match source {
            CategorySource::Column => Some(require(&config.color_col)?),
            CategorySource::External => find(&config.color_col),
        };

        Ok(Self {
            position: require(&config.position_col)?,
            score: require(&config.score_col)?,
            size: require(&config.size_col)?,
            direction: require(&config.direction_col)?,
            color,
            id: find(&config.id_col),
        })
    }

    fn width(&self) -> usize {
        [self.position, self.score, self.size, self.direction]
            .into_iter()
            .chain(self.color)
            .chain(self.id)
            .max()
            .map_or(0, |m| m + 1)
    }
}

/// Outcome of parsing one row
enum Row {
    Record(AssociationRecord),
    Missing,
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], index: usize, name: &str, line: usize) -> TableResult<Option<T>> {
    let value = fields[index];
    if value == MISSING_VALUE {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid_number(line, name, value))
}

/// Like `parse_field`, but `NaN` and infinities are invalid
fn parse_finite(fields: &[&str], index: usize, name: &str, line: usize) -> TableResult<Option<f64>> {
    match parse_field::<f64>(fields, index, name, line)? {
        Some(v) if !v.is_finite() => Err(invalid_number(line, name, fields[index])),
        parsed => Ok(parsed),
    }
}

fn invalid_number(line: usize, field: &str, value: &str) -> TableError {
    TableError::InvalidNumber {
        line,
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_row(line: &str, line_number: usize, columns: &ColumnIndices, config: &ColumnConfig) -> TableResult<Row> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < columns.width() {
        return Err(TableError::FieldCount {
            line: line_number,
            expected: columns.width(),
            found: fields.len(),
        });
    }

    let position: Option<i64> = parse_field(&fields, columns.position, &config.position_col, line_number)?;
    let score = parse_finite(&fields, columns.score, &config.score_col, line_number)?;
    let size = parse_finite(&fields, columns.size, &config.size_col, line_number)?;
    let direction = parse_finite(&fields, columns.direction, &config.direction_col, line_number)?;

    let (position, score, size, direction) = match (position, score, size, direction) {
        (Some(p), Some(s), Some(e), Some(d)) => (p, s, e, d),
        _ => return Ok(Row::Missing),
    };

    let category = columns.color.map(|i| fields[i].to_string()).unwrap_or_default();
    let mut record = AssociationRecord::new(position, score, size, category);
    record.direction = direction;
    record.id = columns.id.map(|i| fields[i].to_string());
    Ok(Row::Record(record))
}

/// Read association records from any reader
///
/// Rows with `NA` in a numeric role are skipped with a warning.
pub fn read_association_table<R: BufRead>(
    reader: R,
    config: &ColumnConfig,
    source: CategorySource,
) -> TableResult<Vec<AssociationRecord>> {
    let mut lines = data_lines(reader);
    let header = match lines.next() {
        Some(line) => line?.1,
        None => return Err(TableError::MissingHeader),
    };
    let columns = ColumnIndices::resolve(&header, config, source)?;

    let mut records = Vec::new();
    let mut missing = 0usize;
    for line in lines {
        let (line_number, line) = line?;
        match parse_row(&line, line_number, &columns, config)? {
            Row::Record(record) => records.push(record),
            Row::Missing => missing += 1,
        }
    }

    if missing > 0 {
        warn!("Skipped {} association rows with missing values", missing);
    }
    debug!("Read {} association rows", records.len());
    Ok(records)
}

/// Read an association table from a plain or compressed file
pub fn read_association_file(
    path: &Path,
    config: &ColumnConfig,
    source: CategorySource,
) -> TableResult<Vec<AssociationRecord>> {
    if !path.exists() {
        return Err(TableError::FileNotFound(path.to_path_buf()));
    }
    read_association_table(open_text(path)?, config, source)
}
