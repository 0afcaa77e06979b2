//! Error types for lolliplot
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lolliplot operations
#[derive(Debug, Error)]
pub enum LolliplotError {
    /// Compression or geometry errors
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Table parsing errors
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Reference data could not be obtained
    #[error("Reference data unavailable: {0}")]
    Unavailable(#[from] UnavailableError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Data-validity errors raised by gap compression and geometry building
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Malformed or empty input, or an invalid configured value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The largest absolute effect size is zero, so marker sizes cannot be scaled
    #[error("Degenerate marker scale: maximum |effect size| is zero")]
    DegenerateScale,

    /// A category group turned out empty
    #[error("Category '{0}' has no records")]
    EmptyCategory(String),
}

/// Errors that can occur while reading exon, association or mask tables
#[derive(Debug, Error)]
pub enum TableError {
    /// Wrong number of fields on a line
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Failed to parse a numeric field
    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        line: usize,
        field: String,
        value: String,
    },

    /// Coordinate validation error (start > end)
    #[error("Line {line}: exon start ({start}) > end ({end})")]
    InvalidRange { line: usize, start: i64, end: i64 },

    /// The association table has no header line
    #[error("Missing header line")]
    MissingHeader,

    /// A configured column is not present in the header
    #[error("Column '{0}' not found in header")]
    MissingColumn(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference exon annotations could not be obtained
#[derive(Debug, Error)]
pub enum UnavailableError {
    /// The local reference file does not exist
    #[error("Reference file not found: {0}")]
    Missing(PathBuf),

    /// The remote service could not be reached or answered with an error
    #[error("Download from {url} failed: {message}")]
    Download { url: String, message: String },

    /// The reference file exists but could not be parsed
    #[error("Reference table is invalid: {0}")]
    Invalid(#[from] TableError),

    /// I/O error while storing or reading the reference
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lolliplot operations
pub type Result<T> = std::result::Result<T, LolliplotError>;

/// Result type alias for compression and geometry operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Result type alias for table parsing operations
pub type TableResult<T> = std::result::Result<T, TableError>;
