//! Lolliplot - lollipop plots of association results over exon structure
//!
//! Draws each exon of a transcript as a rectangle and each association
//! result as a lollipop: positioned at its genomic coordinate, sized by
//! effect magnitude, coloured by category, and above or below the baseline
//! by effect direction.
//!
//! # Features
//!
//! - Intron gap compression that keeps exons and associations aligned
//! - Exon, marker and stem geometry in a fixed visual stacking order
//! - Readers for Ensembl exon exports, regenie results and mask files
//! - plotly.js JSON/HTML output
//!
//! # Example
//!
//! ```ignore
//! use lolliplot::{GapCompressor, GeometryBuilder, PlotConfig};
//!
//! let compressed = GapCompressor::new(10)?.compress(&exons, &associations)?;
//! let figure = GeometryBuilder::new(PlotConfig::with_title("IGF1R"))?
//!     .build_figure(&compressed.associations, &compressed.exons, "LOG10P", "MASK")?;
//! lolliplot::formats::save_figure(&figure, "igf1r.html".as_ref())?;
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    annotate_exons, compress, AssociationRecord, CompatMode, Compressed, CompressionMap, CoreError, DrawPrimitive,
    ExonIndex, ExonInterval, Figure, GapCompressor, GeometryBuilder, Layer, LayerKind,
    LolliplotError, OverlapPolicy, PlotConfig, SizeMode, TableError, UnavailableError,
};
pub use formats::{ColumnConfig, ExonTable, ReferenceDataProvider};
