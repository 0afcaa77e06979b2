//! Core lolliplot functionality
//!
//! This module contains the exon and association data model, intron gap
//! compression, and plot geometry generation.

mod association;
pub mod compress;
mod error;
mod exon;
pub mod geometry;
pub mod io;

pub use association::{sign, AssociationRecord};
pub use compress::{
    compress, CompatMode, CompressionMap, CompressionStep, Compressed, GapCompressor,
    OverlapPolicy, DEFAULT_GAP_WIDTH,
};
pub use error::{
    CoreError, CoreResult, LolliplotError, Result, TableError, TableResult, UnavailableError,
};
pub use exon::{annotate_exons, filter_transcript, ExonIndex, ExonInterval};
pub use geometry::{
    max_abs_effect, CategoryGroups, DrawPrimitive, Figure, GeometryBuilder, Layer, LayerKind,
    Layout, PlotConfig, Point, Polyline, SizeMode, EXON_LAYER_NAME,
};
pub use io::{detect_compression, open_text, CompressionFormat};
