//! File format adapters
//!
//! Readers for exon, association and mask tables, reference annotation
//! providers, and plotly figure output.

pub mod association_table;
pub mod exon_table;
pub mod figure;
pub mod masks;
pub mod reference;

pub use association_table::{read_association_file, read_association_table, CategorySource, ColumnConfig, ColumnIndices};
pub use exon_table::{parse_exon_line, read_exon_file, read_exon_table, ExonTable};
pub use masks::{merge_masks, read_mask_file, read_mask_table, MaskAnnotation};
pub use figure::{save_figure, to_plotly, write_html, write_json, OutputFormat};
#[cfg(feature = "download")]
pub use reference::BiomartReference;
pub use reference::{LocalReference, ReferenceDataProvider, DEFAULT_REFERENCE_PATH};
