//! Lollipop plot geometry
//!
//! Turns exon intervals and association records into drawable primitives:
//! exon rectangles, per-category markers, and stems from each marker down
//! to the baseline.
//!
//! Layers are returned bottom first:
//! 1. "Exon regions"
//! 2. For each category, last-seen first: its stems, then its markers
//!
//! so the exon layer is always beneath every lollipop and the first-seen
//! category is drawn on top.

use crate::core::association::AssociationRecord;
use crate::core::error::{CoreError, CoreResult};
use crate::core::exon::ExonInterval;
use indexmap::IndexMap;

/// Name of the exon rectangle layer
pub const EXON_LAYER_NAME: &str = "Exon regions";

/// Default half-height of an exon rectangle
pub const DEFAULT_EXON_HALF_HEIGHT: f64 = 0.1;

/// Default size of the largest marker
pub const DEFAULT_MAX_MARKER_SIZE: f64 = 5.0;

/// Default stem line width
pub const DEFAULT_STEM_WIDTH: f64 = 0.1;

/// Outline width of exon rectangles
pub const EXON_LINE_WIDTH: f64 = 0.5;

/// A vertex of a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A path of vertices; `None` lifts the pen
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub vertices: Vec<Option<Point>>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex
    pub fn push(&mut self, x: f64, y: f64) {
        self.vertices.push(Some(Point::new(x, y)));
    }

    /// Append a path break
    pub fn lift(&mut self) {
        self.vertices.push(None);
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// X coordinates with `None` at path breaks
    pub fn xs(&self) -> Vec<Option<f64>> {
        self.vertices.iter().map(|v| v.map(|p| p.x)).collect()
    }

    /// Y coordinates with `None` at path breaks
    pub fn ys(&self) -> Vec<Option<f64>> {
        self.vertices.iter().map(|v| v.map(|p| p.y)).collect()
    }
}

/// A drawable item handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    /// Closed outline of one exon, followed by a path break
    ExonRectangle { polyline: Polyline },
    /// Lollipop head
    Marker {
        x: f64,
        y: f64,
        size: f64,
        category: String,
        /// Hover text: variant id and containing exon, when known
        label: Option<String>,
    },
    /// Line from a marker to the baseline, followed by a path break
    Stem { polyline: Polyline, category: String },
}

/// Kind of primitives a layer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Exons,
    Markers,
    Stems,
}

/// A named group of primitives drawn together
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    /// Legend entry this layer toggles with
    pub legend_group: Option<String>,
    pub show_legend: bool,
    pub line_width: f64,
    pub primitives: Vec<DrawPrimitive>,
}

/// How marker sizes follow |effect size|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Marker area is linear in |effect size|
    #[default]
    Area,
    /// Marker diameter is linear in |effect size|
    Diameter,
}

/// Plot appearance settings
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub exon_half_height: f64,
    pub max_marker_size: f64,
    pub stem_width: f64,
    pub size_mode: SizeMode,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1400,
            height: 500,
            exon_half_height: DEFAULT_EXON_HALF_HEIGHT,
            max_marker_size: DEFAULT_MAX_MARKER_SIZE,
            stem_width: DEFAULT_STEM_WIDTH,
            size_mode: SizeMode::Area,
        }
    }
}

impl PlotConfig {
    /// Default settings with a title
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Check that every size is positive and finite
    pub fn validate(&self) -> CoreResult<()> {
        let checks = [
            ("exon half-height", self.exon_half_height),
            ("maximum marker size", self.max_marker_size),
            ("stem width", self.stem_width),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidInput(format!(
                "figure size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Titles and dimensions of the figure
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub legend_title: String,
    pub width: u32,
    pub height: u32,
}

/// Layers plus layout, ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Bottom-to-top draw order
    pub layers: Vec<Layer>,
    pub layout: Layout,
}

impl Figure {
    /// All primitives in draw order
    pub fn primitives(&self) -> impl Iterator<Item = &DrawPrimitive> {
        self.layers.iter().flat_map(|l| l.primitives.iter())
    }

    /// Categories, first seen first (top of the stack first)
    pub fn categories(&self) -> Vec<&str> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.kind == LayerKind::Markers)
            .map(|l| l.name.as_str())
            .collect()
    }
}

/// Records grouped by category, in first-seen order
#[derive(Debug, Default)]
pub struct CategoryGroups<'a> {
    groups: IndexMap<String, Vec<&'a AssociationRecord>>,
}

impl<'a> CategoryGroups<'a> {
    pub fn new(records: &'a [AssociationRecord]) -> Self {
        let mut groups: IndexMap<String, Vec<&'a AssociationRecord>> = IndexMap::new();
        for record in records {
            groups.entry(record.category.clone()).or_default().push(record);
        }
        Self { groups }
    }

    /// Category names in first-seen order
    pub fn names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn get(&self, category: &str) -> Option<&[&'a AssociationRecord]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &[&'a AssociationRecord])> {
        self.groups.iter().map(|(name, recs)| (name.as_str(), recs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Largest |effect size| over all records; `None` when there are none
pub fn max_abs_effect(records: &[AssociationRecord]) -> Option<f64> {
    records
        .iter()
        .map(|r| r.effect_size.abs())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Builds lollipop plot geometry
#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    config: PlotConfig,
}

impl GeometryBuilder {
    /// Create a builder; fails with `InvalidInput` for a bad config
    pub fn new(config: PlotConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Closed rectangle for one exon, with a trailing path break
    pub fn exon_rectangle(&self, exon: &ExonInterval) -> Polyline {
        let h = self.config.exon_half_height;
        let (start, end) = (exon.start as f64, exon.end as f64);
        let mut polyline = Polyline::new();
        polyline.push(start, h);
        polyline.push(start, -h);
        polyline.push(end, -h);
        polyline.push(end, h);
        polyline.push(start, h);
        polyline.lift();
        polyline
    }

    /// Marker size for one record given the global maximum |effect size|
    pub fn marker_size(&self, effect_size: f64, max_abs: f64) -> f64 {
        let ratio = effect_size.abs() / max_abs;
        match self.config.size_mode {
            SizeMode::Area => self.config.max_marker_size * ratio.sqrt(),
            SizeMode::Diameter => self.config.max_marker_size * ratio,
        }
    }

    /// Build all layers in draw order (bottom first)
    pub fn build_layers(
        &self,
        associations: &[AssociationRecord],
        exons: &[ExonInterval],
    ) -> CoreResult<Vec<Layer>> {
        let mut layers = Vec::with_capacity(1 + 2 * associations.len().min(16));

        layers.push(Layer {
            name: EXON_LAYER_NAME.to_string(),
            kind: LayerKind::Exons,
            legend_group: None,
            show_legend: false,
            line_width: EXON_LINE_WIDTH,
            primitives: exons
                .iter()
                .map(|exon| DrawPrimitive::ExonRectangle {
                    polyline: self.exon_rectangle(exon),
                })
                .collect(),
        });

        let max_abs = match max_abs_effect(associations) {
            Some(m) if m == 0.0 => return Err(CoreError::DegenerateScale),
            Some(m) if !m.is_finite() => {
                return Err(CoreError::InvalidInput(format!(
                    "effect sizes must be finite, maximum is {}",
                    m
                )))
            }
            Some(m) => m,
            None => return Ok(layers),
        };

        let groups = CategoryGroups::new(associations);

        // Last-seen category at the bottom, first-seen on top
        for (category, records) in groups.iter().rev() {
            if records.is_empty() {
                return Err(CoreError::EmptyCategory(category.to_string()));
            }

            let mut stems = Vec::with_capacity(records.len());
            let mut markers = Vec::with_capacity(records.len());

            for record in records {
                let x = record.position as f64;
                let y = record.signed_score();

                let mut polyline = Polyline::new();
                polyline.push(x, y);
                polyline.push(x, 0.0);
                polyline.lift();
                stems.push(DrawPrimitive::Stem {
                    polyline,
                    category: category.to_string(),
                });

                markers.push(DrawPrimitive::Marker {
                    x,
                    y,
                    size: self.marker_size(record.effect_size, max_abs),
                    category: category.to_string(),
                    label: marker_label(record),
                });
            }

            layers.push(Layer {
                name: category.to_string(),
                kind: LayerKind::Stems,
                legend_group: Some(category.to_string()),
                show_legend: false,
                line_width: self.config.stem_width,
                primitives: stems,
            });
            layers.push(Layer {
                name: category.to_string(),
                kind: LayerKind::Markers,
                legend_group: Some(category.to_string()),
                show_legend: true,
                line_width: 0.0,
                primitives: markers,
            });
        }

        Ok(layers)
    }

    /// Build all primitives, flattened in draw order
    pub fn build(
        &self,
        associations: &[AssociationRecord],
        exons: &[ExonInterval],
    ) -> CoreResult<Vec<DrawPrimitive>> {
        Ok(self
            .build_layers(associations, exons)?
            .into_iter()
            .flat_map(|layer| layer.primitives)
            .collect())
    }

    /// Build layers and attach layout metadata
    ///
    /// `score_label` and `category_label` title the y axis and legend,
    /// normally the association table's score and category column names.
    pub fn build_figure(
        &self,
        associations: &[AssociationRecord],
        exons: &[ExonInterval],
        score_label: &str,
        category_label: &str,
    ) -> CoreResult<Figure> {
        let layers = self.build_layers(associations, exons)?;
        Ok(Figure {
            layers,
            layout: Layout {
                title: self.config.title.clone(),
                x_axis_title: "Exon Positions".to_string(),
                y_axis_title: score_label.to_string(),
                legend_title: category_label.to_string(),
                width: self.config.width,
                height: self.config.height,
            },
        })
    }
}

fn marker_label(record: &AssociationRecord) -> Option<String> {
    let exon = record.exon_id.as_deref().filter(|e| !e.is_empty());
    match (record.id.as_deref(), exon) {
        (Some(id), Some(exon)) => Some(format!("{} ({})", id, exon)),
        (Some(id), None) => Some(id.to_string()),
        (None, exon) => exon.map(str::to_string),
    }
}
