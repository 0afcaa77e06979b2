//! Plotly figure output
//!
//! Converts a [`Figure`] into a `plotly::Plot`, one scatter trace per layer
//! in layer order, so plotly draws the exon layer first. Plots are written as
//! plotly.js JSON or as a standalone HTML page.

use crate::core::{DrawPrimitive, Figure, Layer, LayerKind, LolliplotError};
use plotly::common::{HoverInfo, Line, Marker, Mode, SizeMode, Title};
use plotly::layout::{Axis, ItemSizing, Legend, TraceOrder};
use plotly::common::Fill;
use plotly::{Layout, Plot, Scatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Exon rectangle fill
pub const EXON_FILL_COLOR: &str = "rgba(100,100,255,1)";

/// Exon outline and stem colour
pub const LINE_COLOR: &str = "black";

/// Marker sizes are sent as integers; this factor keeps two decimals
pub const MARKER_SIZE_SCALE: usize = 100;

fn layer_trace(layer: &Layer) -> Box<Scatter<Option<f64>, Option<f64>>> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut sizes = Vec::new();
    let mut labels = Vec::new();

    for primitive in &layer.primitives {
        match primitive {
            DrawPrimitive::ExonRectangle { polyline } | DrawPrimitive::Stem { polyline, .. } => {
                x.extend(polyline.xs());
                y.extend(polyline.ys());
            }
            DrawPrimitive::Marker { x: mx, y: my, size, label, .. } => {
                x.push(Some(*mx));
                y.push(Some(*my));
                sizes.push((size * MARKER_SIZE_SCALE as f64).round() as usize);
                labels.push(label.clone());
            }
        }
    }

    let mut trace = Scatter::new(x, y)
        .name(layer.name.as_str())
        .show_legend(layer.show_legend);
    if let Some(group) = &layer.legend_group {
        trace = trace.legend_group(group.as_str());
    }

    match layer.kind {
        LayerKind::Exons => trace
            .mode(Mode::Lines)
            .fill(Fill::ToSelf)
            .fill_color(EXON_FILL_COLOR)
            .line(Line::new().color(LINE_COLOR).width(layer.line_width)),
        LayerKind::Stems => trace
            .mode(Mode::Lines)
            .line(Line::new().color(LINE_COLOR).width(layer.line_width))
            .hover_info(HoverInfo::Skip),
        LayerKind::Markers => {
            trace = trace.mode(Mode::Markers).marker(
                Marker::new()
                    .size_array(sizes)
                    .size_ref(MARKER_SIZE_SCALE)
                    .size_mode(SizeMode::Diameter),
            );
            if labels.iter().any(Option::is_some) {
                let text: Vec<String> = labels.into_iter().map(Option::unwrap_or_default).collect();
                trace = trace.text_array(text);
            }
            trace
        }
    }
}

/// Convert a figure into a plotly plot
///
/// The legend lists traces top-first, so the first-seen category comes first.
pub fn to_plotly(figure: &Figure) -> Plot {
    let layout = &figure.layout;
    let mut plot = Plot::new();
    for layer in &figure.layers {
        plot.add_trace(layer_trace(layer));
    }
    plot.set_layout(
        Layout::new()
            .title(Title::from(layout.title.as_str()))
            .x_axis(Axis::new().title(Title::from(layout.x_axis_title.as_str())))
            .y_axis(Axis::new().title(Title::from(layout.y_axis_title.as_str())))
            .legend(
                Legend::new()
                    .title(Title::from(layout.legend_title.as_str()))
                    .item_sizing(ItemSizing::Constant)
                    .trace_order(TraceOrder::Reversed),
            )
            .width(layout.width as usize)
            .height(layout.height as usize),
    );
    plot
}

/// Write plotly JSON
pub fn write_json<W: Write>(figure: &Figure, mut writer: W) -> Result<(), LolliplotError> {
    writer.write_all(to_plotly(figure).to_json().as_bytes())?;
    Ok(())
}

/// Write a standalone HTML page rendering the figure
pub fn write_html<W: Write>(figure: &Figure, mut writer: W) -> Result<(), LolliplotError> {
    writer.write_all(to_plotly(figure).to_html().as_bytes())?;
    Ok(())
}

/// Output format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Html,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => OutputFormat::Html,
            _ => OutputFormat::Json,
        }
    }
}

/// Save a figure as HTML (`.html`/`.htm`) or JSON (anything else)
pub fn save_figure(figure: &Figure, path: &Path) -> Result<OutputFormat, LolliplotError> {
    let format = OutputFormat::from_path(path);
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Html => write_html(figure, &mut writer)?,
        OutputFormat::Json => write_json(figure, &mut writer)?,
    }
    writer.flush()?;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{annotate_exons, AssociationRecord, ExonInterval, GeometryBuilder, PlotConfig};
    use serde_json::{json, Value};

    fn figure() -> Figure {
        let exons = vec![ExonInterval::new("E1", 100, 150).unwrap()];
        let mut records = vec![
            AssociationRecord::new(120, 2.0, 0.5, "LoF").with_id("rs1"),
            AssociationRecord::new(300, 1.0, -1.0, "missense"),
        ];
        annotate_exons(&mut records, &exons);
        GeometryBuilder::new(PlotConfig::with_title("GENE1"))
            .unwrap()
            .build_figure(&records, &exons, "LOG10P", "MASK")
            .unwrap()
    }

    fn figure_json() -> Value {
        let mut out = Vec::new();
        write_json(&figure(), &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_trace_order_and_styles() {
        let value = figure_json();
        let data = value["data"].as_array().unwrap();
        let names: Vec<(&str, &str)> = data
            .iter()
            .map(|t| (t["name"].as_str().unwrap(), t["mode"].as_str().unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Exon regions", "lines"),
                ("missense", "lines"),
                ("missense", "markers"),
                ("LoF", "lines"),
                ("LoF", "markers"),
            ]
        );
        assert_eq!(data[0]["fill"], "toself");
        assert_eq!(data[0]["fillcolor"], EXON_FILL_COLOR);
        assert_eq!(data[0]["showlegend"], false);
        assert_eq!(data[1]["hoverinfo"], "skip");
        assert_eq!(data[2]["marker"]["size"], json!([500]));
        assert_eq!(data[2]["marker"]["sizeref"], 100);
        assert_eq!(data[2]["marker"]["sizemode"], "diameter");
        assert_eq!(data[4]["legendgroup"], "LoF");
        assert_eq!(data[4]["text"], json!(["rs1 (E1)"]));
        assert!(data[2].get("text").is_none());
    }

    #[test]
    fn test_json_uses_null_path_breaks() {
        let value = figure_json();
        assert_eq!(value["data"][0]["x"].as_array().map(Vec::len), Some(6));
        assert_eq!(value["data"][0]["x"][5], Value::Null);
        assert_eq!(value["data"][0]["type"], "scatter");
        assert!(value["data"][0].get("marker").is_none());
    }

    #[test]
    fn test_layout() {
        let value = figure_json();
        let layout = &value["layout"];
        assert_eq!(layout["title"]["text"], "GENE1");
        assert_eq!(layout["xaxis"]["title"]["text"], "Exon Positions");
        assert_eq!(layout["yaxis"]["title"]["text"], "LOG10P");
        assert_eq!(layout["legend"]["title"]["text"], "MASK");
        assert_eq!(layout["legend"]["itemsizing"], "constant");
        // traces are bottom-first; the legend lists the top (first-seen) category first
        assert_eq!(layout["legend"]["traceorder"], "reversed");
        assert_eq!(layout["width"], 1400);
        assert_eq!(layout["height"], 500);
    }

    #[test]
    fn test_html_output() {
        let mut out = Vec::new();
        write_html(&figure(), &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<html"));
        assert!(html.contains("Exon regions"));
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("plot.html")), OutputFormat::Html);
        assert_eq!(OutputFormat::from_path(Path::new("plot.HTM")), OutputFormat::Html);
        assert_eq!(OutputFormat::from_path(Path::new("plot.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("plot")), OutputFormat::Json);
    }
}
