//! End-to-end tests: tables on disk to a plotly figure file

use flate2::write::GzEncoder;
use flate2::Compression;
use lolliplot::core::{
    annotate_exons, AssociationRecord, CompatMode, DrawPrimitive, ExonInterval, GapCompressor, GeometryBuilder,
    PlotConfig,
};
use lolliplot::formats::{
    merge_masks, read_association_file, read_mask_file, save_figure, CategorySource, ColumnConfig,
    LocalReference, OutputFormat, ReferenceDataProvider,
};
use std::io::Write;
use std::path::Path;

const EXONS: &str = "\
ENSG1\tENST1\t100\t150\t100\t520\tGENE1\tENSE1
ENSG1\tENST1\t500\t520\t100\t520\tGENE1\tENSE3
ENSG1\tENST1\t200\t260\t100\t520\tGENE1\tENSE2
ENSG1\tENST9\t100\t520\t100\t520\tGENE1\tENSE9
";

const RESULTS: &str = "\
CHROM GENPOS ID ALLELE0 ALLELE1 BETA SE LOG10P
1 120 v1 A G 0.8 0.1 5.2
1 300 v2 C T -0.2 0.1 1.3
1 510 v3 G A 0.4 0.1 2.0
1 515 v4 G A 0.1 0.1 0.4
";

const MASKS: &str = "\
v1 GENE1(ENST1) LoF
v2 GENE1(ENST1) missense
v3 GENE1(ENST1) LoF
v4 GENE1(ENST9) LoF
";

fn write_gz(path: &Path, text: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    std::fs::write(path, encoder.finish().unwrap()).unwrap();
}

#[test]
fn test_compressed_plot_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let exon_path = dir.path().join("exons.tsv.gz");
    let results_path = dir.path().join("results.regenie");
    let masks_path = dir.path().join("masks.txt");
    let out_path = dir.path().join("plot.json");
    write_gz(&exon_path, EXONS);
    std::fs::write(&results_path, RESULTS).unwrap();
    std::fs::write(&masks_path, MASKS).unwrap();

    let table = LocalReference::new(&exon_path).fetch().unwrap();
    let exons = table.transcript("ENST1");
    assert_eq!(exons.len(), 3);

    let columns = ColumnConfig::default();
    let records = read_association_file(&results_path, &columns, CategorySource::External).unwrap();
    let masks = read_mask_file(&masks_path).unwrap();
    let mut records = merge_masks(&masks, &records, "ENST1");
    assert_eq!(records.len(), 3);
    annotate_exons(&mut records, &exons);

    let compressed = GapCompressor::new(10).unwrap().compress(&exons, &records).unwrap();
    let positions: Vec<i64> = compressed.associations.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![120, 230, 240]);

    let figure = GeometryBuilder::new(PlotConfig::with_title("GENE1"))
        .unwrap()
        .build_figure(&compressed.associations, &compressed.exons, &columns.score_col, "MASK")
        .unwrap();
    assert_eq!(figure.categories(), vec!["LoF", "missense"]);

    assert_eq!(save_figure(&figure, &out_path).unwrap(), OutputFormat::Json);
    let value: serde_json::Value = serde_json::from_slice(&std::fs::read(&out_path).unwrap()).unwrap();

    let data = value["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["name"], "Exon regions");
    // three rectangles of six vertices each
    assert_eq!(data[0]["x"].as_array().unwrap().len(), 18);
    assert_eq!(data[0]["x"][6], 160.0);
    assert_eq!(data[4]["name"], "LoF");
    assert_eq!(data[4]["x"], serde_json::json!([120.0, 240.0]));
    assert_eq!(data[4]["y"], serde_json::json!([5.2, 2.0]));
    assert_eq!(data[2]["y"], serde_json::json!([-1.3]));
    // v2 is intronic; its compressed position is the start of ENSE3
    assert_eq!(data[2]["text"], serde_json::json!(["v2"]));
    assert_eq!(data[4]["text"], serde_json::json!(["v1 (ENSE1)", "v3 (ENSE3)"]));
    assert_eq!(value["layout"]["yaxis"]["title"]["text"], "LOG10P");
    assert_eq!(value["layout"]["legend"]["title"]["text"], "MASK");
}

#[test]
fn test_raw_plot_to_html() {
    let dir = tempfile::tempdir().unwrap();
    let exon_path = dir.path().join("exons.tsv");
    let out_path = dir.path().join("plot.html");
    std::fs::write(&exon_path, EXONS).unwrap();

    let results = "GENPOS LOG10P BETA MASK\n120 5.2 0.8 LoF\n300 1.3 -0.2 missense\n";
    let records = lolliplot::formats::read_association_table(
        results.as_bytes(),
        &ColumnConfig::default(),
        CategorySource::Column,
    )
    .unwrap();
    let exons = LocalReference::new(&exon_path).fetch().unwrap().transcript("ENST1");

    let figure = GeometryBuilder::new(PlotConfig::with_title("GENE1"))
        .unwrap()
        .build_figure(&records, &exons, "LOG10P", "MASK")
        .unwrap();
    assert_eq!(save_figure(&figure, &out_path).unwrap(), OutputFormat::Html);

    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("Exon regions"));
    assert!(html.contains("GENE1"));
}

#[test]
fn test_strict_mode_pipeline_differs_only_in_introns() {
    let dir = tempfile::tempdir().unwrap();
    let exon_path = dir.path().join("exons.tsv");
    std::fs::write(&exon_path, EXONS).unwrap();
    let exons = LocalReference::new(&exon_path).fetch().unwrap().transcript("ENST1");

    let records = lolliplot::formats::read_association_table(
        "GENPOS LOG10P BETA MASK\n120 1 1 a\n300 1 1 a\n510 1 1 a\n".as_bytes(),
        &ColumnConfig::default(),
        CategorySource::Column,
    )
    .unwrap();

    let improved = GapCompressor::new(10).unwrap().compress(&exons, &records).unwrap();
    let strict = GapCompressor::new(10)
        .unwrap()
        .with_compat_mode(CompatMode::Strict)
        .compress(&exons, &records)
        .unwrap();

    let pos = |v: &[lolliplot::AssociationRecord]| v.iter().map(|r| r.position).collect::<Vec<_>>();
    assert_eq!(pos(&improved.associations), vec![120, 230, 240]);
    assert_eq!(pos(&strict.associations), vec![120, 30, 240]);
}

#[test]
fn test_intronic_labels_use_genomic_exons() {
    let exons: Vec<ExonInterval> = [(100, 150), (200, 260), (500, 520)]
        .iter()
        .enumerate()
        .map(|(i, &(s, e))| ExonInterval::new(format!("E{}", i + 1), s, e).unwrap())
        .collect();
    let mut records = vec![
        AssociationRecord::new(300, 2.0, 0.5, "a").with_id("rs_intronic"),
        AssociationRecord::new(510, 1.0, 0.2, "a").with_id("rs_exonic"),
    ];
    annotate_exons(&mut records, &exons);

    let compressed = GapCompressor::new(10).unwrap().compress(&exons, &records).unwrap();
    assert_eq!(compressed.associations[0].position, compressed.exons[2].start);

    let labels: Vec<Option<String>> = GeometryBuilder::new(PlotConfig::default())
        .unwrap()
        .build(&compressed.associations, &compressed.exons)
        .unwrap()
        .into_iter()
        .filter_map(|p| match p {
            DrawPrimitive::Marker { label, .. } => Some(label),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec![Some("rs_intronic".to_string()), Some("rs_exonic (E3)".to_string())]);
}
