//! Lolliplot CLI entry point
//!
//! Draws lollipop plots of association results over a transcript's exons.

use clap::{Args, Parser, Subcommand, ValueEnum};
use lolliplot::core::{
    annotate_exons, CompatMode, GapCompressor, GeometryBuilder, OverlapPolicy, PlotConfig, SizeMode,
    DEFAULT_GAP_WIDTH,
};
use lolliplot::formats::{
    self, CategorySource, ColumnConfig, LocalReference, ReferenceDataProvider,
    DEFAULT_REFERENCE_PATH,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Association remapping during gap compression (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CompatModeArg {
    /// Monotone remapping: intronic results stay inside their compressed intron
    #[default]
    #[value(name = "improved")]
    Improved,
    /// Legacy remapping, threshold at the shifted exon start
    #[value(name = "strict")]
    Strict,
}

impl From<CompatModeArg> for CompatMode {
    fn from(arg: CompatModeArg) -> Self {
        match arg {
            CompatModeArg::Improved => CompatMode::Improved,
            CompatModeArg::Strict => CompatMode::Strict,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OverlapArg {
    /// Use negative gaps as they are
    #[value(name = "passthrough")]
    Passthrough,
    /// Treat negative gaps as zero
    #[value(name = "clamp")]
    Clamp,
    /// Fail on overlapping exons
    #[value(name = "reject")]
    Reject,
}

impl From<OverlapArg> for OverlapPolicy {
    fn from(arg: OverlapArg) -> Self {
        match arg {
            OverlapArg::Passthrough => OverlapPolicy::Passthrough,
            OverlapArg::Clamp => OverlapPolicy::Clamp,
            OverlapArg::Reject => OverlapPolicy::Reject,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SizeModeArg {
    /// Marker area proportional to |effect size|
    #[value(name = "area")]
    Area,
    /// Marker diameter proportional to |effect size|
    #[value(name = "diameter")]
    Diameter,
}

impl From<SizeModeArg> for SizeMode {
    fn from(arg: SizeModeArg) -> Self {
        match arg {
            SizeModeArg::Area => SizeMode::Area,
            SizeModeArg::Diameter => SizeMode::Diameter,
        }
    }
}

#[derive(Parser)]
#[command(name = "lolliplot")]
#[command(about = "Lollipop plots of association results over exon structure")]
#[command(version)]
#[command(author = "Lolliplot Contributors")]
struct Cli {
    /// Remapping mode: 'strict' for legacy positions, 'improved' for order-preserving ones
    #[arg(long = "compat-mode", global = true, default_value = "improved")]
    compat_mode: CompatModeArg,

    #[command(subcommand)]
    command: Commands,
}

/// Association table column names
#[derive(Args)]
struct ColumnArgs {
    /// Genomic position column
    #[arg(long = "pos-col", default_value = "GENPOS")]
    position: String,
    /// Marker height column
    #[arg(long = "score-col", default_value = "LOG10P")]
    score: String,
    /// Marker size column
    #[arg(long = "size-col", default_value = "BETA")]
    size: String,
    /// Marker colour column (ignored when --masks is given)
    #[arg(long = "color-col", default_value = "MASK")]
    color: String,
    /// Effect direction column
    #[arg(long = "direction-col", default_value = "BETA")]
    direction: String,
    /// Variant id column, joined against --masks
    #[arg(long = "id-col", default_value = "ID")]
    id: String,
}

impl ColumnArgs {
    fn to_config(&self) -> anyhow::Result<ColumnConfig> {
        Ok(ColumnConfig::new(
            &self.position,
            &self.score,
            &self.size,
            &self.color,
            &self.direction,
            &self.id,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a lollipop plot for one transcript
    Plot {
        /// Association results (e.g. regenie step 2 output)
        associations: PathBuf,
        /// Transcript to plot (Ensembl transcript id)
        #[arg(short = 't', long)]
        transcript: String,
        /// Exon table (Ensembl BioMart export)
        #[arg(short = 'e', long, default_value = DEFAULT_REFERENCE_PATH)]
        exons: PathBuf,
        /// Mask annotation file (ID TID MASK); sets categories and filters to the transcript
        #[arg(short = 'm', long)]
        masks: Option<PathBuf>,
        /// Output file (.html for a page, otherwise plotly JSON)
        #[arg(short = 'o', long, default_value = "lolliplot.html")]
        output: PathBuf,
        /// Figure title (default: gene name)
        #[arg(long)]
        title: Option<String>,
        /// Intron width after compression
        #[arg(short = 'g', long = "gap-width", default_value_t = DEFAULT_GAP_WIDTH)]
        gap_width: i64,
        /// Plot genomic coordinates without compressing introns
        #[arg(long)]
        raw: bool,
        /// Handling of overlapping exons during compression
        #[arg(long, default_value = "passthrough")]
        overlap: OverlapArg,
        /// Size of the largest marker
        #[arg(long = "max-size", default_value_t = 5.0)]
        max_size: f64,
        /// How marker size follows |effect size|
        #[arg(long = "size-mode", default_value = "area")]
        size_mode: SizeModeArg,
        /// Stem line width
        #[arg(long = "stem-width", default_value_t = 0.1)]
        stem_width: f64,
        /// Figure width in pixels
        #[arg(long, default_value_t = 1400)]
        width: u32,
        /// Figure height in pixels
        #[arg(long, default_value_t = 500)]
        height: u32,
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// List the transcripts of a gene in the exon table
    Transcripts {
        /// Gene name or Ensembl gene id
        gene: String,
        /// Exon table (Ensembl BioMart export)
        #[arg(short = 'e', long, default_value = DEFAULT_REFERENCE_PATH)]
        exons: PathBuf,
    },
    /// Download the Ensembl exon table
    #[cfg(feature = "download")]
    FetchExons {
        /// Destination file
        #[arg(short = 'o', long, default_value = DEFAULT_REFERENCE_PATH)]
        output: PathBuf,
        /// BioMart service URL
        #[arg(long, default_value = formats::reference::BIOMART_URL)]
        url: String,
        /// Download even if the destination exists
        #[arg(long)]
        refresh: bool,
    },
}

fn load_exons(path: &Path) -> anyhow::Result<formats::ExonTable> {
    let start = Instant::now();
    eprintln!("Loading exon table: {:?}", path);

    let table = LocalReference::new(path)
        .fetch()
        .map_err(|e| anyhow::anyhow!("Failed to load exon table: {}", e))?;

    eprintln!("Loaded {} exons in {:.2}s", table.len(), start.elapsed().as_secs_f64());
    Ok(table)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.compat_mode {
        CompatModeArg::Strict => eprintln!("Compatibility mode: strict (legacy remapping)"),
        CompatModeArg::Improved => {}
    }

    match cli.command {
        Commands::Plot {
            associations,
            transcript,
            exons,
            masks,
            output,
            title,
            gap_width,
            raw,
            overlap,
            max_size,
            size_mode,
            stem_width,
            width,
            height,
            columns,
        } => {
            let column_config = columns.to_config()?;
            let table = load_exons(&exons)?;
            let exons = table.transcript(&transcript);
            if exons.is_empty() {
                anyhow::bail!("No exons found for transcript {}", transcript);
            }

            eprintln!("Reading associations: {:?}", associations);
            let (mut records, category_label) = match &masks {
                Some(mask_path) => {
                    let records =
                        formats::read_association_file(&associations, &column_config, CategorySource::External)?;
                    let mask_rows = formats::read_mask_file(mask_path)?;
                    (formats::merge_masks(&mask_rows, &records, &transcript), "MASK".to_string())
                }
                None => (
                    formats::read_association_file(&associations, &column_config, CategorySource::Column)?,
                    column_config.color_col.clone(),
                ),
            };

            annotate_exons(&mut records, &exons);
            let exonic = records.iter().filter(|r| r.exon_id.is_some()).count();

            let (records, exons) = if raw {
                (records, exons)
            } else {
                let compressor = GapCompressor::new(gap_width)?
                    .with_compat_mode(cli.compat_mode.into())
                    .with_overlap_policy(overlap.into());
                let compressed = compressor.compress(&exons, &records)?;
                eprintln!(
                    "Compressed {} introns to {} bp (removed {} bp)",
                    compressed.map.steps.len(),
                    gap_width,
                    compressed.map.total_shift()
                );
                (compressed.associations, compressed.exons)
            };

            let title = title.unwrap_or_else(|| exons[0].gene_name.clone());
            let config = PlotConfig {
                title,
                width,
                height,
                max_marker_size: max_size,
                stem_width,
                size_mode: size_mode.into(),
                ..PlotConfig::default()
            };
            let figure = GeometryBuilder::new(config)?.build_figure(
                &records,
                &exons,
                &column_config.score_col,
                &category_label,
            )?;

            let format = formats::save_figure(&figure, &output)?;

            eprintln!("\n=== Plot Statistics ===");
            eprintln!("Transcript:      {}", transcript);
            eprintln!("Exons:           {}", exons.len());
            eprintln!("Associations:    {}", records.len());
            eprintln!("  - In exons:    {}", exonic);
            eprintln!("  - Outside:     {}", records.len() - exonic);
            eprintln!("Categories:      {}", figure.categories().join(", "));
            eprintln!("Output:          {:?} ({:?})", output, format);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Transcripts { gene, exons } => {
            let table = load_exons(&exons)?;
            let transcripts = table.transcripts_of(&gene);
            if transcripts.is_empty() {
                anyhow::bail!("Gene {} not found in exon table", gene);
            }
            for id in transcripts {
                let count = table.exons.iter().filter(|e| e.transcript_id == id).count();
                println!("{}\t{}", id, count);
            }
        }

        #[cfg(feature = "download")]
        Commands::FetchExons { output, url, refresh } => {
            let provider = formats::BiomartReference::new(&output)
                .with_url(url)
                .with_refresh(refresh);
            let table = provider.fetch()?;
            eprintln!("Exon table at {:?}: {} exons", provider.cache_path(), table.len());
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
