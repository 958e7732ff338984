//! Command implementations for the CLI
//!
//! Logging setup, batch conversion with progress reporting, and region
//! point printing.

use crate::batch::{self, BatchOutcome};
use crate::cli::args::{Args, Commands, ConvertArgs, PointsArgs};
use crate::cli::input::{AnnotationKind, expand_inputs};
use crate::config::ProcessingConfig;
use crate::export::{self, ExportFormat};
use crate::parser::RegionFileParser;
use crate::query::{PointSource, lookup_points};
use anyhow::{Context, bail};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Outcome of a `convert` run
#[derive(Debug, Clone, Default)]
pub struct ConvertSummary {
    pub files_converted: usize,
    pub files_failed: usize,
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Run the command selected on the command line
pub async fn run(args: Args) -> anyhow::Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::Convert(convert_args) => {
            let summary = convert(convert_args).await?;
            print_summary(&summary);
            if summary.files_failed > 0 {
                bail!(
                    "{} of {} files failed",
                    summary.files_failed,
                    summary.files_failed + summary.files_converted
                );
            }
            Ok(())
        }
        Commands::Points(points_args) => print_points(points_args),
    }
}

fn setup_logging(args: &Args) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized with filter: {}", args.log_filter());
    Ok(())
}

/// Parse every input and write one export per parsed file
pub async fn convert(args: &ConvertArgs) -> anyhow::Result<ConvertSummary> {
    let start_time = Instant::now();
    let config = args.to_config();
    config.validate().context("Invalid configuration")?;

    let files = expand_inputs(&args.inputs).context("Failed to resolve inputs")?;
    if files.is_empty() {
        warn!("No annotation files found");
        return Ok(ConvertSummary::default());
    }

    let mut line_paths = Vec::new();
    let mut region_paths = Vec::new();
    let mut summary = ConvertSummary::default();
    for file in files {
        match AnnotationKind::from_path(&file) {
            Some(AnnotationKind::Line) => line_paths.push(file),
            Some(AnnotationKind::Region) => region_paths.push(file),
            None => {
                error!("Not an .evl or .evr file: {}", file.display());
                summary.files_failed += 1;
            }
        }
    }
    info!(
        "Converting {} line files and {} region files",
        line_paths.len(),
        region_paths.len()
    );

    let pb = create_progress_bar((line_paths.len() + region_paths.len()) as u64, "Parsing");

    let lines =
        batch::parse_line_files(&line_paths, &config.line_parser(), config.workers, &pb).await;
    let region_parser = config.region_parser()?;
    let regions = batch::parse_region_files(
        &region_paths,
        &region_parser,
        config.convert_range_edges,
        config.workers,
        &pb,
    )
    .await;
    pb.finish_and_clear();

    summary.files_failed += lines.failed_count() + regions.failed_count();
    let mut written = HashSet::new();
    write_outputs(&lines, &config, &mut summary, &mut written, export::save_line_file);
    write_outputs(&regions, &config, &mut summary, &mut written, export::save_region_file);

    summary.elapsed = start_time.elapsed();
    Ok(summary)
}

/// Outputs are named after the full input file name (`x1.evr` -> `x1.evr.csv`)
/// so a line file and a region file sharing a stem never collide. An input
/// whose output path was already written in this run is reported as failed.
fn write_outputs<T>(
    outcome: &BatchOutcome<T>,
    config: &ProcessingConfig,
    summary: &mut ConvertSummary,
    written: &mut HashSet<PathBuf>,
    save: fn(&T, &Path, &str, ExportFormat) -> crate::Result<PathBuf>,
) {
    for (path, parsed) in &outcome.parsed {
        let output_dir = output_dir_for(path, config);
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "annotation".to_string());

        let target = export::output_path(&output_dir, &name, config.export_format);
        if written.contains(&target) {
            error!(
                "Output {} already written in this run; skipping {}",
                target.display(),
                path.display()
            );
            summary.files_failed += 1;
            continue;
        }

        match save(parsed, &output_dir, &name, config.export_format) {
            Ok(output) => {
                summary.files_converted += 1;
                written.insert(output.clone());
                summary.outputs.push(output);
            }
            Err(e) => {
                error!("Failed to write output for {}: {}", path.display(), e);
                summary.files_failed += 1;
            }
        }
    }
}

fn output_dir_for(input: &Path, config: &ProcessingConfig) -> PathBuf {
    match &config.output_dir {
        Some(dir) => dir.clone(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

fn print_points(args: &PointsArgs) -> anyhow::Result<()> {
    let ext = args
        .source
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let points = match ext.as_str() {
        "csv" => lookup_points(&args.region_id, PointSource::Csv(&args.source)),
        "json" => lookup_points(&args.region_id, PointSource::Json(&args.source)),
        "evr" => {
            let file = RegionFileParser::new()
                .parse_file(&args.source, false)
                .with_context(|| format!("Failed to parse {}", args.source.display()))?;
            lookup_points(&args.region_id, PointSource::Parsed(&file))
        }
        _ => bail!(
            "Unsupported point source {}; expected .csv, .json or .evr",
            args.source.display()
        ),
    }
    .with_context(|| format!("Failed to read points of region {}", args.region_id))?;

    for point in points {
        println!("{}\t{}", point.timestamp, point.depth);
    }
    Ok(())
}

fn print_summary(summary: &ConvertSummary) {
    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(summary.elapsed).to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        summary.files_converted.to_string().bright_white().bold()
    );
    if summary.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            summary.files_failed.to_string().bright_red().bold()
        );
    }
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
