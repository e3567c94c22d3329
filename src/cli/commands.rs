// src/cli/commands.rs
//
// Command dispatch

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use super::args::{
    CheckArgs, Cli, Command, CustomRunArgs, ExtractionArgs, GenIndexArgs, OutlierArgs, RunArgs,
    SearchArgs, SummaryArgs,
};
use super::output;
use crate::config::{ColumnLayout, DatasetSpec, RunConfig, RunPaths, GENERATED_INDEX_NAME};
use crate::core::ProsodyExtractor;
use crate::error::{ErrorKind, MetawaveError};
use crate::index::{generate_index, ReverseIndexHandler};
use crate::pipeline::{check, RunOrchestrator};
use crate::search::SearchHandler;
use crate::stats::CorpusStats;

/// Run the parsed command
pub fn execute(cli: Cli) -> Result<()> {
    let show_progress = !cli.quiet;
    match cli.command {
        Command::Run(args) => run_known(args, show_progress),
        Command::CustomRun(args) => run_custom(args, show_progress),
        Command::GenIndex(args) => gen_index(args),
        Command::Summary(args) => summary(args),
        Command::Outliers(args) => outliers(args),
        Command::Check(args) => check_pair(args),
        Command::Search(args) => search(args),
        Command::Datasets => {
            output::print_datasets();
            Ok(())
        }
    }
}

/// Process exit code for a failed command, by error category
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MetawaveError>().map(MetawaveError::kind) {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::CorpusIntegrity) => 3,
        Some(ErrorKind::Extraction) => 4,
        Some(ErrorKind::DataIntegrity) => 5,
        Some(ErrorKind::Io) | None => 1,
    }
}

fn run_known(args: RunArgs, show_progress: bool) -> Result<()> {
    let spec = DatasetSpec::resolve(Some(&args.dataset), None)?;
    let DatasetSpec::Known(preset) = spec else {
        return Err(MetawaveError::UnknownDataset(args.dataset).into());
    };
    let paths = preset.paths(&args.base_dir, args.out_dir.as_deref());
    extract(&spec, &paths, &args.extraction, args.extraction.run_config(show_progress))
}

fn run_custom(args: CustomRunArgs, show_progress: bool) -> Result<()> {
    let (layout, index) = match &args.index_path {
        Some(index) => {
            let (Some(audio), Some(text)) = (args.audio_col, args.text_col) else {
                return Err(MetawaveError::InvalidConfig(
                    "--audio-col and --text-col are required with --index-path".to_string(),
                )
                .into());
            };
            (ColumnLayout::new(audio, text, args.reader_col), index.clone())
        }
        None => {
            std::fs::create_dir_all(&args.out_dir).with_context(|| {
                format!("Failed to create output directory {}", args.out_dir.display())
            })?;
            let index = args.out_dir.join(GENERATED_INDEX_NAME);
            let handler = ReverseIndexHandler::new(args.pattern.as_deref())?
                .with_audio_extension(args.audio_ext.clone());
            let report = generate_index(&args.text_dir, &index, &handler)
                .context("Failed to generate an index from transcript names")?;
            output::print_index_report(&report, &index);
            (ColumnLayout::REVERSE_INDEX, index)
        }
    };

    let spec = DatasetSpec::Custom(layout);
    let paths = RunPaths::custom(&args.wav_dir, &args.text_dir, &index, &args.out_dir);
    let config = args
        .extraction
        .run_config(show_progress)
        .token_extension(args.token_ext.clone())
        .audio_extension(args.audio_ext.clone());
    extract(&spec, &paths, &args.extraction, config)
}

fn extract(
    spec: &DatasetSpec,
    paths: &RunPaths,
    extraction: &ExtractionArgs,
    config: RunConfig,
) -> Result<()> {
    info!("A new feature table will be written at {}", paths.out_file.display());
    let mut orchestrator = RunOrchestrator::new(spec, ProsodyExtractor::default(), config)?;
    let summary = orchestrator
        .run(paths)
        .with_context(|| format!("Extraction run over {} failed", paths.index.display()))?;
    output::print_run_summary(&summary);

    if extraction.summary {
        let out_dir = default_summary_dir(&summary.out_file);
        write_reports(&summary.out_file, &out_dir, extraction.keep_fraction, true)?;
    }
    Ok(())
}

fn default_summary_dir(meta_path: &Path) -> PathBuf {
    meta_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("summary")
}

fn write_reports(meta_path: &Path, out_dir: &Path, keep_fraction: f64, full: bool) -> Result<()> {
    let mut stats = CorpusStats::load(meta_path)
        .with_context(|| format!("Failed to load feature table {}", meta_path.display()))?;
    stats.set_outliers(keep_fraction)?;
    stats.write_index(out_dir)?;
    if full {
        stats.write_summary(out_dir)?;
        stats.write_json_summary(out_dir)?;
    }
    output::print_stats(&stats, out_dir);
    Ok(())
}

fn gen_index(args: GenIndexArgs) -> Result<()> {
    let handler =
        ReverseIndexHandler::new(args.pattern.as_deref())?.with_audio_extension(args.audio_ext);
    let report = generate_index(&args.text_dir, &args.out_file, &handler)
        .with_context(|| format!("Failed to index {}", args.text_dir.display()))?;
    output::print_index_report(&report, &args.out_file);
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| default_summary_dir(&args.meta_path));
    write_reports(&args.meta_path, &out_dir, args.keep_fraction, true)
}

fn outliers(args: OutlierArgs) -> Result<()> {
    write_reports(&args.meta_path, &args.out_dir, args.keep_fraction, false)
}

fn check_pair(args: CheckArgs) -> Result<()> {
    let report = check(&args.wav_path, &args.text_path, args.sample_rate)?;
    output::print_check_report(&report);
    Ok(())
}

fn search(args: SearchArgs) -> Result<()> {
    let hits = SearchHandler::new(&args.token_dir).search(&args.term)?;
    output::print_search_hits(&args.term, &hits);
    Ok(())
}
