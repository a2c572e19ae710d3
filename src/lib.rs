pub mod backfill;
pub mod categories;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod filter;
pub mod frame;
pub mod io_utils;
pub mod keys;
pub mod merge;
pub mod pipeline;
pub mod pivot;
pub mod profile;
pub mod schema;
pub mod table;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::{Parser, error::ErrorKind};
use log::{LevelFilter, info};

use crate::{
    cli::Cli,
    config::PipelineConfig,
    pipeline::{DataLayout, PipelineSummary},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("landkreis_stats", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Parses arguments and runs the pipeline. Argument errors are returned like
/// any other failure; `--help` and `--version` print and succeed.
pub fn run() -> Result<()> {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().context("Printing help")?;
            return Ok(());
        }
        Err(err) => return Err(err).context("Parsing command line arguments"),
    };
    execute(&cli)
}

pub fn execute(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("Loading config from {path:?}"))?
        }
        None => PipelineConfig::default(),
    };
    let layout = DataLayout::new(&cli.data_dir);
    info!("Running pipeline in {:?}", layout.root());
    let summary = pipeline::run_pipeline(&layout, &config)?;
    report(&summary, cli, &config)
}

fn report(summary: &PipelineSummary, cli: &Cli, config: &PipelineConfig) -> Result<()> {
    if cli.preview > 0 {
        table::print_frame(&summary.combined.head(cli.preview));
    }
    if cli.profile {
        let profile = profile::profile_columns(&summary.combined, &config.column_specs)?;
        table::print_frame(&profile);
    }
    for backfill in &summary.backfill {
        if !backfill.is_complete() {
            println!(
                "{}: still missing for {}",
                backfill.column,
                backfill.still_missing.join(", ")
            );
        }
    }
    println!(
        "Pipeline finished: {} region(s), {} drive/emission column(s), {} file(s) written",
        summary.regions,
        summary.pivot_columns,
        summary.outputs.len()
    );
    Ok(())
}
