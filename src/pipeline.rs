//! End-to-end run over a data directory.
//!
//! ```text
//! data/
//!   raw/         four GENESIS exports (input)
//!   interim/     normalized sources, drive type / emission class group tables
//!   processed/   merged county table, correlation-ready subset
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    backfill::{BackfillReport, backfill_missing},
    categories::normalize_categories,
    config::{PipelineConfig, SourceKind},
    features, filter, io_utils,
    frame::Frame,
    keys::normalize_region_keys,
    merge::merge_sources,
    pivot::{VehiclePivot, pivot_vehicles},
    schema::{self, AGE_ID, REGION_NAME, SEX_ID},
};

pub const INTERIM_VEHICLES: &str = "vehicles.csv";
pub const INTERIM_INCOME: &str = "income.csv";
pub const INTERIM_POPULATION: &str = "population.csv";
pub const INTERIM_ACCIDENTS: &str = "accidents.csv";
pub const INTERIM_DRIVE_TYPES: &str = "drive_types.csv";
pub const INTERIM_DRIVE_TYPES_PCT: &str = "drive_types_pct.csv";
pub const INTERIM_EMISSION_CLASSES: &str = "emission_classes.csv";
pub const INTERIM_EMISSION_CLASSES_PCT: &str = "emission_classes_pct.csv";
pub const PROCESSED_COMBINED: &str = "vehicles_combined.csv";
pub const PROCESSED_CORRELATION: &str = "correlation_data.csv";

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn interim(&self) -> PathBuf {
        self.root.join("interim")
    }

    pub fn processed(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn ensure_output_dirs(&self) -> Result<()> {
        for dir in [self.interim(), self.processed()] {
            fs::create_dir_all(&dir).with_context(|| format!("Creating directory {dir:?}"))?;
        }
        Ok(())
    }
}

/// The four sources after projection, normalization and row filtering.
#[derive(Debug, Clone)]
pub struct NormalizedSources {
    pub vehicles: Frame,
    pub population: Frame,
    pub income: Frame,
    pub accidents: Frame,
}

impl NormalizedSources {
    pub fn get(&self, kind: SourceKind) -> &Frame {
        match kind {
            SourceKind::Vehicles => &self.vehicles,
            SourceKind::Population => &self.population,
            SourceKind::Income => &self.income,
            SourceKind::Accidents => &self.accidents,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub regions: usize,
    pub pivot_columns: usize,
    pub backfill: Vec<BackfillReport>,
    pub outputs: Vec<PathBuf>,
    pub combined: Frame,
}

/// Reads one raw export and projects it onto the canonical columns.
pub fn load_source(
    layout: &DataLayout,
    config: &PipelineConfig,
    kind: SourceKind,
) -> Result<Frame> {
    let source = config.sources.get(kind);
    let path = layout.raw().join(&source.file_name);
    let encoding = io_utils::resolve_encoding(Some(&source.encoding))?;
    let delimiter = config.delimiter_byte()?;
    info!(
        "Loading {} data from {:?} ({}, delimiter '{}')",
        kind.as_str(),
        path,
        encoding.name(),
        io_utils::printable_delimiter(delimiter)
    );
    let raw = io_utils::read_frame(&path, delimiter, encoding)?;
    let projected = schema::project(&raw, &config.column_specs)
        .with_context(|| format!("Projecting {} columns", kind.as_str()))?;
    debug!(
        "{}: {} row(s), columns {:?}",
        kind.as_str(),
        projected.row_count(),
        projected.headers()
    );
    Ok(projected)
}

pub fn prepare_sources(layout: &DataLayout, config: &PipelineConfig) -> Result<NormalizedSources> {
    let vehicles = load_source(layout, config, SourceKind::Vehicles)?;
    let vehicles = normalize_categories(&vehicles, &config.categories)
        .context("Normalizing vehicle categories")?;
    let vehicles = filter::drop_incomplete_rows(&normalize_region_keys(&vehicles));
    let vehicles = filter::drop_superseded_regions(&vehicles, REGION_NAME)?;

    let population = normalize_region_keys(&load_source(layout, config, SourceKind::Population)?);
    let breakdown: Vec<&str> = [AGE_ID, SEX_ID]
        .into_iter()
        .filter(|column| population.has_column(column))
        .collect();
    let population = filter::keep_null_rows(&population, &breakdown)?;

    let income = normalize_region_keys(&load_source(layout, config, SourceKind::Income)?);
    let accidents = normalize_region_keys(&load_source(layout, config, SourceKind::Accidents)?);

    Ok(NormalizedSources {
        vehicles,
        population,
        income,
        accidents,
    })
}

fn write_output(outputs: &mut Vec<PathBuf>, dir: PathBuf, name: &str, frame: &Frame) -> Result<()> {
    let path = dir.join(name);
    io_utils::write_frame(&path, frame)?;
    info!("Wrote {} row(s) to {:?}", frame.row_count(), path);
    outputs.push(path);
    Ok(())
}

fn apply_backfill(
    merged: Frame,
    sources: &NormalizedSources,
    config: &PipelineConfig,
) -> Result<(Frame, Vec<BackfillReport>)> {
    let mut repaired = merged;
    let mut reports = Vec::with_capacity(config.backfill.len());
    for rule in &config.backfill {
        let reference = sources.get(rule.source);
        if !repaired.has_column(&rule.column) || !reference.has_column(&rule.column) {
            warn!(
                "Skipping backfill of '{}': column missing from merged or {} data",
                rule.column,
                rule.source.as_str()
            );
            continue;
        }
        let (next, report) = backfill_missing(&repaired, reference, &rule.column)?;
        repaired = next;
        reports.push(report);
    }
    Ok((repaired, reports))
}

fn write_group_tables(
    outputs: &mut Vec<PathBuf>,
    layout: &DataLayout,
    frame: &Frame,
    pivot: &VehiclePivot,
) -> Result<()> {
    for (columns, absolute, relative) in [
        (&pivot.drive_types, INTERIM_DRIVE_TYPES, INTERIM_DRIVE_TYPES_PCT),
        (
            &pivot.emission_classes,
            INTERIM_EMISSION_CLASSES,
            INTERIM_EMISSION_CLASSES_PCT,
        ),
    ] {
        let grouped = features::grouped_table(frame, columns)?;
        write_output(outputs, layout.interim(), absolute, &grouped)?;
        let shares = features::percentage_table(frame, columns)?;
        write_output(outputs, layout.interim(), relative, &shares)?;
    }
    Ok(())
}

pub fn run_pipeline(layout: &DataLayout, config: &PipelineConfig) -> Result<PipelineSummary> {
    config.validate().context("Validating configuration")?;
    layout.ensure_output_dirs()?;
    let mut outputs = Vec::new();

    let sources = prepare_sources(layout, config)?;
    let pivot = pivot_vehicles(&sources.vehicles).context("Pivoting vehicle stock")?;
    info!(
        "Pivoted vehicle stock: {} region(s), {} drive type(s), {} emission class(es)",
        pivot.frame.row_count(),
        pivot.drive_types.len(),
        pivot.emission_classes.len()
    );

    let interim = layout.interim();
    write_output(&mut outputs, interim.clone(), INTERIM_VEHICLES, &pivot.frame)?;
    write_output(&mut outputs, interim.clone(), INTERIM_INCOME, &sources.income)?;
    write_output(&mut outputs, interim.clone(), INTERIM_POPULATION, &sources.population)?;
    write_output(&mut outputs, interim, INTERIM_ACCIDENTS, &sources.accidents)?;

    let merged = merge_sources(
        &pivot.frame,
        &sources.income,
        &sources.population,
        &sources.accidents,
    )?;
    let (merged, backfill) = apply_backfill(merged, &sources, config)?;

    let mut combined = features::derive_vehicles_per_capita(&merged)?;
    write_group_tables(&mut outputs, layout, &combined, &pivot)?;
    combined = features::append_percentages(&combined, &pivot.drive_types)?;
    combined = features::append_percentages(&combined, &pivot.emission_classes)?;
    let correlation = features::correlation_table(&combined, &config.correlation_columns);
    let missing_correlation = config
        .correlation_columns
        .len()
        .saturating_sub(correlation.column_count());
    if missing_correlation > 0 {
        warn!("{missing_correlation} correlation column(s) not present in the combined table");
    }

    write_output(&mut outputs, layout.processed(), PROCESSED_COMBINED, &combined)?;
    write_output(&mut outputs, layout.processed(), PROCESSED_CORRELATION, &correlation)?;

    Ok(PipelineSummary {
        regions: combined.row_count(),
        pivot_columns: pivot.combination_columns.len(),
        backfill,
        outputs,
        combined,
    })
}
