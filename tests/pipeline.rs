mod common;

use std::collections::HashMap;

use common::{TestWorkspace, read_output};
use landkreis_stats::{
    config::PipelineConfig,
    pipeline::{
        DataLayout, INTERIM_DRIVE_TYPES, INTERIM_DRIVE_TYPES_PCT, PROCESSED_COMBINED,
        PROCESSED_CORRELATION, run_pipeline,
    },
    schema::{ACCIDENTS, INCOME, POPULATION},
};

type Cells = HashMap<String, String>;

fn rows_by_region(headers: &[String], rows: &[Vec<String>]) -> HashMap<String, Cells> {
    rows.iter()
        .map(|row| {
            let cells: Cells = headers.iter().cloned().zip(row.iter().cloned()).collect();
            (cells["region_id"].clone(), cells)
        })
        .collect()
}

fn number(cells: &Cells, column: &str) -> f64 {
    cells[column]
        .parse()
        .unwrap_or_else(|_| panic!("{column} should be numeric, got {:?}", cells[column]))
}

#[test]
fn pipeline_writes_interim_and_processed_tables() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();
    let layout = DataLayout::new(&data_dir);

    let summary = run_pipeline(&layout, &PipelineConfig::default()).expect("pipeline");

    assert_eq!(summary.outputs.len(), 10);
    assert!(summary.outputs.iter().all(|path| path.is_file()));
    assert_eq!(summary.regions, 3);
    assert_eq!(summary.pivot_columns, 5);

    let (headers, rows) = read_output(&layout.processed().join(PROCESSED_COMBINED));
    for column in [
        "benzin_euro6",
        "diesel_euro4",
        "elektro_euro6",
        "pih_euro6dt",
        "other_drive_types_other_emission_classes",
        "vehicle_count",
        "vehicles_per_capita",
        "elektro_pct",
        "euro6_pct",
    ] {
        assert!(headers.iter().any(|h| h == column), "missing {column} in {headers:?}");
    }
    assert!(!headers.iter().any(|h| h == "benzin_euro4"), "superseded region leaked");

    let regions = rows_by_region(&headers, &rows);
    let mut ids: Vec<&str> = regions.keys().map(String::as_str).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["1001", "3241", "81170"]);

    let flensburg = &regions["1001"];
    assert_eq!(number(flensburg, "vehicle_count"), 160.0);
    assert_eq!(number(flensburg, "benzin_euro6"), 120.0);
    assert_eq!(number(flensburg, POPULATION), 89.5);
    let per_capita = number(flensburg, "vehicles_per_capita");
    assert!((per_capita - 160.0 / 89_500.0).abs() < 1e-12);
    assert!((number(flensburg, "benzin_pct") - 75.0).abs() < 1e-9);
}

#[test]
fn pipeline_backfills_short_keys_and_reports_gaps() {
    let workspace = TestWorkspace::new();
    let layout = DataLayout::new(workspace.seed_raw_data());

    let summary = run_pipeline(&layout, &PipelineConfig::default()).expect("pipeline");

    let (headers, rows) = read_output(&layout.processed().join(PROCESSED_COMBINED));
    let regions = rows_by_region(&headers, &rows);
    let goeppingen = &regions["81170"];
    assert_eq!(goeppingen["region_name"], "Göppingen");
    assert_eq!(number(goeppingen, INCOME), 25500.0);
    assert_eq!(number(goeppingen, POPULATION), 257.2);
    assert_eq!(number(goeppingen, ACCIDENTS), 188.4);
    assert_eq!(number(goeppingen, "other_drive_types"), 7.0);

    assert_eq!(regions["3241"][ACCIDENTS], "");
    let accidents = summary
        .backfill
        .iter()
        .find(|report| report.column == ACCIDENTS)
        .expect("accident report");
    assert_eq!(accidents.missing, 2);
    assert_eq!(accidents.fixed, 1);
    assert_eq!(accidents.still_missing, ["Region Hannover"]);

    let income = summary
        .backfill
        .iter()
        .find(|report| report.column == INCOME)
        .expect("income report");
    assert!(income.is_complete());
}

#[test]
fn group_tables_keep_region_name_and_shares() {
    let workspace = TestWorkspace::new();
    let layout = DataLayout::new(workspace.seed_raw_data());
    run_pipeline(&layout, &PipelineConfig::default()).expect("pipeline");

    let (headers, rows) = read_output(&layout.interim().join(INTERIM_DRIVE_TYPES));
    assert_eq!(
        headers,
        ["region_name", "benzin", "diesel", "elektro", "other_drive_types", "pih"]
    );
    assert_eq!(rows.len(), 3);

    let (pct_headers, pct_rows) = read_output(&layout.interim().join(INTERIM_DRIVE_TYPES_PCT));
    assert_eq!(pct_headers, headers);
    for row in pct_rows {
        let total: f64 = row[1..].iter().map(|cell| cell.parse::<f64>().expect("share")).sum();
        assert!((total - 100.0).abs() < 1e-9, "shares of {} sum to {total}", row[0]);
    }
}

#[test]
fn correlation_table_skips_groups_absent_from_the_data() {
    let workspace = TestWorkspace::new();
    let layout = DataLayout::new(workspace.seed_raw_data());
    run_pipeline(&layout, &PipelineConfig::default()).expect("pipeline");

    let (headers, rows) = read_output(&layout.processed().join(PROCESSED_CORRELATION));
    assert_eq!(
        headers,
        [
            "region_id",
            POPULATION,
            INCOME,
            "vehicles_per_capita",
            ACCIDENTS,
            "elektro_pct",
            "pih_pct",
            "euro4_pct",
            "euro6_pct",
            "euro6dt_pct",
        ]
    );
    assert_eq!(rows.len(), 3);
}

#[test]
fn missing_raw_export_fails_with_file_context() {
    let workspace = TestWorkspace::new();
    workspace.write("data/raw/46251-0021_de_2020_flat.csv", common::VEHICLE_EXPORT);
    let layout = DataLayout::new(workspace.path().join("data"));

    let err = run_pipeline(&layout, &PipelineConfig::default()).expect_err("population missing");
    assert!(format!("{err:#}").contains("12211-Z-03_flat.csv"));
}

#[test]
fn yaml_config_can_swap_source_file_names() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();
    let renamed = workspace.path().join("data/raw/vehicles_2021.csv");
    std::fs::rename(data_dir.join("raw/46251-0021_de_2020_flat.csv"), &renamed).expect("rename");

    let config = PipelineConfig::from_yaml_str(
        "sources:\n  vehicles:\n    file_name: vehicles_2021.csv\n",
    )
    .expect("config");
    let summary = run_pipeline(&DataLayout::new(&data_dir), &config).expect("pipeline");
    assert_eq!(summary.regions, 3);
}
