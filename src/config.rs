//! Pipeline configuration.
//!
//! Every lookup table the pipeline relies on (source files, column specs,
//! category remaps, backfill rules, the correlation column set) lives in
//! [`PipelineConfig`] and is passed explicitly into each stage. The defaults
//! describe the 2020 GENESIS exports; a YAML file can override any subset of
//! fields, everything it omits keeps its default.

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    categories::CategoryRules,
    features::percent_column,
    io_utils,
    schema::{
        ACCIDENTS, ColumnSpec, INCOME, POPULATION, REGION_ID, VEHICLES_PER_CAPITA,
        default_column_specs,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Vehicles,
    Population,
    Income,
    Accidents,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Vehicles => "vehicles",
            SourceKind::Population => "population",
            SourceKind::Income => "income",
            SourceKind::Accidents => "accidents",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub file_name: String,
    #[serde(default = "SourceFile::default_encoding")]
    pub encoding: String,
}

impl SourceFile {
    fn new(file_name: &str, encoding: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            encoding: encoding.to_string(),
        }
    }

    fn default_encoding() -> String {
        "utf-8".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub vehicles: SourceFile,
    pub population: SourceFile,
    pub income: SourceFile,
    pub accidents: SourceFile,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            vehicles: SourceFile::new("46251-0021_de_2020_flat.csv", "utf-8"),
            population: SourceFile::new("12211-Z-03_flat.csv", "iso-8859-1"),
            income: SourceFile::new("AI-S-01_flat.csv", "iso-8859-1"),
            accidents: SourceFile::new("AI013-3_flat.csv", "iso-8859-1"),
        }
    }
}

impl SourceFiles {
    pub fn get(&self, kind: SourceKind) -> &SourceFile {
        match kind {
            SourceKind::Vehicles => &self.vehicles,
            SourceKind::Population => &self.population,
            SourceKind::Income => &self.income,
            SourceKind::Accidents => &self.accidents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillRule {
    pub column: String,
    pub source: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub delimiter: String,
    pub sources: SourceFiles,
    pub column_specs: Vec<ColumnSpec>,
    pub categories: CategoryRules,
    pub backfill: Vec<BackfillRule>,
    pub correlation_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut correlation_columns = vec![
            REGION_ID.to_string(),
            POPULATION.to_string(),
            INCOME.to_string(),
            VEHICLES_PER_CAPITA.to_string(),
            ACCIDENTS.to_string(),
        ];
        correlation_columns.extend(
            ["elektro", "pih", "euro2", "euro3", "euro4", "euro6", "euro6dt"]
                .iter()
                .map(|group| percent_column(group)),
        );
        Self {
            delimiter: ";".to_string(),
            sources: SourceFiles::default(),
            column_specs: default_column_specs(),
            categories: CategoryRules::default(),
            backfill: vec![
                BackfillRule {
                    column: INCOME.to_string(),
                    source: SourceKind::Income,
                },
                BackfillRule {
                    column: POPULATION.to_string(),
                    source: SourceKind::Population,
                },
                BackfillRule {
                    column: ACCIDENTS.to_string(),
                    source: SourceKind::Accidents,
                },
            ],
            correlation_columns,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: PipelineConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(text).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing config to YAML")
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        io_utils::parse_delimiter(&self.delimiter)
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        for kind in [
            SourceKind::Vehicles,
            SourceKind::Population,
            SourceKind::Income,
            SourceKind::Accidents,
        ] {
            let source = self.sources.get(kind);
            ensure!(
                !source.file_name.trim().is_empty(),
                "Source '{}' has no file name",
                kind.as_str()
            );
            io_utils::resolve_encoding(Some(&source.encoding))
                .with_context(|| format!("Source '{}'", kind.as_str()))?;
        }
        let mut seen = HashSet::new();
        for spec in &self.column_specs {
            ensure!(
                seen.insert(spec.source_name.as_str()),
                "Column spec for '{}' is defined more than once",
                spec.source_name
            );
        }
        self.categories.validate()
    }
}
