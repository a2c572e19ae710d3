//! Column specifications and the projection of raw exports onto canonical columns.
//!
//! Each upstream export names its columns differently (`1_variable_attribute_code`
//! in the vehicle stock file, `1_Auspraegung_Code` in the others). A
//! [`ColumnSpec`] maps one source column onto a canonical name and a declared
//! [`ColumnType`]; several specs may share a canonical name, which is how the
//! heterogeneous files end up on one schema.
//!
//! Projection is split into two composable steps:
//!
//! - [`select_columns`] keeps only the columns some spec knows about.
//! - [`rename_columns`] renames them and coerces each to its declared type.
//!
//! Neither step fails on missing columns; they are simply absent from the result.

use std::{collections::HashMap, fmt, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{data::coerce_cell, frame::Frame};

pub const REGION_ID: &str = "region_id";
pub const REGION_NAME: &str = "region_name";
pub const DRIVE_TYPE: &str = "drive_type";
pub const EMISSION_CLASS: &str = "emission_class";
pub const VEHICLE_UNITS: &str = "vehicle_units";
pub const AGE_ID: &str = "age_id";
pub const AGE: &str = "age";
pub const SEX_ID: &str = "sex_id";
pub const SEX: &str = "sex";
pub const POPULATION: &str = "population_in_thousands";
pub const INCOME: &str = "income_per_capita";
pub const ACCIDENTS: &str = "accidents_per_10k_vehicles";
pub const VEHICLE_COUNT: &str = "vehicle_count";
pub const VEHICLES_PER_CAPITA: &str = "vehicles_per_capita";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Integer,
    Float,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["string", "integer", "float"]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "str" | "text" => Ok(ColumnType::String),
            "integer" | "int" | "int64" => Ok(ColumnType::Integer),
            "float" | "float64" | "double" => Ok(ColumnType::Float),
            _ => Err(anyhow!(
                "Unknown column type '{value}'. Supported types: {}",
                ColumnType::variants().join(", ")
            )),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ColumnType::from_str(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub source_name: String,
    #[serde(default)]
    pub description: String,
    pub canonical_name: String,
    pub declared_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(
        source_name: &str,
        description: &str,
        canonical_name: &str,
        declared_type: ColumnType,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            description: description.to_string(),
            canonical_name: canonical_name.to_string(),
            declared_type,
        }
    }
}

/// Column specs for the four GENESIS flat exports (vehicle stock 46251-0021,
/// population 12211-Z-03, income AI-S-01, accidents AI013-3).
pub fn default_column_specs() -> Vec<ColumnSpec> {
    use ColumnType as T;
    vec![
        // vehicle stock
        ColumnSpec::new("1_variable_attribute_code", "Landkreis ID", REGION_ID, T::String),
        ColumnSpec::new("1_variable_attribute_label", "Landkreis Name", REGION_NAME, T::String),
        ColumnSpec::new(
            "2_variable_attribute_code",
            "Kraftstoffarten -> Antriebe",
            DRIVE_TYPE,
            T::String,
        ),
        ColumnSpec::new("3_variable_attribute_code", "Emissionsgruppen", EMISSION_CLASS, T::String),
        ColumnSpec::new("value", "Anzahl der Fahrzeuge", VEHICLE_UNITS, T::Integer),
        // shared by population, income and accidents
        ColumnSpec::new("1_Auspraegung_Code", "Landkreis ID", REGION_ID, T::String),
        ColumnSpec::new("1_Auspraegung_Label", "Landkreis Name", REGION_NAME, T::String),
        // population
        ColumnSpec::new("2_Auspraegung_Code", "Alter ID", AGE_ID, T::String),
        ColumnSpec::new("2_Auspraegung_Label", "Altersklasse", AGE, T::String),
        ColumnSpec::new("3_Auspraegung_Code", "Geschlecht ID", SEX_ID, T::String),
        ColumnSpec::new("3_Auspraegung_Label", "Geschlecht", SEX, T::String),
        ColumnSpec::new(
            "BEVMZ11__Bevoelkerung_am_Hauptwohnort__1000",
            "Bevölkerungsanzahl in Tausend",
            POPULATION,
            T::Float,
        ),
        // income
        ColumnSpec::new(
            "ID0002__Verfuegbares_Einkommen_je_EW__EUR",
            "Verfügbares Einkommen je Einwohner in EUR",
            INCOME,
            T::Float,
        ),
        // accidents
        ColumnSpec::new(
            "AI1303__Strassenverkehrsunfaelle_je_10.000_Kfz__Anzahl",
            "Unfälle je 10000 Kfz",
            ACCIDENTS,
            T::Float,
        ),
    ]
}

/// Keeps the columns of `frame` that are the source of some spec, in spec order.
pub fn select_columns(frame: &Frame, specs: &[ColumnSpec]) -> Frame {
    frame.select(specs.iter().map(|spec| spec.source_name.as_str()))
}

/// Renames source columns to their canonical names and coerces every canonical
/// column to its declared type. Unparseable numeric cells become null.
pub fn rename_columns(frame: &Frame, specs: &[ColumnSpec]) -> Result<Frame> {
    let mut renamed = frame.clone();
    for spec in specs {
        if spec.source_name != spec.canonical_name && renamed.has_column(&spec.source_name) {
            renamed.rename_column(&spec.source_name, &spec.canonical_name)?;
        }
    }

    let mut declared: HashMap<&str, ColumnType> = HashMap::new();
    for spec in specs {
        declared
            .entry(spec.canonical_name.as_str())
            .or_insert(spec.declared_type);
    }
    let headers = renamed.headers().to_vec();
    for header in headers {
        if let Some(ty) = declared.get(header.as_str()) {
            renamed.map_column(&header, |cell| coerce_cell(cell, ty))?;
        }
    }
    Ok(renamed)
}

/// [`select_columns`] followed by [`rename_columns`].
pub fn project(frame: &Frame, specs: &[ColumnSpec]) -> Result<Frame> {
    rename_columns(&select_columns(frame, specs), specs)
}

/// Description of a column by canonical or source name, if any spec documents it.
pub fn describe_column<'a>(specs: &'a [ColumnSpec], name: &str) -> Option<&'a str> {
    specs
        .iter()
        .find(|spec| spec.canonical_name == name || spec.source_name == name)
        .map(|spec| spec.description.as_str())
        .filter(|description| !description.is_empty())
}
