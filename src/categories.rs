//! Normalization of the vehicle drive type and emission class labels.
//!
//! The vehicle stock export labels categories like `KS-BENZIN` or `PKW-EURO6R`,
//! and different publication years use different spellings for the same
//! category. Each field gets a fixed rule: lowercase, drop a leading prefix,
//! delete separator characters, then look the result up in a remap table.
//! New spellings are handled by extending the remap table.

use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    frame::Frame,
    schema::{DRIVE_TYPE, EMISSION_CLASS},
    transform::string_ops,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRule {
    pub prefix: String,
    pub separators: String,
    pub remap: BTreeMap<String, String>,
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            separators: "-".to_string(),
            remap: BTreeMap::new(),
        }
    }
}

impl CategoryRule {
    fn with_remap(prefix: &str, pairs: &[(&str, &str)]) -> Self {
        Self {
            prefix: prefix.to_string(),
            remap: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn normalize(&self, label: &str) -> String {
        let lowered = string_ops::lowercase(label);
        let prefix = self.prefix.to_lowercase();
        let stripped = string_ops::strip_prefix(&lowered, &prefix);
        let cleaned = string_ops::remove_chars(&stripped, &self.separators);
        match self.remap.get(cleaned.as_ref()) {
            Some(target) => target.clone(),
            None => cleaned.into_owned(),
        }
    }

    /// Remap targets must survive another normalization pass unchanged.
    pub fn validate(&self, field: &str) -> Result<()> {
        for (from, to) in &self.remap {
            ensure!(
                self.normalize(to) == *to,
                "Category remap for {field} maps '{from}' to non-normalized label '{to}'"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    pub drive_type: CategoryRule,
    pub emission_class: CategoryRule,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            drive_type: CategoryRule::with_remap(
                "ks-",
                &[("misc", "other_drive_types"), ("sonst", "other_drive_types")],
            ),
            emission_class: CategoryRule::with_remap(
                "pkw-",
                &[
                    ("euro6r", "euro6"),
                    ("misc", "other_emission_classes"),
                    ("sonst", "other_emission_classes"),
                ],
            ),
        }
    }
}

impl CategoryRules {
    pub fn validate(&self) -> Result<()> {
        self.drive_type.validate(DRIVE_TYPE)?;
        self.emission_class.validate(EMISSION_CLASS)
    }
}

/// Returns a copy of `frame` with `drive_type` and `emission_class` normalized.
pub fn normalize_categories(frame: &Frame, rules: &CategoryRules) -> Result<Frame> {
    let mut normalized = frame.clone();
    for (column, rule) in [
        (DRIVE_TYPE, &rules.drive_type),
        (EMISSION_CLASS, &rules.emission_class),
    ] {
        normalized.map_column(column, |cell| {
            cell.map(|value| Value::String(rule.normalize(&value.as_display())))
        })?;
    }
    Ok(normalized)
}
