// Static engine tables: location aliases and ordered cause rules.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{OutageError, Result};
use crate::types::CauseCategory;

/// One ordered classification rule. `pattern` is a regular-expression
/// fragment anchored at a word start, matched against lowercased text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CauseRule {
    pub pattern: String,
    pub category: CauseCategory,
}

impl CauseRule {
    fn new(pattern: &str, category: CauseCategory) -> Self {
        Self {
            pattern: pattern.to_string(),
            category,
        }
    }
}

/// Static tables fixed when the engine is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Historical municipality name -> current municipality.
    pub location_aliases: BTreeMap<String, String>,
    /// Evaluated in order, first match wins.
    pub cause_rules: Vec<CauseRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let location_aliases = [
            ("Nilsiä", "Kuopio"),
            ("Tahkovuori", "Kuopio"),
            ("Juankoski", "Kuopio"),
            ("Varpaisjärvi", "Lapinlahti"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let cause_rules = vec![
            CauseRule::new("huol", CauseCategory::Maintenance),
            CauseRule::new("kaiv", CauseCategory::Digging),
            CauseRule::new("saneer", CauseCategory::Renovation),
            CauseRule::new("korj", CauseCategory::Repair),
            CauseRule::new("vaurio", CauseCategory::DamageRepair),
        ];

        Self {
            location_aliases,
            cause_rules,
        }
    }
}

impl EngineConfig {
    /// Load tables from a JSON file. Absent keys keep the built-in tables.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| OutageError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(rule) = self.cause_rules.iter().find(|r| r.pattern.trim().is_empty()) {
            return Err(OutageError::Config(format!(
                "empty pattern for category {}",
                rule.category
            )));
        }
        if let Some((from, _)) = self.location_aliases.iter().find(|(_, to)| to.trim().is_empty()) {
            return Err(OutageError::Config(format!(
                "alias {from:?} maps to an empty name"
            )));
        }
        Ok(())
    }
}
