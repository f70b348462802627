// src/brief_data.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::section::Section;

/// Form answers collected per section, sent whole to the generation and
/// feedback endpoints. Serialised as `{"<slug>": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BriefData(BTreeMap<Section, Map<String, Value>>);

impl BriefData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `data` key by key into the section's stored answers.
    /// Keys already present are overwritten, others are kept.
    pub fn merge_section(&mut self, section: Section, data: Map<String, Value>) {
        self.0.entry(section).or_default().extend(data);
    }

    pub fn section(&self, section: Section) -> Option<&Map<String, Value>> {
        self.0.get(&section)
    }

    pub fn sections(&self) -> impl Iterator<Item = (Section, &Map<String, Value>)> {
        self.0.iter().map(|(s, d)| (*s, d))
    }

    pub fn contains(&self, section: Section) -> bool {
        self.0.contains_key(&section)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Job title entered in the title section, if any
    pub fn job_title(&self) -> Option<&str> {
        let section = self.section(Section::TitreJobFamily)?;
        ["job_title", "job_function"]
            .iter()
            .filter_map(|key| section.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|title| !title.is_empty())
    }

    /// Parse a TOML document whose top-level tables are keyed by section
    /// slug or label:
    ///
    /// ```toml
    /// [titre_job_family]
    /// job_title = "Développeur Rust"
    /// job_family = "Tech"
    ///
    /// ["Cadre contractuel"]
    /// content = "CDI"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("Failed to parse brief data TOML")?;

        let mut data = Self::new();
        for (key, value) in table {
            let section: Section = key
                .parse()
                .with_context(|| format!("Invalid section key in brief data: {}", key))?;

            let fields = match serde_json::to_value(&value)
                .with_context(|| format!("Failed to convert data for section {}", key))?
            {
                Value::Object(map) => map,
                _ => anyhow::bail!("Section {} must be a table of fields", key),
            };

            data.merge_section(section, fields);
        }

        Ok(data)
    }
}
