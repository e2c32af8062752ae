//! WHO essential-medicines table, loaded once from CSV and searched by name.

use anyhow::{Context as _, anyhow};
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info};

pub const MEDICINE_NAME_COLUMN: &str = "Medicine Name";
pub const DEFAULT_TABLET_NAME: &str = "Paracetamol";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WhoRecord {
    #[serde(rename = "Medicine Name")]
    pub medicine_name: Option<String>,
    #[serde(rename = "Form")]
    pub form: Option<String>,
    #[serde(rename = "Strength / Details")]
    pub strength: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
}

impl WhoRecord {
    fn matches(&self, needle_lower: &str) -> bool {
        self.medicine_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(needle_lower))
    }

    pub fn to_markdown(&self) -> String {
        format!(
            "\n**WHO Info**\n- **Form**: {}\n- **Strength / Details**: {}\n- **Category**: {}\n",
            field(self.form.as_deref()),
            field(self.strength.as_deref()),
            field(self.category.as_deref()),
        )
    }
}

fn field(value: Option<&str>) -> &str {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

#[derive(Debug, Clone, Default)]
pub struct WhoTable {
    records: Vec<WhoRecord>,
}

impl WhoTable {
    pub fn new(records: Vec<WhoRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(reader)
    }

    pub fn from_csv_str(data: &str) -> anyhow::Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_bytes());
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Self> {
        let headers = reader.headers()?;
        if !headers.iter().any(|h| h == MEDICINE_NAME_COLUMN) {
            return Err(anyhow!("missing '{}' column", MEDICINE_NAME_COLUMN));
        }

        let records = reader
            .deserialize::<WhoRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Load the table, or log the failure and carry on with an empty one.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => {
                info!("Loaded {} WHO records from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                error!("WHO data load error: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First row, in file order, whose name contains `name` ignoring case.
    pub fn find(&self, name: &str) -> Option<&WhoRecord> {
        let needle = name.to_lowercase();
        self.records.iter().find(|record| record.matches(&needle))
    }

    pub fn info(&self, name: &str) -> String {
        if self.is_empty() {
            return "WHO dataset not loaded or missing.".to_string();
        }
        match self.find(name) {
            Some(record) => record.to_markdown(),
            None => format!("No WHO data found for {}.", name),
        }
    }
}

/// The name used for lookups: the first word of the note, or a fixed default.
pub fn tablet_name_from_note(note: &str) -> String {
    note.split_whitespace()
        .next()
        .unwrap_or(DEFAULT_TABLET_NAME)
        .to_string()
}
