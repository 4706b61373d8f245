//! Harvest configuration for regsift.
//! Reads regsift.toml from the current directory or the path in the
//! REGSIFT_CONFIG env var; the API key may also come from REGSIFT_API_KEY.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Hard policy cap on harvested documents, regardless of configuration.
pub const MAX_DOCUMENTS_CAP: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Search keywords, OR-combined into a single search term.
    pub keywords: Vec<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Static API key; falls back to REGSIFT_API_KEY when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_document_types")]
    pub document_types: Vec<String>,
    /// Only documents posted within the last N years are harvested.
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
    /// Directory for downloaded artifacts and the output CSV.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_api_base()       -> String { "https://api.regulations.gov/v4".to_string() }
fn default_document_types() -> Vec<String> { vec!["Proposed Rule".to_string(), "Rule".to_string()] }
fn default_lookback_years() -> u32 { 3 }
fn default_max_documents()  -> usize { MAX_DOCUMENTS_CAP }
fn default_output_dir()     -> PathBuf { PathBuf::from("regulations_pdfs") }

impl HarvestConfig {
    /// Load configuration from regsift.toml.
    /// Checks REGSIFT_CONFIG env var first, then the current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("REGSIFT_CONFIG").unwrap_or_else(|_| "regsift.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy regsift.example.toml to regsift.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        let config: HarvestConfig = toml::from_str(&content)?;
        config.resolve()
    }

    /// Applies the env-var API key fallback, validates required fields, and
    /// clamps the document budget to the policy cap.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        if self.api_key.is_empty() {
            self.api_key = std::env::var("REGSIFT_API_KEY").unwrap_or_default();
        }
        if self.api_key.is_empty() {
            anyhow::bail!("No API key configured (set api_key in regsift.toml or REGSIFT_API_KEY)");
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            anyhow::bail!("At least one non-empty search keyword is required");
        }
        self.max_documents = self.max_documents.min(MAX_DOCUMENTS_CAP);
        Ok(self)
    }

    /// Keywords OR-combined into the single search term the API expects.
    pub fn search_term(&self) -> String {
        self.keywords.join(" OR ")
    }

    /// Comma-joined document type filter value.
    pub fn document_type_filter(&self) -> String {
        self.document_types.join(",")
    }

    /// ISO date `lookback_years` before today (the posted-date floor).
    pub fn posted_since(&self) -> String {
        let cutoff = chrono::Utc::now().date_naive()
            - chrono::Duration::days(365 * i64::from(self.lookback_years));
        cutoff.format("%Y-%m-%d").to_string()
    }
}
