// src/config.rs

use anyhow::{Context, Result};
use std::{
    env,
    path::{Path, PathBuf},
};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://leanx.eu/en/sap/table/";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TABLES_FILE: &str = "sap_tables.csv";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Process-wide configuration, built once at startup and passed by
/// reference. Nothing here is read from the environment after construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
    pub tables_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if one
    /// is present. `GOOGLE_API_KEY` is the only required variable.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GOOGLE_API_KEY").context("GOOGLE_API_KEY is not set")?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = match env::var("SAP_TABLE_BASE_URL") {
            Ok(raw) => Url::parse(&raw).context("parsing SAP_TABLE_BASE_URL")?,
            Err(_) => Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
        };
        let tables_file =
            PathBuf::from(env::var("TABLES_FILE").unwrap_or_else(|_| DEFAULT_TABLES_FILE.into()));
        let output_dir =
            PathBuf::from(env::var("OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.into()));

        Ok(Self {
            api_key,
            model,
            base_url,
            tables_file,
            output_dir,
        })
    }

    /// Path of the batch result set.
    pub fn structure_path(&self) -> PathBuf {
        self.output_dir.join("sap_tables_structure.json")
    }

    /// Path of the single-table smoke test result.
    pub fn smoke_path(&self) -> PathBuf {
        self.output_dir.join("tcurr_structure.json")
    }

    pub fn log_dir(&self) -> &Path {
        &self.output_dir
    }
}
