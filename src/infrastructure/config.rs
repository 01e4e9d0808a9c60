//! Export configuration, loaded from TOML and overridden by CLI flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::ports::dot_exporter::DotExporter;
use crate::ports::record_exporter::{BincodeExporter, JsonExporter};
use crate::ports::GraphExporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Graphviz DOT for rendering
    #[default]
    Dot,
    /// JSON graph record
    Json,
    /// bincode graph record
    Bincode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: OutputFormat,
    /// Verbose DOT labels
    pub verbose: bool,
    /// Prune leaf AST nodes before export
    pub prune: bool,
    /// Pretty-print JSON
    pub pretty: bool,
    /// Worker threads for multi-file runs; half the cores when unset
    pub threads: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Dot,
            verbose: false,
            prune: false,
            pretty: false,
            threads: None,
        }
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn exporter(&self) -> Box<dyn GraphExporter> {
        match self.format {
            OutputFormat::Dot => Box::new(DotExporter::new(self.verbose)),
            OutputFormat::Json => Box::new(JsonExporter {
                pretty: self.pretty,
            }),
            OutputFormat::Bincode => Box::new(BincodeExporter),
        }
    }
}
