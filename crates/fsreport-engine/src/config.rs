//! Engine and run configuration.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use fsreport_analyze::{FileCountAnalyser, FileTypeCountAnalyser};
use fsreport_core::TreeOptions;

/// Execution settings for the analyser engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct EngineConfig {
    /// Per-analyser time limit. `None` waits indefinitely.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Maximum analysers running at once (0 = one worker per analyser).
    #[serde(default)]
    pub max_concurrency: usize,
}

impl EngineConfig {
    /// Create a new config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Output encoding of the merged report.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// A single JSON document holding every section.
    #[default]
    Json,
    /// One plain-text block per section.
    Text,
}

impl ReportFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

/// Analysers requested when the caller names none.
pub fn default_analysers() -> Vec<String> {
    vec![
        FileCountAnalyser::ID.to_string(),
        FileTypeCountAnalyser::ID.to_string(),
    ]
}

/// Everything one end-to-end run needs.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RunConfig {
    /// How the tree is built.
    #[builder(default)]
    #[serde(default)]
    pub tree: TreeOptions,

    /// Analyser identifiers in the order their sections should appear.
    #[builder(default = "default_analysers()")]
    #[serde(default = "default_analysers")]
    pub analysers: Vec<String>,

    /// Destination of the merged report.
    pub output: PathBuf,

    /// Encoding of the merged report.
    #[builder(default)]
    #[serde(default)]
    pub format: ReportFormat,

    /// Execution settings.
    #[builder(default)]
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RunConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(output) = &self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl RunConfig {
    /// Create a new config builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Default run against `root`, writing to `output`.
    pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            tree: TreeOptions::new(root),
            analysers: default_analysers(),
            output: output.into(),
            format: ReportFormat::default(),
            engine: EngineConfig::default(),
        }
    }
}
