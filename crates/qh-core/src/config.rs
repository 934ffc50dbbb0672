use crate::error::{QhError, Result};
use crate::model::ANONYMIZED_MARKER;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Hard ceiling imposed by single-byte header IDs (0 is reserved).
pub const MAX_SLOTS: u16 = 255;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// A name kept as both a complete pair and a name-only header fails the build.
    Reject,
    /// The name keeps both IDs and a warning is logged.
    Warn,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceLang {
    Rust,
    Go,
}

impl SourceLang {
    pub fn extension(&self) -> &'static str {
        match self {
            SourceLang::Rust => "rs",
            SourceLang::Go => "go",
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub slot_budget: u16,
    pub protocol_version: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            slot_budget: MAX_SLOTS,
            protocol_version: "1.0".to_string(),
            duplicate_policy: DuplicatePolicy::Warn,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        if self.slot_budget == 0 || self.slot_budget > MAX_SLOTS {
            return Err(QhError::input(
                "[table]",
                format!("slot_budget must be within 1..={MAX_SLOTS}, got {}", self.slot_budget),
            ));
        }
        if self.protocol_version.trim().is_empty() {
            return Err(QhError::input("[table]", "protocol_version must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AggregateConfig {
    /// Extra value treated as anonymized. `(anonymized)` always is.
    pub anonymized_marker: String,
    /// Where the curation document is written.
    pub output: PathBuf,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            anonymized_marker: ANONYMIZED_MARKER.to_string(),
            output: PathBuf::from("header_analysis.curation.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub curation_glob: String,
    pub source_lang: SourceLang,
    pub stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            curation_glob: "*.curation.json".to_string(),
            source_lang: SourceLang::Rust,
            stem: "headers".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn source_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, self.source_lang.extension()))
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.dir.join(format!("{}.md", self.stem))
    }

    pub fn interchange_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub table: TableConfig,
    pub aggregate: AggregateConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Reads a TOML config file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| QhError::input(path, e))?;
        let config: PipelineConfig = toml::from_str(&raw).map_err(|e| QhError::input(path, e))?;
        config.validate()?;
        tracing::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        if self.aggregate.anonymized_marker.is_empty() {
            return Err(QhError::input("[aggregate]", "anonymized_marker must not be empty"));
        }
        Ok(())
    }
}
