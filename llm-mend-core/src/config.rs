use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_ROOT: &str = "./src2";
pub const DEFAULT_SUFFIX: &str = ".rs";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-0125-preview";

/// Built-in system instruction sent with every transformation request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Your task is to fix code errors in the file provided and make it logical. \
Reply with the complete corrected file content only.";

/// Full run configuration. Every section falls back to defaults when omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub service: ServiceSettings,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            root = %self.source.root.display(),
            suffix = %self.source.suffix,
            model = %self.service.model,
            max_concurrency = ?self.pipeline.max_concurrency,
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// Which files to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub root: PathBuf,
    pub suffix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Where and how to reach the text-generation service. The API key is not part of
/// this struct; it is injected from the environment by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub model: String,
    pub system_instruction: Option<String>,
}

impl ServiceSettings {
    pub fn instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on item tasks in flight at once. `None` launches every item immediately.
    pub max_concurrency: Option<NonZeroUsize>,
}
