/// `load_config` module: loads a static YAML config and the secrets that must come from the environment.
///
/// This module is the only place where untrusted YAML is parsed and mapped into the core's
/// strongly-typed [`Config`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into typed sections (missing sections take defaults)
/// - Reject invalid values early (e.g. `max_concurrency: 0`)
/// - Read the service API key from `OPENAI_API_KEY`; it never lives in the YAML file
///
/// # Errors
/// All errors use `anyhow::Error` for context-rich diagnostics and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use llm_mend_core::config::Config;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(Config::default());
    }

    match serde_yaml::from_str::<Config>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Reads the service API key from the environment.
pub fn api_key_from_env() -> Result<String> {
    let key = std::env::var(API_KEY_VAR)
        .with_context(|| format!("{API_KEY_VAR} environment variable not set"))?;
    if key.trim().is_empty() {
        error!("{API_KEY_VAR} is set but empty");
        anyhow::bail!("{API_KEY_VAR} environment variable is empty");
    }
    info!("{API_KEY_VAR} found in env");
    Ok(key)
}
