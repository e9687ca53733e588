//! Configuration loader for wabridge.
//!
//! Reads `config.toml` from the data directory (`~/.wabridge/` in production)
//! into [`BridgeConfig`], then applies environment overrides. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use wabridge_types::config::BridgeConfig;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the data directory.
pub const DATA_DIR_VAR: &str = "WABRIDGE_DATA_DIR";

/// Resolve the data directory.
///
/// Priority:
/// 1. `WABRIDGE_DATA_DIR` environment variable
/// 2. `~/.wabridge`
/// 3. `.wabridge` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_VAR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".wabridge");
    }

    PathBuf::from(".wabridge")
}

/// Load `{data_dir}/config.toml` and apply environment overrides.
pub async fn load_bridge_config(data_dir: &Path) -> BridgeConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load `{data_dir}/config.toml` without looking at the environment.
///
/// - Missing file: [`BridgeConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config_file(data_dir: &Path) -> BridgeConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
    };

    match toml::from_str::<BridgeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BridgeConfig::default()
        }
    }
}

/// Overlay environment variables onto `config`.
///
/// `lookup` resolves a variable name; empty values are ignored.
pub fn apply_env_overrides(config: &mut BridgeConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(id) = get("OPENAI_ASSISTANT_ID") {
        config.assistant.assistant_id = Some(id);
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.assistant.base_url = url;
    }
    if let Some(name) = get("ASSISTANT_NAME") {
        config.assistant.name = name;
    }
    if let Some(instructions) = get("ASSISTANT_INSTRUCTIONS") {
        config.assistant.instructions = instructions;
    }
    if let Some(model) = get("ASSISTANT_MODEL") {
        config.assistant.model = model;
    }
}

/// Read the API credential from the environment.
pub fn api_key_from_env() -> Option<SecretString> {
    api_key_from(|key| std::env::var(key).ok())
}

/// Resolve the API credential through `lookup`. Blank values count as absent.
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<SecretString> {
    lookup(API_KEY_VAR)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
