//! Configuration resolution for Shroud.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/shroud/settings.json)
//! 3. Project config (.shroud/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Shroud configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub envelope: EnvelopeConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Size limits enforced before any encryption happens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum canonical payload size in bytes.
    pub max_payload_bytes: usize,
    /// Maximum number of envelope recipients, sender included.
    pub max_recipients: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 10 * 1024 * 1024, // 10 MB
            max_recipients: 64,
        }
    }
}

/// Envelope construction policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Wrap the data key for the submitting party as well, so the sender can
    /// reopen their own transactions.
    pub include_sender: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            include_sender: true,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// Files are merged key by key, so a project file that sets only
/// `limits.max_recipients` keeps everything else from the global file.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut merged = serde_json::to_value(Config::default())?;

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            merge_config(&mut merged, load_config_file(&global_path)?);
        }
    }

    // Load project config
    if let Some(dir) = project_dir {
        let project_path = project_config_path(dir);
        if project_path.exists() {
            merge_config(&mut merged, load_config_file(&project_path)?);
        }
    }

    let mut config: Config = serde_json::from_value(merged)
        .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Path of the project-level settings file under `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".shroud").join("settings.json")
}

/// Global settings file in the platform config directory.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shroud").join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    if !value.is_object() {
        return Err(Error::Config(format!(
            "Config file {} must contain a JSON object",
            path.display()
        )));
    }
    Ok(value)
}

/// Overlay `overlay` onto `base`. Objects merge recursively; any other value
/// replaces what was there.
fn merge_config(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_config(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("SHROUD_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = var("SHROUD_LOG_JSON") {
        if let Some(flag) = parse_flag(&val) {
            config.logging.json = flag;
        }
    }
    if let Some(val) = var("SHROUD_MAX_PAYLOAD_BYTES") {
        if let Ok(n) = val.parse() {
            config.limits.max_payload_bytes = n;
        }
    }
    if let Some(val) = var("SHROUD_MAX_RECIPIENTS") {
        if let Ok(n) = val.parse() {
            config.limits.max_recipients = n;
        }
    }
    if let Some(val) = var("SHROUD_INCLUDE_SENDER") {
        if let Some(flag) = parse_flag(&val) {
            config.envelope.include_sender = flag;
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
