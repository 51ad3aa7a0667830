//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.grip/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::pointer;
use crate::core::reveal::DEFAULT_CADENCE;
use crate::core::state::DEFAULT_GREETING;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GripConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    pub state_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub reveal_cadence_ms: Option<u64>,
    pub greeting: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub reveal_cadence: Duration,
    pub greeting: String,
    pub state_file: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.grip/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".grip").join("config.toml"))
}

/// Load config from `~/.grip/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `GripConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<GripConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(GripConfig::default())
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<GripConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(GripConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GripConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Grip Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# state_file = "/home/me/.grip/state.json"   # remembers the open session

# [server]
# base_url = "http://127.0.0.1:5001"          # Or set GRIP_BASE_URL env var
# request_timeout_secs = 60

# [ui]
# reveal_cadence_ms = 5                        # Delay between revealed characters
# greeting = "Hello! I am Grip. How can I help you today?"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_cadence_ms` are from CLI flags (None = not specified).
pub fn resolve(
    config: &GripConfig,
    cli_base_url: Option<&str>,
    cli_cadence_ms: Option<u64>,
) -> ResolvedConfig {
    resolve_with_env(
        config,
        cli_base_url,
        cli_cadence_ms,
        std::env::var("GRIP_BASE_URL").ok(),
    )
}

fn resolve_with_env(
    config: &GripConfig,
    cli_base_url: Option<&str>,
    cli_cadence_ms: Option<u64>,
    env_base_url: Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or(env_base_url)
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let reveal_cadence = cli_cadence_ms
        .or(config.ui.reveal_cadence_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_CADENCE);

    let state_file = config
        .state_file
        .as_ref()
        .map(PathBuf::from)
        .or_else(pointer::default_path)
        .unwrap_or_else(|| PathBuf::from(".grip-state.json"));

    ResolvedConfig {
        base_url,
        request_timeout: Duration::from_secs(
            config
                .server
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        reveal_cadence,
        greeting: config
            .ui
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        state_file,
    }
}
