//! Exporter configuration: settings file plus environment overrides.
//!
//! Resolution order, lowest to highest precedence:
//! 1. Built-in defaults (port 8000, public IC API)
//! 2. `KEY=VALUE` lines in the settings file (`.env` by default)
//! 3. Process environment variables of the same name
//!
//! The settings file is parsed but never injected into the process
//! environment, so precedence stays explicit.

use std::collections::HashMap;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_URL: &str = "https://ic-api.internetcomputer.org";

const PORT_KEY: &str = "EXPORTER_PORT";
const PROVIDER_KEY: &str = "NODE_PROVIDER_ID";
const API_URL_KEY: &str = "IC_API_URL";

const KNOWN_KEYS: [&str; 3] = [PORT_KEY, PROVIDER_KEY, API_URL_KEY];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find NODE_PROVIDER_ID value. Specify it in your settings file or as an environment variable")]
    MissingProviderId,

    #[error("Invalid EXPORTER_PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Failed to read settings file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

/// Validated exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the metrics endpoint listens on.
    pub listen_port: u16,
    /// Node provider whose nodes are exported. Never empty.
    pub provider_id: String,
    /// Base URL of the IC API, without trailing slash.
    pub api_base_url: String,
}

impl Config {
    /// Load from the settings file at `env_file` (optional) and the process
    /// environment.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(env_file)?;
        let env_vars: HashMap<String, String> = KNOWN_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::resolve(&file_vars, &env_vars)
    }

    /// Merge file and environment values. Environment wins.
    fn resolve(
        file_vars: &HashMap<String, String>,
        env_vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| -> Option<String> {
            if let Some(value) = env_vars.get(key) {
                info!(key, value = %value, "Found environment variable");
                return Some(value.trim().to_string());
            }
            if let Some(value) = file_vars.get(key) {
                info!(key, value = %value, "Found value in settings file");
                return Some(value.trim().to_string());
            }
            None
        };

        let listen_port = match lookup(PORT_KEY) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value: raw.clone(), source })?,
            None => DEFAULT_PORT,
        };

        let provider_id = lookup(PROVIDER_KEY)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingProviderId)?;

        let api_base_url = lookup(API_URL_KEY)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { listen_port, provider_id, api_base_url })
    }
}

/// Parse the settings file into key/value pairs. A missing file is not an error.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.is_file() {
        debug!(path = %path.display(), "No settings file found");
        return Ok(HashMap::new());
    }

    info!(path = %path.display(), "Found settings file");
    let to_err = |source: dotenv::Error| ConfigError::EnvFile { path: path.to_path_buf(), source };

    let mut vars = HashMap::new();
    for item in dotenv::from_path_iter(path).map_err(to_err)? {
        let (key, value) = item.map_err(to_err)?;
        vars.insert(key, value);
    }
    Ok(vars)
}
