use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use casey_core::{Features, SelectionMode};
use casey_engine::{ApiSettings, EngineConfig};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "casey.ron";

/// Settings read from the optional RON file. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_bytes: u64,
    pub selection: SelectionMode,
    pub mock_fallback: bool,
    /// Document-store URL that receives landing contact submissions.
    pub contact_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        let features = Features::default();
        Self {
            api_base_url: api.base_url,
            output_dir: PathBuf::from("output"),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            max_download_bytes: api.max_download_bytes,
            selection: features.selection,
            mock_fallback: features.mock_fallback,
            contact_endpoint: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub output: Option<PathBuf>,
    pub flat: bool,
    pub no_demo_fallback: bool,
}

impl AppConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base) = overrides.api_base {
            self.api_base_url = base;
        }
        if let Some(output) = overrides.output {
            self.output_dir = output;
        }
        if overrides.flat {
            self.selection = SelectionMode::Flat;
        }
        if overrides.no_demo_fallback {
            self.mock_fallback = false;
        }
    }

    pub fn features(&self) -> Features {
        Features {
            selection: self.selection,
            mock_fallback: self.mock_fallback,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_download_bytes: self.max_download_bytes,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: self.api_settings(),
            output_dir: self.output_dir.clone(),
            clock: Arc::new(Utc::now),
        }
    }
}

/// Reads the config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Like [`load_config`], but a broken file only costs a warning.
pub fn load_or_default(path: &Path) -> AppConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            engine_warn!("{}; using default settings", err);
            eprintln!("Warning: {err}; using default settings");
            AppConfig::default()
        }
    }
}
