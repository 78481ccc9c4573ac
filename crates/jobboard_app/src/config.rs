use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobboard_logging::{board_debug, board_info};
use jobboard_remote::ClientSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

pub const CONFIG_ENV: &str = "JOBBOARD_CONFIG";
pub const BASE_URL_ENV: &str = "JOBBOARD_BASE_URL";
const DEFAULT_CONFIG_FILE: &str = "./jobboard.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_destination: LogDestination,
    /// Where the session file lives; the platform data dir when unset.
    pub state_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            log_destination: LogDestination::default(),
            state_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads `$JOBBOARD_CONFIG` (or `./jobboard.ron`) and applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            board_info!("base url overridden by {}", BASE_URL_ENV);
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                board_debug!("no config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn parse(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|err| err.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) url, got {:?}",
                self.base_url
            )));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".into()));
        }
        Ok(())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.trim().to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "jobboard")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
