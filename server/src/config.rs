use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use connect4::Difficulty;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "CONNECT4_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Used when a request names neither a difficulty nor a depth.
    pub default_difficulty: Difficulty,
    /// Deepest search a single request may ask for.
    pub max_depth: u8,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            default_difficulty: Difficulty::Medium,
            max_depth: 8,
            log_filter: "info,tower_http=debug".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file named by `CONNECT4_CONFIG`, or the defaults if unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Validation("max_depth must be > 0".into()));
        }
        if self.default_difficulty.depth() > self.max_depth {
            return Err(ConfigError::Validation(format!(
                "default_difficulty {} searches deeper than max_depth {}",
                self.default_difficulty, self.max_depth
            )));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr
            .parse()
            .map_err(|_| ConfigError::Validation(format!("invalid addr {:?}", self.addr)))
    }
}
