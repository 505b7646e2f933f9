use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dataset::DatasetSource;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed by CORS. Empty means any origin (development
    /// posture); list specific origins for production.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Graph dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// TOML dataset to serve. Absent means the builtin seed network.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// Connections pulled in per endpoint by the visualization routes.
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,
    /// Reload automatically when the dataset file changes on disk.
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            neighbor_limit: default_neighbor_limit(),
            watch: false,
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

fn default_port() -> u16 {
    3001
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_neighbor_limit() -> usize {
    5
}

fn default_watch_debounce_ms() -> u64 {
    500
}

impl Config {
    /// Load configuration.
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path specified in SIXDEG_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory
    /// 3. No file at all: built-in defaults serving the builtin dataset
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        match std::env::var("SIXDEG_CONFIG") {
            Ok(explicit) => {
                let path = PathBuf::from(explicit);
                if !path.exists() {
                    anyhow::bail!(
                        "SIXDEG_CONFIG points at {}, which does not exist",
                        path.display()
                    );
                }
                Self::load_from(&path)
            }
            Err(_) => {
                let fallback = PathBuf::from("config.toml");
                if fallback.exists() {
                    Self::load_from(&fallback)
                } else {
                    log::info!("No config.toml found; using defaults with the builtin dataset");
                    let config = Config::default();
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        if self.graph.neighbor_limit == 0 {
            anyhow::bail!("graph.neighbor_limit must be greater than 0");
        }

        if let Some(path) = &self.graph.dataset_path {
            if !path.is_file() {
                anyhow::bail!(
                    "graph.dataset_path does not exist: {}. Point it at a dataset TOML file.",
                    path.display()
                );
            }
        } else if self.graph.watch {
            anyhow::bail!("graph.watch requires graph.dataset_path; the builtin dataset cannot change on disk");
        }

        if self.graph.watch && self.graph.watch_debounce_ms == 0 {
            anyhow::bail!("graph.watch_debounce_ms must be greater than 0");
        }

        Ok(())
    }

    /// Where the serving graph is loaded from.
    pub fn dataset_source(&self) -> DatasetSource {
        DatasetSource::from_path(self.graph.dataset_path.as_deref())
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
