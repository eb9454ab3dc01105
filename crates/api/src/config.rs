//! Configuration management.
//!
//! Values come from an optional file named by `TENDERHUB_CONFIG`, overlaid by
//! `TENDERHUB__SECTION__KEY` environment variables (e.g.
//! `TENDERHUB__DATABASE__URL`). A `.env` file is honoured when present.

use serde::Deserialize;

use tenderhub_core::{ConcurrencyMode, LifecyclePolicy, TransitionPolicy};
use tenderhub_observability::LogSettings;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleConfig {
    /// Only allow Created → Published → Closed (and Created → Closed).
    #[serde(default)]
    pub strict_transitions: bool,

    /// Reject writes that race with another mutation of the same record.
    #[serde(default)]
    pub compare_and_swap: bool,
}

impl LifecycleConfig {
    pub fn policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            transitions: if self.strict_transitions {
                TransitionPolicy::strict()
            } else {
                TransitionPolicy::free()
            },
            concurrency: if self.compare_and_swap {
                ConcurrencyMode::CompareAndSwap
            } else {
                ConcurrencyMode::LastWriteWins
            },
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

impl Config {
    /// Load configuration from the environment and an optional config file.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var("TENDERHUB_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("TENDERHUB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }
}
