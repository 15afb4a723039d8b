use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// The DSN itself never lives in YAML: `url_env` names the variable that
/// holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url_env: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url_env: "EMB_DATABASE_URL".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Read the DSN from the environment. The error names the variable, never a value.
    pub fn resolve_url(&self) -> Result<String> {
        let url = std::env::var(&self.url_env)
            .with_context(|| format!("missing env var {}", self.url_env))?;
        if url.trim().is_empty() {
            bail!("env var {} is empty", self.url_env);
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub insert_timeout_ms: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            insert_timeout_ms: 1000,
        }
    }
}

impl JobsConfig {
    pub fn insert_timeout(&self) -> Duration {
        Duration::from_millis(self.insert_timeout_ms)
    }
}

impl AppConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.addr.trim().is_empty() {
            bail!("CONFIG_INVALID server.addr must not be empty");
        }
        if self.database.url_env.trim().is_empty() {
            bail!("CONFIG_INVALID database.url_env must name an env var");
        }
        if self.database.max_connections == 0 {
            bail!("CONFIG_INVALID database.max_connections must be >= 1");
        }
        if self.jobs.insert_timeout_ms == 0 {
            bail!("CONFIG_INVALID jobs.insert_timeout_ms must be >= 1");
        }
        Ok(())
    }

    /// Listen address after overrides: `cli` beats `env`, which beats the file.
    pub fn effective_addr(&self, env: Option<&str>, cli: Option<&str>) -> String {
        cli.or(env)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.server.addr)
            .to_string()
    }
}
