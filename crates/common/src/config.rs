//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Deadline sweep configuration.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// An administrative principal and its bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminToken {
    /// Admin identifier recorded as `issued_by` on manual actions.
    pub id: String,
    /// Bearer token presented by the administrative client.
    pub token: String,
}

/// Authentication configuration.
///
/// The identity/session provider is external; this engine only validates
/// bearer tokens against the configured principals.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Administrative principals.
    #[serde(default)]
    pub admin_tokens: Vec<AdminToken>,
    /// Shared secret presented by the external scheduler on sweep triggers.
    pub scheduler_token: String,
    /// Token presented by the external violation detector.
    pub ingest_token: String,
}

/// Deadline sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Maximum number of expired actions picked up per sweep.
    #[serde(default = "default_sweep_batch_limit")]
    pub batch_limit: u64,
    /// Per-row escalation timeout in seconds.
    #[serde(default = "default_row_timeout_secs")]
    pub row_timeout_secs: u64,
    /// Hours granted to resolve an automatically escalated action before
    /// the next deadline sweep picks it up.
    #[serde(default = "default_escalation_window_hours")]
    pub escalation_window_hours: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_sweep_batch_limit(),
            row_timeout_secs: default_row_timeout_secs(),
            escalation_window_hours: default_escalation_window_hours(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    50
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_sweep_batch_limit() -> u64 {
    500
}

const fn default_row_timeout_secs() -> u64 {
    10
}

const fn default_escalation_window_hours() -> u64 {
    72
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `GAVEL_ENV`)
    /// 3. Environment variables with `GAVEL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("GAVEL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GAVEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("GAVEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Look up the admin id for a presented bearer token.
    #[must_use]
    pub fn admin_id_for_token(&self, token: &str) -> Option<&str> {
        self.auth
            .admin_tokens
            .iter()
            .find(|t| t.token == token)
            .map(|t| t.id.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/gavel".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            auth: AuthConfig {
                admin_tokens: vec![AdminToken {
                    id: "admin1".to_string(),
                    token: "secret-a".to_string(),
                }],
                scheduler_token: "sched".to_string(),
                ingest_token: "ingest".to_string(),
            },
            sweep: SweepConfig::default(),
        }
    }

    #[test]
    fn test_admin_token_lookup() {
        let config = test_config();
        assert_eq!(config.admin_id_for_token("secret-a"), Some("admin1"));
        assert_eq!(config.admin_id_for_token("wrong"), None);
    }

    #[test]
    fn test_sweep_defaults() {
        let sweep = SweepConfig::default();
        assert_eq!(sweep.batch_limit, 500);
        assert_eq!(sweep.row_timeout_secs, 10);
        assert_eq!(sweep.escalation_window_hours, 72);
    }
}
