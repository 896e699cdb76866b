// SPDX-License-Identifier: Apache-2.0
use serde::Deserialize;

/// Configuration loaded from environment variables.
///
/// All configuration is externalized to support 12-factor app deployment.
/// Every field has a default, so loading never fails on absent variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: json)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Database host for the connectivity probe
    #[serde(default)]
    pub postgres_host: Option<String>,

    /// Database port (default: "5432"); kept verbatim and parsed at probe
    /// time, so a malformed value is reported by the probe
    #[serde(default = "default_postgres_port")]
    pub postgres_port: String,

    /// Database user for the connectivity probe
    #[serde(default)]
    pub postgres_user: Option<String>,

    /// Database password for the connectivity probe
    #[serde(default)]
    pub postgres_password: Option<String>,

    /// Database name for the connectivity probe
    #[serde(default)]
    pub postgres_db: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_postgres_port() -> String {
    "5432".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are uppercase with underscore separators.
    /// Example: `POSTGRES_HOST`, `LOG_LEVEL`, etc.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
