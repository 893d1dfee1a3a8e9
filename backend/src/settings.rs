//! Console settings loaded via OrthoConfig.
//!
//! Values come from `SATISFACTURE_*` environment variables, an optional
//! configuration file, and command-line flags. Secrets such as the session key
//! are read separately by [`crate::inbound::http::session_config`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{BootstrapAdmin, DEFAULT_FIRM_NAME};
use crate::outbound::persistence::PoolConfig;
use crate::outbound::sat_api::normalise_base_url;

/// SAT API used when no override is configured.
pub const DEFAULT_SAT_API_BASE_URL: &str = "http://sat-api-alb-532045601.us-east-1.elb.amazonaws.com/";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("SATISFACTURE_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The SAT API base URL did not parse.
    #[error("invalid SAT API base URL {value}: {source}")]
    InvalidSatApiUrl {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The bind address did not parse.
    #[error("invalid bind address {value}: {source}")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime settings for the console server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SATISFACTURE")]
pub struct ConsoleSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Database name replacing the one in the URL path.
    pub database_name: Option<String>,
    /// Base URL of the remote SAT API.
    pub sat_api_base_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Username of the admin account seeded at start-up.
    pub bootstrap_admin_username: Option<String>,
    /// Password of the seeded admin; seeding is skipped without one.
    pub bootstrap_admin_password: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Firm named in the client confidentiality notice.
    pub firm_name: Option<String>,
}

impl ConsoleSettings {
    /// Pool configuration for the registry database.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url)
            .with_database_name(self.database_name.clone())
            .with_max_size(self.db_max_connections))
    }

    /// SAT API base URL with a trailing slash.
    pub fn sat_api_base_url(&self) -> Result<Url, SettingsError> {
        let value = self
            .sat_api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_SAT_API_BASE_URL);
        Url::parse(value)
            .map(normalise_base_url)
            .map_err(|source| SettingsError::InvalidSatApiUrl {
                value: value.to_owned(),
                source,
            })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Admin account to seed at start-up.
    pub fn bootstrap_admin(&self) -> BootstrapAdmin {
        BootstrapAdmin::new(
            self.bootstrap_admin_username
                .as_deref()
                .unwrap_or(DEFAULT_ADMIN_USERNAME),
            self.bootstrap_admin_password.clone(),
        )
    }

    /// Firm named in the confidentiality notice.
    pub fn firm_name(&self) -> &str {
        self.firm_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_FIRM_NAME)
    }
}
