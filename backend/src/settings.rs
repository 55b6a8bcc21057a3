//! Application settings loaded via OrthoConfig.
//!
//! Every value may come from a `DISPATCH_*` environment variable, a config
//! file or the command line. Session cookie settings are read separately by
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{LoginPolicy, Role};
use crate::outbound::credentials::HashCost;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Failure interpreting a loaded setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{0}'")]
    BindAddr(String),
    #[error("unknown role '{0}' in login_roles")]
    LoginRole(String),
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DISPATCH")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Roles accepted by `POST /login`. Unset or empty accepts all. The
    /// environment takes a comma list (`user,technician`) or, for a single
    /// role, a JSON array (`["admin"]`).
    pub login_roles: Option<Vec<String>>,
    /// Apply embedded migrations before serving. Defaults to on.
    pub run_migrations: Option<bool>,
    /// Argon2 memory cost in KiB for new password digests.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 passes over memory for new password digests.
    pub hash_iterations: Option<u32>,
}

impl AppSettings {
    /// Resolved listen address, `0.0.0.0:8080` by default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr.as_deref() {
            None => Ok(DEFAULT_BIND_ADDR),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::BindAddr(raw.to_owned())),
        }
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Work factors for new password digests, defaulting per field.
    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.hash_memory_kib.unwrap_or(HashCost::DEFAULT.memory_kib),
            iterations: self.hash_iterations.unwrap_or(HashCost::DEFAULT.iterations),
            ..HashCost::DEFAULT
        }
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Login policy built from `login_roles`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::LoginRole`] for an unrecognised role token.
    pub fn login_policy(&self) -> Result<LoginPolicy, SettingsError> {
        let roles = self
            .login_roles
            .iter()
            .flatten()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<Role>()
                    .map_err(|_| SettingsError::LoginRole(token.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoginPolicy::new(roles))
    }
}
