//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use dispatch::domain::LoginPolicy;
use dispatch::outbound::credentials::Argon2PasswordHasher;
use dispatch::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) login_policy: LoginPolicy,
    pub(crate) hasher: Argon2PasswordHasher,
}

impl ServerConfig {
    /// Construct a server configuration from the session settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            login_policy: LoginPolicy::default(),
            hasher: Argon2PasswordHasher::default(),
        }
    }

    /// Attach a database connection pool. Without one the server keeps its
    /// state in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_login_policy(mut self, policy: LoginPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }
}
