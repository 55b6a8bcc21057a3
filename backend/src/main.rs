//! Backend entry-point: loads settings, prepares storage and serves the REST API.

mod server;

use std::time::Duration;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dispatch::inbound::http::health::HealthState;
use dispatch::inbound::http::session_config::{BuildMode, session_settings_from_env};
use dispatch::outbound::credentials::Argon2PasswordHasher;
use dispatch::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use dispatch::settings::AppSettings;
use server::{ServerConfig, create_server};

const POOL_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let login_policy = settings.login_policy().map_err(std::io::Error::other)?;
    let hasher = Argon2PasswordHasher::new(settings.hash_cost()).map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_login_policy(login_policy)
    .with_hasher(hasher);

    if let Some(database_url) = settings.database_url.as_deref() {
        if settings.run_migrations() {
            run_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
        }
        let pool = DbPool::new(
            PoolConfig::new(database_url)
                .with_max_size(settings.pool_max_size())
                .with_connection_timeout(POOL_CONNECT_TIMEOUT),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server listening");
    server.await
}
