//! Builders for the HTTP state from configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use dispatch::domain::ports::DrivenPorts;
use dispatch::inbound::http::state::HttpState;
use dispatch::outbound::memory::MemoryStore;
use dispatch::outbound::persistence;

use super::ServerConfig;

/// Pick PostgreSQL adapters when a pool is configured, otherwise an
/// in-memory store that lives as long as the process.
fn driven_ports(config: &ServerConfig) -> DrivenPorts {
    let hasher = Arc::new(config.hasher);
    match &config.db_pool {
        Some(pool) => persistence::driven_ports(pool, hasher, Arc::new(DefaultClock)),
        None => {
            warn!("no database configured; state is kept in memory and lost on exit");
            MemoryStore::new().driven_ports(hasher)
        }
    }
}

pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::from_driven(
        driven_ports(config),
        config.login_policy.clone(),
    ))
}
