//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable against the in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, CategoryCatalog, ClaimCommand, ClaimQuery, DrivenPorts, IdentityResolver, RatingCommand,
    RatingQuery, ServiceRequestCommand, ServiceRequestQuery, TechnicianDirectory,
};
use crate::domain::{
    AccountService, Actor, CategoryService, ClaimService, Error, LoginPolicy, RatingService, RelationLoader,
    ServiceRequestService, TechnicianService,
};

use super::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub identity: Arc<dyn IdentityResolver>,
    pub service_requests: Arc<dyn ServiceRequestCommand>,
    pub service_requests_query: Arc<dyn ServiceRequestQuery>,
    pub claims: Arc<dyn ClaimCommand>,
    pub claims_query: Arc<dyn ClaimQuery>,
    pub technicians: Arc<dyn TechnicianDirectory>,
    pub ratings: Arc<dyn RatingCommand>,
    pub ratings_query: Arc<dyn RatingQuery>,
    pub categories: Arc<dyn CategoryCatalog>,
}

impl HttpState {
    /// Build the workflow services on top of the driven adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use dispatch::domain::LoginPolicy;
    /// use dispatch::inbound::http::state::HttpState;
    /// use dispatch::outbound::credentials::Argon2PasswordHasher;
    /// use dispatch::outbound::memory::MemoryStore;
    ///
    /// let ports = MemoryStore::new().driven_ports(Arc::new(Argon2PasswordHasher::default()));
    /// let state = HttpState::from_driven(ports, LoginPolicy::default());
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn from_driven(ports: DrivenPorts, login_policy: LoginPolicy) -> Self {
        let DrivenPorts {
            users,
            technicians,
            categories,
            service_requests,
            claims,
            ratings,
            hasher,
            clock,
        } = ports;
        let relations = RelationLoader::new(
            users.clone(),
            technicians.clone(),
            categories.clone(),
            claims.clone(),
        );

        let accounts = Arc::new(AccountService::new(
            users,
            technicians.clone(),
            hasher.clone(),
            login_policy,
        ));
        let requests = Arc::new(ServiceRequestService::new(
            service_requests.clone(),
            relations.clone(),
        ));
        let claim_service = Arc::new(ClaimService::new(claims, relations, clock));
        let rating_service = Arc::new(RatingService::new(
            ratings.clone(),
            service_requests,
            technicians.clone(),
        ));
        let directory = Arc::new(TechnicianService::new(technicians, ratings, hasher));

        Self {
            accounts: accounts.clone(),
            identity: accounts,
            service_requests: requests.clone(),
            service_requests_query: requests,
            claims: claim_service.clone(),
            claims_query: claim_service,
            technicians: directory,
            ratings: rating_service.clone(),
            ratings_query: rating_service,
            categories: Arc::new(CategoryService::new(categories)),
        }
    }

    /// Resolve the session user into an [`Actor`], failing with 401 when the
    /// session is anonymous or the account has gone.
    pub async fn actor(&self, session: &SessionContext) -> Result<Actor, Error> {
        let user_id = session.require_user_id()?;
        self.identity.resolve(user_id).await
    }
}
