//! Domain primitives, workflow services and ports.
//!
//! Purpose: define the strongly typed entities of the dispatch workflow, the
//! authorization policy set and the services that drive the service request
//! and claim state machines. Nothing here knows about HTTP or SQL; inbound
//! adapters call the driving ports and outbound adapters implement the
//! driven ones in [`ports`].
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`Actor`] and [`Role`]: the resolved caller every operation receives.
//! - [`ServiceRequestStatus`] and [`ClaimStatus`]: the two lifecycle graphs.
//! - `*Service` types implementing the driving ports.

pub mod error;
pub mod policy;
pub mod ports;
pub mod trace_id;

mod account_service;
mod auth;
mod category;
mod category_service;
mod claim;
mod claim_service;
mod ids;
mod include;
mod port_call;
mod port_errors;
mod rating;
mod rating_service;
mod relations;
mod role;
mod service_request;
mod service_request_service;
mod technician;
mod technician_service;
mod time_shift;
mod user;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginDenial, LoginPolicy, LoginValidationError};
pub use self::category::Category;
pub use self::category_service::CategoryService;
pub use self::claim::{
    Claim, ClaimFilter, ClaimPatch, ClaimStats, ClaimStatus, ClaimStatusCounts,
    ClaimValidationError, NewClaim, normalise_answer,
};
pub use self::claim_service::ClaimService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CategoryId, ClaimId, RatingId, ServiceRequestId, TechnicianId, UserId};
pub use self::include::{
    ClaimRelation, ClaimView, IncludeSet, Relation, RequestRelation, ServiceRequestView,
};
pub use self::rating::{
    NewRating, Rating, RatingSummary, SCORE_MAX, SCORE_MIN, Score, ScoreOutOfRange, mean_score,
    round_to,
};
pub use self::rating_service::RatingService;
pub use self::relations::RelationLoader;
pub use self::role::{Actor, Role, UnknownRole};
pub use self::service_request::{
    NewServiceRequest, RequestKind, SUBJECT_MAX, ServiceRequest, ServiceRequestDraft,
    ServiceRequestFilter, ServiceRequestPatch, ServiceRequestStats, ServiceRequestStatus,
    ServiceRequestStatusCounts, ServiceRequestValidationError, UnknownStatus,
};
pub use self::service_request_service::ServiceRequestService;
pub use self::technician::{NewTechnician, Technician, TechnicianPatch, TechnicianProfile};
pub use self::technician_service::TechnicianService;
pub use self::time_shift::TimeShift;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ContactDetails, NewUserAccount, NewUserRecord, PASSWORD_MIN, StoredCredentials,
    USER_TEXT_MAX, UserAccount, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use dispatch::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
