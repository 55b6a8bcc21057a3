//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler plus the health probes, the
//! domain schemas they return and the session cookie security scheme. The
//! document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Category, Claim, ClaimStats, ClaimStatus, ClaimView, ContactDetails, Error, ErrorCode,
    Rating, RatingSummary, RequestKind, Role, ServiceRequest, ServiceRequestStats,
    ServiceRequestStatus, ServiceRequestView, Technician, TimeShift, UserAccount,
};
use crate::domain::ports::ServiceRequestList;
use crate::inbound::http::accounts::{AccountRequest, LoginRequest};
use crate::inbound::http::claims::{AnswerBody, CreateClaimBody, UpdateClaimBody};
use crate::inbound::http::schemas::ClaimPageSchema;
use crate::inbound::http::service_requests::{
    AdminUpdateBody, CreateServiceRequestBody, StatusBody,
};
use crate::inbound::http::technicians::{CreateTechnicianBody, ReviewBody, UpdateTechnicianBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dispatch API",
        description = "Service requests, claims and technician ratings for a technician-dispatch workflow."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::login_with_role,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::create_admin,
        crate::inbound::http::service_requests::create_service_request,
        crate::inbound::http::service_requests::list_own_requests,
        crate::inbound::http::service_requests::list_all_requests,
        crate::inbound::http::service_requests::request_stats,
        crate::inbound::http::service_requests::list_unassigned_requests,
        crate::inbound::http::service_requests::list_my_requests,
        crate::inbound::http::service_requests::get_service_request,
        crate::inbound::http::service_requests::assign_to_myself,
        crate::inbound::http::service_requests::update_request_status,
        crate::inbound::http::service_requests::admin_update_request,
        crate::inbound::http::service_requests::delete_service_request,
        crate::inbound::http::claims::create_claim,
        crate::inbound::http::claims::list_own_claims,
        crate::inbound::http::claims::list_all_claims,
        crate::inbound::http::claims::claim_stats,
        crate::inbound::http::claims::answer_claim,
        crate::inbound::http::claims::update_claim_status,
        crate::inbound::http::claims::update_claim,
        crate::inbound::http::claims::delete_claim,
        crate::inbound::http::technicians::list_technicians,
        crate::inbound::http::technicians::create_technician,
        crate::inbound::http::technicians::show_technician,
        crate::inbound::http::technicians::update_technician,
        crate::inbound::http::technicians::delete_technician,
        crate::inbound::http::technicians::create_review,
        crate::inbound::http::ratings::list_rating_summaries,
        crate::inbound::http::time_shifts::list_time_shifts,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        UserAccount,
        ContactDetails,
        Category,
        RequestKind,
        ServiceRequestStatus,
        ServiceRequest,
        ServiceRequestView,
        ServiceRequestList,
        ServiceRequestStats,
        ClaimStatus,
        Claim,
        ClaimView,
        ClaimStats,
        ClaimPageSchema,
        Technician,
        Rating,
        RatingSummary,
        TimeShift,
        AccountRequest,
        LoginRequest,
        CreateServiceRequestBody,
        StatusBody,
        AdminUpdateBody,
        CreateClaimBody,
        AnswerBody,
        UpdateClaimBody,
        CreateTechnicianBody,
        UpdateTechnicianBody,
        ReviewBody,
    )),
    tags(
        (name = "accounts", description = "Registration, login and administrator bootstrap"),
        (name = "service-requests", description = "Service request lifecycle"),
        (name = "claims", description = "Customer claims and their answers"),
        (name = "technicians", description = "Technician directory and reviews"),
        (name = "ratings", description = "Rating summaries"),
        (name = "reference", description = "Static reference data"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_properties(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/login/{role}")]
    #[case("/api/v1/service-requests/admin/all")]
    #[case("/api/v1/service-requests/{id}/assign-to-myself")]
    #[case("/api/v1/claims/{id}/answer")]
    #[case("/api/v1/technicians/{id}/reviews")]
    #[case("/api/v1/ratings")]
    #[case("/api/v1/time-shifts")]
    #[case("/api/v1/categories")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_has_required_fields() {
        let fields = schema_properties("Error");
        for field in ["code", "message", "traceId", "details"] {
            assert!(fields.iter().any(|f| f == field), "Error lacks {field}");
        }
    }

    #[rstest]
    fn claim_page_uses_camel_case() {
        let fields = schema_properties("ClaimPage");
        for field in ["data", "total", "page", "perPage", "lastPage"] {
            assert!(fields.iter().any(|f| f == field), "ClaimPage lacks {field}");
        }
    }

    #[rstest]
    fn session_cookie_scheme_is_declared() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
