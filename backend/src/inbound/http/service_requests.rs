//! Service request handlers.
//!
//! ```text
//! POST   /api/v1/service-requests
//! GET    /api/v1/service-requests/user-requests?include=technician
//! GET    /api/v1/service-requests/admin/all?status=pending&search=boiler
//! GET    /api/v1/service-requests/admin/stats
//! GET    /api/v1/service-requests/unassigned
//! GET    /api/v1/service-requests/my-requests
//! GET    /api/v1/service-requests/{id}
//! PATCH  /api/v1/service-requests/{id}/assign-to-myself
//! PATCH  /api/v1/service-requests/{id}/status {"status":"completed"}
//! PATCH  /api/v1/service-requests/{id}
//! DELETE /api/v1/service-requests/{id}
//! ```
//!
//! Fixed sub-paths must be registered before `/{id}`; see
//! [`crate::inbound::http::configure`].

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ports::ServiceRequestList;
use crate::domain::{
    CategoryId, ClaimId, Error, IncludeSet, RequestRelation, ServiceRequest, ServiceRequestDraft,
    ServiceRequestFilter, ServiceRequestId, ServiceRequestPatch, ServiceRequestStats,
    ServiceRequestStatus, ServiceRequestView, TechnicianId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, nullable, parse_optional, required};

/// `include` query parameter shared by the read endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncludeQuery {
    /// Comma-separated relations: requester, technician, category, claim.
    pub include: Option<String>,
}

impl IncludeQuery {
    fn relations(&self) -> IncludeSet<RequestRelation> {
        IncludeSet::parse(self.include.as_deref())
    }
}

/// Filters for the admin listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AdminListQuery {
    /// pending, assigned, completed or cancelled.
    pub status: Option<String>,
    pub technician_id: Option<i64>,
    /// Case-insensitive match on subject or description.
    pub search: Option<String>,
    pub include: Option<String>,
}

impl AdminListQuery {
    fn filter(&self) -> Result<ServiceRequestFilter, Error> {
        Ok(ServiceRequestFilter {
            status: parse_optional(self.status.as_deref(), FieldName::new("status"))?,
            technician_id: self.technician_id.map(TechnicianId::new),
            search: self.search.clone(),
        })
    }
}

/// Body for `POST /service-requests`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestBody {
    #[schema(value_type = i64)]
    pub category_id: Option<CategoryId>,
    #[schema(value_type = Option<i64>)]
    pub claim_id: Option<ClaimId>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub wanted_date_start: Option<NaiveDate>,
    pub wanted_date_end: Option<NaiveDate>,
    /// A time-shift name such as `morning`.
    pub time_shift: Option<String>,
}

impl CreateServiceRequestBody {
    fn into_draft(self) -> Result<ServiceRequestDraft, Error> {
        Ok(ServiceRequestDraft {
            category_id: required(self.category_id, FieldName::new("categoryId"))?,
            claim_id: self.claim_id,
            subject: required(self.subject, FieldName::new("subject"))?,
            description: required(self.description, FieldName::new("description"))?,
            wanted_date_start: required(self.wanted_date_start, FieldName::new("wantedDateStart"))?,
            wanted_date_end: required(self.wanted_date_end, FieldName::new("wantedDateEnd"))?,
            time_shift: required(self.time_shift, FieldName::new("timeShift"))?,
        })
    }
}

/// Body for the status endpoints of requests and claims.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusBody {
    pub status: Option<String>,
}

/// Body for the admin full update. Absent keys are left untouched; an
/// explicit `null` clears `technicianId` or `claimId`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateBody {
    #[schema(value_type = Option<i64>)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub claim_id: Option<Option<ClaimId>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub technician_id: Option<Option<TechnicianId>>,
    pub status: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub wanted_date_start: Option<NaiveDate>,
    pub wanted_date_end: Option<NaiveDate>,
    pub time_shift: Option<String>,
}

impl AdminUpdateBody {
    fn into_patch(self) -> Result<ServiceRequestPatch, Error> {
        Ok(ServiceRequestPatch {
            category_id: self.category_id,
            claim_id: self.claim_id,
            technician_id: self.technician_id,
            status: parse_optional(self.status.as_deref(), FieldName::new("status"))?,
            subject: self.subject,
            description: self.description,
            wanted_date_start: self.wanted_date_start,
            wanted_date_end: self.wanted_date_end,
            time_shift: self.time_shift,
        })
    }
}

fn request_id(path: web::Path<i64>) -> ServiceRequestId {
    ServiceRequestId::new(path.into_inner())
}

/// Open a new request owned by the caller. Starts `pending` and unassigned.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests",
    request_body = CreateServiceRequestBody,
    responses(
        (status = 201, description = "Request created", body = ServiceRequest),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "createServiceRequest"
)]
#[post("/service-requests")]
pub async fn create_service_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateServiceRequestBody>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    let draft = payload.into_inner().into_draft()?;
    let created = state.service_requests.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Requests opened by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/user-requests",
    params(IncludeQuery),
    responses(
        (status = 200, description = "Own requests", body = [ServiceRequestView]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "listOwnServiceRequests"
)]
#[get("/service-requests/user-requests")]
pub async fn list_own_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<IncludeQuery>,
) -> ApiResult<web::Json<Vec<ServiceRequestView>>> {
    let actor = state.actor(&session).await?;
    let views = state
        .service_requests_query
        .list_own(&actor, &query.relations())
        .await?;
    Ok(web::Json(views))
}

/// Every request, filtered. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/admin/all",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Matching requests and their count", body = ServiceRequestList),
        (status = 400, description = "Unknown status filter", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "listAllServiceRequests"
)]
#[get("/service-requests/admin/all")]
pub async fn list_all_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<ServiceRequestList>> {
    let actor = state.actor(&session).await?;
    let filter = query.filter()?;
    let include = IncludeSet::parse(query.include.as_deref());
    let list = state
        .service_requests_query
        .list_all(&actor, &filter, &include)
        .await?;
    Ok(web::Json(list))
}

/// Dashboard counters. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/admin/stats",
    responses(
        (status = 200, description = "Counters by status and assignment", body = ServiceRequestStats),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "serviceRequestStats"
)]
#[get("/service-requests/admin/stats")]
pub async fn request_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ServiceRequestStats>> {
    let actor = state.actor(&session).await?;
    let stats = state.service_requests_query.stats(&actor).await?;
    Ok(web::Json(stats))
}

/// Pending requests nobody has claimed yet. Technicians only.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/unassigned",
    params(IncludeQuery),
    responses(
        (status = 200, description = "Unassigned queue", body = [ServiceRequestView]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Technicians only", body = Error),
        (status = 404, description = "Caller has no technician profile", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "listUnassignedServiceRequests"
)]
#[get("/service-requests/unassigned")]
pub async fn list_unassigned_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<IncludeQuery>,
) -> ApiResult<web::Json<Vec<ServiceRequestView>>> {
    let actor = state.actor(&session).await?;
    let views = state
        .service_requests_query
        .list_unassigned(&actor, &query.relations())
        .await?;
    Ok(web::Json(views))
}

/// Requests assigned to the calling technician.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/my-requests",
    params(IncludeQuery),
    responses(
        (status = 200, description = "Assigned requests", body = [ServiceRequestView]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Technicians only", body = Error),
        (status = 404, description = "Caller has no technician profile", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "listMyServiceRequests"
)]
#[get("/service-requests/my-requests")]
pub async fn list_my_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<IncludeQuery>,
) -> ApiResult<web::Json<Vec<ServiceRequestView>>> {
    let actor = state.actor(&session).await?;
    let views = state
        .service_requests_query
        .list_mine(&actor, &query.relations())
        .await?;
    Ok(web::Json(views))
}

/// One request, visible to its owner, its technician and admins.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}",
    params(("id" = i64, Path, description = "Service request id"), IncludeQuery),
    responses(
        (status = 200, description = "The request", body = ServiceRequestView),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not visible to the caller", body = Error),
        (status = 404, description = "No such service request", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "getServiceRequest"
)]
#[get("/service-requests/{id}")]
pub async fn get_service_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<IncludeQuery>,
) -> ApiResult<web::Json<ServiceRequestView>> {
    let actor = state.actor(&session).await?;
    let view = state
        .service_requests_query
        .get(&actor, request_id(path), &query.relations())
        .await?;
    Ok(web::Json(view))
}

/// Claim a pending, unassigned request for the calling technician.
#[utoipa::path(
    patch,
    path = "/api/v1/service-requests/{id}/assign-to-myself",
    params(("id" = i64, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Assigned to the caller", body = ServiceRequest),
        (status = 400, description = "Request is not pending", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Technicians only", body = Error),
        (status = 404, description = "No such service request", body = Error),
        (status = 409, description = "Another technician got there first", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "assignServiceRequestToSelf"
)]
#[patch("/service-requests/{id}/assign-to-myself")]
pub async fn assign_to_myself(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ServiceRequest>> {
    let actor = state.actor(&session).await?;
    let request = state
        .service_requests
        .assign_to_self(&actor, request_id(path))
        .await?;
    Ok(web::Json(request))
}

/// Move a request along its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/v1/service-requests/{id}/status",
    params(("id" = i64, Path, description = "Service request id")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Status changed", body = ServiceRequest),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Caller may not move this request", body = Error),
        (status = 404, description = "No such service request", body = Error),
        (status = 422, description = "Not an edge of the lifecycle graph", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "updateServiceRequestStatus"
)]
#[patch("/service-requests/{id}/status")]
pub async fn update_request_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<ServiceRequest>> {
    let actor = state.actor(&session).await?;
    let field = FieldName::new("status");
    let status: ServiceRequestStatus = required(
        parse_optional(payload.status.as_deref(), field)?,
        field,
    )?;
    let request = state
        .service_requests
        .update_status(&actor, request_id(path), status)
        .await?;
    Ok(web::Json(request))
}

/// Admin full-field update.
#[utoipa::path(
    patch,
    path = "/api/v1/service-requests/{id}",
    params(("id" = i64, Path, description = "Service request id")),
    request_body = AdminUpdateBody,
    responses(
        (status = 200, description = "Updated request", body = ServiceRequest),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such service request", body = Error),
        (status = 409, description = "Request changed concurrently", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "updateServiceRequest"
)]
#[patch("/service-requests/{id}")]
pub async fn admin_update_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<AdminUpdateBody>,
) -> ApiResult<web::Json<ServiceRequest>> {
    let actor = state.actor(&session).await?;
    let patch = payload.into_inner().into_patch()?;
    let request = state
        .service_requests
        .admin_update(&actor, request_id(path), patch)
        .await?;
    Ok(web::Json(request))
}

/// Hard delete. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/service-requests/{id}",
    params(("id" = i64, Path, description = "Service request id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such service request", body = Error)
    ),
    tags = ["service-requests"],
    operation_id = "deleteServiceRequest"
)]
#[delete("/service-requests/{id}")]
pub async fn delete_service_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    state
        .service_requests
        .delete(&actor, request_id(path))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "service_requests_tests.rs"]
mod tests;
