//! Claim handlers.
//!
//! ```text
//! POST   /api/v1/claims {"categoryId":1,"subject":"...","description":"..."}
//! GET    /api/v1/claims/user-claims
//! GET    /api/v1/claims/admin/all?status=pending&page=2&perPage=20
//! GET    /api/v1/claims/admin/stats
//! PATCH  /api/v1/claims/{id}/answer {"answer":"We are on it"}
//! PATCH  /api/v1/claims/{id}/status {"status":"completed"}
//! PATCH  /api/v1/claims/{id}
//! DELETE /api/v1/claims/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CategoryId, Claim, ClaimFilter, ClaimId, ClaimPatch, ClaimRelation, ClaimStats, ClaimStatus,
    ClaimView, Error, IncludeSet,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ClaimPageSchema;
use crate::inbound::http::service_requests::StatusBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, nullable, parse_optional, required};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClaimIncludeQuery {
    /// Comma-separated relations: requester, category.
    pub include: Option<String>,
}

/// Filters and paging for the admin listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ClaimListQuery {
    /// pending, answered, completed or cancelled.
    pub status: Option<String>,
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub per_page: Option<i64>,
    pub include: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimBody {
    #[schema(value_type = i64)]
    pub category_id: Option<CategoryId>,
    pub subject: Option<String>,
    pub description: Option<String>,
}

/// Body for `PATCH /claims/{id}/answer`. A missing, blank or `null` answer
/// still marks the claim answered.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerBody {
    pub answer: Option<String>,
}

/// Admin field update. An explicit `null` answer clears the text.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaimBody {
    #[schema(value_type = Option<i64>)]
    pub category_id: Option<CategoryId>,
    pub status: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub answer: Option<Option<String>>,
}

impl UpdateClaimBody {
    fn into_patch(self) -> Result<ClaimPatch, Error> {
        Ok(ClaimPatch {
            category_id: self.category_id,
            status: parse_optional(self.status.as_deref(), FieldName::new("status"))?,
            subject: self.subject,
            description: self.description,
            answer: self.answer,
        })
    }
}

fn claim_id(path: web::Path<i64>) -> ClaimId {
    ClaimId::new(path.into_inner())
}

/// File a claim owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/claims",
    request_body = CreateClaimBody,
    responses(
        (status = 201, description = "Claim filed", body = Claim),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["claims"],
    operation_id = "createClaim"
)]
#[post("/claims")]
pub async fn create_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateClaimBody>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    let CreateClaimBody {
        category_id,
        subject,
        description,
    } = payload.into_inner();
    let category_id = required(category_id, FieldName::new("categoryId"))?;
    let subject = required(subject, FieldName::new("subject"))?;
    let description = required(description, FieldName::new("description"))?;
    let claim = state
        .claims
        .create(&actor, category_id, &subject, &description)
        .await?;
    Ok(HttpResponse::Created().json(claim))
}

/// Claims filed by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/claims/user-claims",
    params(ClaimIncludeQuery),
    responses(
        (status = 200, description = "Own claims", body = [ClaimView]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["claims"],
    operation_id = "listOwnClaims"
)]
#[get("/claims/user-claims")]
pub async fn list_own_claims(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClaimIncludeQuery>,
) -> ApiResult<web::Json<Vec<ClaimView>>> {
    let actor = state.actor(&session).await?;
    let include: IncludeSet<ClaimRelation> = IncludeSet::parse(query.include.as_deref());
    let claims = state.claims_query.list_own(&actor, &include).await?;
    Ok(web::Json(claims))
}

/// Paged listing across every owner. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/claims/admin/all",
    params(ClaimListQuery),
    responses(
        (status = 200, description = "One page of claims", body = ClaimPageSchema),
        (status = 400, description = "Unknown status filter", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["claims"],
    operation_id = "listAllClaims"
)]
#[get("/claims/admin/all")]
pub async fn list_all_claims(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClaimListQuery>,
) -> ApiResult<web::Json<Page<ClaimView>>> {
    let actor = state.actor(&session).await?;
    let filter = ClaimFilter {
        status: parse_optional(query.status.as_deref(), FieldName::new("status"))?,
        search: query.search.clone(),
    };
    let page = PageRequest::from_query(query.page, query.per_page);
    let include = IncludeSet::parse(query.include.as_deref());
    let claims = state
        .claims_query
        .list_all(&actor, &filter, page, &include)
        .await?;
    Ok(web::Json(claims))
}

/// Claim counters. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/claims/admin/stats",
    responses(
        (status = 200, description = "Counters by status", body = ClaimStats),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["claims"],
    operation_id = "claimStats"
)]
#[get("/claims/admin/stats")]
pub async fn claim_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClaimStats>> {
    let actor = state.actor(&session).await?;
    let stats = state.claims_query.stats(&actor).await?;
    Ok(web::Json(stats))
}

/// Answer a claim. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/claims/{id}/answer",
    params(("id" = i64, Path, description = "Claim id")),
    request_body = AnswerBody,
    responses(
        (status = 200, description = "Claim answered", body = Claim),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such claim", body = Error),
        (status = 422, description = "Claim is closed", body = Error)
    ),
    tags = ["claims"],
    operation_id = "answerClaim"
)]
#[patch("/claims/{id}/answer")]
pub async fn answer_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: Option<web::Json<AnswerBody>>,
) -> ApiResult<web::Json<Claim>> {
    let actor = state.actor(&session).await?;
    let answer = payload.and_then(|body| body.into_inner().answer);
    let claim = state.claims.answer(&actor, claim_id(path), answer).await?;
    Ok(web::Json(claim))
}

/// Set a claim's status. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/claims/{id}/status",
    params(("id" = i64, Path, description = "Claim id")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Status changed", body = Claim),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such claim", body = Error),
        (status = 422, description = "Not an edge of the lifecycle graph", body = Error)
    ),
    tags = ["claims"],
    operation_id = "updateClaimStatus"
)]
#[patch("/claims/{id}/status")]
pub async fn update_claim_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<Claim>> {
    let actor = state.actor(&session).await?;
    let field = FieldName::new("status");
    let status: ClaimStatus = required(parse_optional(payload.status.as_deref(), field)?, field)?;
    let claim = state
        .claims
        .update_status(&actor, claim_id(path), status)
        .await?;
    Ok(web::Json(claim))
}

/// Admin field update.
#[utoipa::path(
    patch,
    path = "/api/v1/claims/{id}",
    params(("id" = i64, Path, description = "Claim id")),
    request_body = UpdateClaimBody,
    responses(
        (status = 200, description = "Updated claim", body = Claim),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such claim", body = Error),
        (status = 422, description = "Not an edge of the lifecycle graph", body = Error)
    ),
    tags = ["claims"],
    operation_id = "updateClaim"
)]
#[patch("/claims/{id}")]
pub async fn update_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateClaimBody>,
) -> ApiResult<web::Json<Claim>> {
    let actor = state.actor(&session).await?;
    let patch = payload.into_inner().into_patch()?;
    let claim = state.claims.update(&actor, claim_id(path), patch).await?;
    Ok(web::Json(claim))
}

/// Hard delete. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/claims/{id}",
    params(("id" = i64, Path, description = "Claim id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such claim", body = Error)
    ),
    tags = ["claims"],
    operation_id = "deleteClaim"
)]
#[delete("/claims/{id}")]
pub async fn delete_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    state.claims.delete(&actor, claim_id(path)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;
