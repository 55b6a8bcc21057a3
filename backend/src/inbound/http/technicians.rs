//! Technician directory and review handlers.
//!
//! ```text
//! GET    /api/v1/technicians
//! POST   /api/v1/technicians {"name":"Tom","email":"tom@example.com","password":"..."}
//! GET    /api/v1/technicians/{id}
//! PATCH  /api/v1/technicians/{id} {"availabilityDate":"2026-03-01"}
//! DELETE /api/v1/technicians/{id}
//! POST   /api/v1/technicians/{id}/reviews {"technicianRequestId":7,"score":5}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Error, NewTechnician, Rating, ServiceRequestId, Technician, TechnicianId, TechnicianPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::AccountRequest;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, nullable, parse_score, required};

/// Account plus profile fields for a new technician.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTechnicianBody {
    #[serde(flatten)]
    pub account: AccountRequest,
    pub availability_date: Option<NaiveDate>,
}

/// Profile update. An explicit `null` availability date clears it.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTechnicianBody {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub availability_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    /// The service request being rated.
    #[schema(value_type = i64)]
    pub technician_request_id: Option<ServiceRequestId>,
    /// Whole number from 1 to 5.
    pub score: Option<i64>,
    pub description: Option<String>,
}

fn technician_id(path: web::Path<i64>) -> TechnicianId {
    TechnicianId::new(path.into_inner())
}

/// Every technician with their rating figures.
#[utoipa::path(
    get,
    path = "/api/v1/technicians",
    responses(
        (status = 200, description = "Technicians", body = [Technician]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "listTechnicians",
    security([])
)]
#[get("/technicians")]
pub async fn list_technicians(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Technician>>> {
    Ok(web::Json(state.technicians.list().await?))
}

/// Create a technician account and profile. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/technicians",
    request_body = CreateTechnicianBody,
    responses(
        (status = 201, description = "Technician created", body = Technician),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "createTechnician"
)]
#[post("/technicians")]
pub async fn create_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTechnicianBody>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    let CreateTechnicianBody {
        account,
        availability_date,
    } = payload.into_inner();
    let technician = NewTechnician {
        account: account.into_account()?,
        availability_date,
    };
    let created = state.technicians.create(&actor, technician).await?;
    Ok(HttpResponse::Created().json(created))
}

/// One technician.
#[utoipa::path(
    get,
    path = "/api/v1/technicians/{id}",
    params(("id" = i64, Path, description = "Technician id")),
    responses(
        (status = 200, description = "Technician", body = Technician),
        (status = 404, description = "No such technician", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "showTechnician",
    security([])
)]
#[get("/technicians/{id}")]
pub async fn show_technician(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Technician>> {
    Ok(web::Json(state.technicians.show(technician_id(path)).await?))
}

/// Change a technician's name or availability. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/technicians/{id}",
    params(("id" = i64, Path, description = "Technician id")),
    request_body = UpdateTechnicianBody,
    responses(
        (status = 200, description = "Updated technician", body = Technician),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such technician", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "updateTechnician"
)]
#[patch("/technicians/{id}")]
pub async fn update_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UpdateTechnicianBody>,
) -> ApiResult<web::Json<Technician>> {
    let actor = state.actor(&session).await?;
    let UpdateTechnicianBody {
        name,
        availability_date,
    } = payload.into_inner();
    let patch = TechnicianPatch {
        name,
        availability_date,
    };
    let technician = state
        .technicians
        .update(&actor, technician_id(path), patch)
        .await?;
    Ok(web::Json(technician))
}

/// Remove a technician and their account. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/technicians/{id}",
    params(("id" = i64, Path, description = "Technician id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "No such technician", body = Error),
        (status = 409, description = "Technician still referenced by requests", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "deleteTechnician"
)]
#[delete("/technicians/{id}")]
pub async fn delete_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    state.technicians.delete(&actor, technician_id(path)).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Rate the technician who handled one of the caller's requests.
#[utoipa::path(
    post,
    path = "/api/v1/technicians/{id}/reviews",
    params(("id" = i64, Path, description = "Technician id")),
    request_body = ReviewBody,
    responses(
        (status = 201, description = "Rating stored", body = Rating),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Caller did not open the request", body = Error),
        (status = 404, description = "No such service request", body = Error),
        (status = 409, description = "Technician mismatch or request already rated", body = Error)
    ),
    tags = ["technicians"],
    operation_id = "createReview"
)]
#[post("/technicians/{id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let ReviewBody {
        technician_request_id,
        score,
        description,
    } = payload.into_inner();
    let request_id = required(technician_request_id, FieldName::new("technicianRequestId"))?;
    let score = parse_score(required(score, FieldName::new("score"))?)?;
    let rating = state
        .ratings
        .create_rating(user_id, technician_id(path), request_id, score, description)
        .await?;
    Ok(HttpResponse::Created().json(rating))
}

#[cfg(test)]
#[path = "technicians_tests.rs"]
mod tests;
