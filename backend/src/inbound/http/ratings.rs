//! Rating overview.
//!
//! ```text
//! GET /api/v1/ratings
//! ```

use actix_web::{get, web};

use crate::domain::{Error, RatingSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// One summary per rated technician, ordered by technician id.
#[utoipa::path(
    get,
    path = "/api/v1/ratings",
    responses(
        (status = 200, description = "Rating summaries", body = [RatingSummary]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "listRatingSummaries",
    security([])
)]
#[get("/ratings")]
pub async fn list_rating_summaries(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RatingSummary>>> {
    Ok(web::Json(state.ratings_query.summaries().await?))
}
