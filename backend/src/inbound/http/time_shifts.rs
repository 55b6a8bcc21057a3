//! Time-shift reference data.

use actix_web::{get, web};

use crate::domain::TimeShift;

/// Every working-day window a request may ask for.
#[utoipa::path(
    get,
    path = "/api/v1/time-shifts",
    responses((status = 200, description = "Known time shifts", body = [TimeShift])),
    tags = ["reference"],
    operation_id = "listTimeShifts",
    security([])
)]
#[get("/time-shifts")]
pub async fn list_time_shifts() -> web::Json<Vec<&'static TimeShift>> {
    web::Json(TimeShift::all())
}
