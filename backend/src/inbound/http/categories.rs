//! Category catalog.
//!
//! ```text
//! GET /api/v1/categories
//! ```

use actix_web::{get, web};

use crate::domain::{Category, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Categories a service request or claim may be filed under, ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Known categories", body = [Category]),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["reference"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Category>>> {
    Ok(web::Json(state.categories.list().await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    use crate::inbound::http::test_utils::{memory_state, send, test_app};
    use crate::outbound::memory::SEED_CATEGORIES;

    #[actix_web::test]
    async fn lists_seeded_categories_without_a_session() {
        let (store, state) = memory_state();
        let ids = store.category_ids().await;
        let app = actix_test::init_service(test_app(state)).await;

        let (status, body) =
            send(&app, actix_test::TestRequest::get().uri("/api/v1/categories"), None).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), SEED_CATEGORIES.len());
        for ((row, id), name) in rows.iter().zip(&ids).zip(SEED_CATEGORIES) {
            assert_eq!(row["id"], id.get());
            assert_eq!(row["name"], name);
        }
    }
}
