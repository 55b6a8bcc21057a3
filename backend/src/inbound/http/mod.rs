//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod categories;
pub mod claims;
pub mod error;
pub mod health;
pub mod ratings;
pub mod schemas;
pub mod service_requests;
pub mod session;
pub mod session_config;
pub mod state;
pub mod technicians;
#[cfg(test)]
pub mod test_utils;
pub mod time_shifts;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Fixed paths such as `/service-requests/user-requests` are registered
/// before their `/{id}` siblings so they are never captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::login_with_role)
        .service(accounts::logout)
        .service(accounts::current_user)
        .service(accounts::create_admin)
        .service(service_requests::create_service_request)
        .service(service_requests::list_own_requests)
        .service(service_requests::list_all_requests)
        .service(service_requests::request_stats)
        .service(service_requests::list_unassigned_requests)
        .service(service_requests::list_my_requests)
        .service(service_requests::get_service_request)
        .service(service_requests::assign_to_myself)
        .service(service_requests::update_request_status)
        .service(service_requests::admin_update_request)
        .service(service_requests::delete_service_request)
        .service(claims::create_claim)
        .service(claims::list_own_claims)
        .service(claims::list_all_claims)
        .service(claims::claim_stats)
        .service(claims::answer_claim)
        .service(claims::update_claim_status)
        .service(claims::update_claim)
        .service(claims::delete_claim)
        .service(technicians::list_technicians)
        .service(technicians::create_technician)
        .service(technicians::show_technician)
        .service(technicians::update_technician)
        .service(technicians::delete_technician)
        .service(technicians::create_review)
        .service(ratings::list_rating_summaries)
        .service(time_shifts::list_time_shifts)
        .service(categories::list_categories);
}
