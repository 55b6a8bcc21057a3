//! OpenAPI-only schema definitions.
//!
//! `pagination::Page` stays free of utoipa, so the paged claim listing gets a
//! concrete mirror here for documentation.

use utoipa::ToSchema;

use crate::domain::ClaimView;

/// One page of claims from `GET /api/v1/claims/admin/all`.
#[derive(ToSchema)]
#[schema(as = ClaimPage, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ClaimPageSchema {
    data: Vec<ClaimView>,
    /// Rows matching the filter across all pages.
    #[schema(example = 42)]
    total: u64,
    /// 1-based page number.
    #[schema(example = 1)]
    page: u64,
    #[schema(example = 15)]
    per_page: u64,
    #[schema(example = 3)]
    last_page: u64,
}
