//! Service categories referenced by requests and claims.

use serde::Serialize;
use utoipa::ToSchema;

use super::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(value_type = i64)]
    pub id: CategoryId,
    pub name: String,
}
