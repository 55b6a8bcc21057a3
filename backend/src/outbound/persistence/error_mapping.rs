//! Shared classification of pool and Diesel failures.
//!
//! Each repository maps a [`DbFailure`] onto its own port error so callers
//! see `Connection` for infrastructure trouble, `Query` for everything
//! unexpected and port-specific variants for constraint violations.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowDecodeError;
use super::pool::PoolError;

/// Database failure reduced to what repositories need to distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    Connection(String),
    UniqueViolation { constraint: Option<String> },
    ForeignKeyViolation { constraint: Option<String> },
    Query(String),
}

impl DbFailure {
    pub fn message(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::UniqueViolation { constraint } => {
                format!("unique violation on {}", constraint.as_deref().unwrap_or("unknown"))
            }
            Self::ForeignKeyViolation { constraint } => format!(
                "foreign key violation on {}",
                constraint.as_deref().unwrap_or("unknown")
            ),
        }
    }

    /// Whether the violated constraint name contains `needle`.
    pub fn constraint_contains(&self, needle: &str) -> bool {
        match self {
            Self::UniqueViolation { constraint } | Self::ForeignKeyViolation { constraint } => {
                constraint.as_deref().is_some_and(|name| name.contains(needle))
            }
            Self::Connection(_) | Self::Query(_) => false,
        }
    }
}

impl From<PoolError> for DbFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for DbFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

impl From<RowDecodeError> for DbFailure {
    fn from(error: RowDecodeError) -> Self {
        Self::Query(error.to_string())
    }
}

/// Escape `%`, `_` and `\` so a search needle matches literally in `ILIKE`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
