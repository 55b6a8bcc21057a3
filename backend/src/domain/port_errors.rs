//! Conversions from driven-port errors into domain errors.
//!
//! Connection failures surface as `service_unavailable`, query failures as
//! `internal_error`. Port-specific variants map to the client-facing code
//! that describes them.

use serde_json::json;

use super::Error;
use super::ports::{
    CategoryRepositoryError, ClaimRepositoryError, PasswordHashError, RatingRepositoryError,
    ServiceRequestRepositoryError, TechnicianRepositoryError, UserRepositoryError,
};

fn email_taken(email: &str) -> Error {
    Error::conflict(format!("email {email} is already registered"))
        .with_details(json!({ "field": "email", "code": "email_taken" }))
}

impl From<ServiceRequestRepositoryError> for Error {
    fn from(error: ServiceRequestRepositoryError) -> Self {
        match error {
            ServiceRequestRepositoryError::Connection { message } => Self::service_unavailable(
                format!("service request repository unavailable: {message}"),
            ),
            ServiceRequestRepositoryError::Query { message } => {
                Self::internal(format!("service request repository error: {message}"))
            }
            ServiceRequestRepositoryError::MissingReference { message } => {
                Self::invalid_request(format!("referenced record does not exist: {message}"))
            }
        }
    }
}

impl From<ClaimRepositoryError> for Error {
    fn from(error: ClaimRepositoryError) -> Self {
        match error {
            ClaimRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("claim repository unavailable: {message}"))
            }
            ClaimRepositoryError::Query { message } => {
                Self::internal(format!("claim repository error: {message}"))
            }
            ClaimRepositoryError::MissingReference { message } => {
                Self::invalid_request(format!("referenced record does not exist: {message}"))
            }
        }
    }
}

impl From<RatingRepositoryError> for Error {
    fn from(error: RatingRepositoryError) -> Self {
        match error {
            RatingRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("rating repository unavailable: {message}"))
            }
            RatingRepositoryError::Query { message } => {
                Self::internal(format!("rating repository error: {message}"))
            }
            RatingRepositoryError::Duplicate { request_id } => {
                Self::conflict(format!("service request {request_id} has already been rated"))
                    .with_details(json!({ "code": "duplicate_rating" }))
            }
        }
    }
}

impl From<TechnicianRepositoryError> for Error {
    fn from(error: TechnicianRepositoryError) -> Self {
        match error {
            TechnicianRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("technician repository unavailable: {message}"))
            }
            TechnicianRepositoryError::Query { message } => {
                Self::internal(format!("technician repository error: {message}"))
            }
            TechnicianRepositoryError::DuplicateEmail { email } => email_taken(&email),
            TechnicianRepositoryError::InUse { technician_id } => Self::conflict(format!(
                "technician {technician_id} still has service requests"
            ))
            .with_details(json!({ "code": "technician_in_use" })),
        }
    }
}

impl From<UserRepositoryError> for Error {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserRepositoryError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserRepositoryError::DuplicateEmail { email } => email_taken(&email),
        }
    }
}

impl From<CategoryRepositoryError> for Error {
    fn from(error: CategoryRepositoryError) -> Self {
        match error {
            CategoryRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("category repository unavailable: {message}"))
            }
            CategoryRepositoryError::Query { message } => {
                Self::internal(format!("category repository error: {message}"))
            }
        }
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Self {
        Self::internal(format!("credential check failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(ServiceRequestRepositoryError::connection("refused").into(), ErrorCode::ServiceUnavailable)]
    #[case(ServiceRequestRepositoryError::query("syntax").into(), ErrorCode::InternalError)]
    #[case(
        ServiceRequestRepositoryError::missing_reference("category 9").into(),
        ErrorCode::InvalidRequest
    )]
    #[case(RatingRepositoryError::duplicate(4_i64).into(), ErrorCode::Conflict)]
    #[case(UserRepositoryError::duplicate_email("a@b.c").into(), ErrorCode::Conflict)]
    #[case(TechnicianRepositoryError::in_use(2_i64).into(), ErrorCode::Conflict)]
    #[case(ClaimRepositoryError::connection("down").into(), ErrorCode::ServiceUnavailable)]
    fn port_errors_map_to_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn duplicate_email_carries_detail_code() {
        let error = Error::from(UserRepositoryError::duplicate_email("a@b.c"));
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("email_taken"))
        );
    }
}
