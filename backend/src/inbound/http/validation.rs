//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, Role, SCORE_MAX, SCORE_MIN, Score, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, message: impl Into<String>) -> Error {
    ValidationError::new(field.as_str(), message).with_value(ErrorCode::InvalidValue, value)
}

/// Unwrap a body field that serde accepted as optional but the operation
/// requires.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse an optional enum token such as a `status` query parameter.
pub(crate) fn parse_optional<T>(raw: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|err| invalid_value_error(field, token, err.to_string()))
        })
        .transpose()
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse::<Role>()
        .map_err(|err| invalid_value_error(FieldName::new("role"), raw, err.to_string()))
}

pub(crate) fn parse_score(value: i64) -> Result<Score, Error> {
    Score::new(value).map_err(|_| {
        ValidationError::new(
            "score",
            format!("score must be between {SCORE_MIN} and {SCORE_MAX}"),
        )
        .with_value(ErrorCode::OutOfRange, value.to_string())
    })
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    Error::invalid_field(err.field(), err.to_string())
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::EmptyField)
}

/// Deserialise a field that distinguishes "absent" from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` so a missing
/// key yields `None` and `null` yields `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
