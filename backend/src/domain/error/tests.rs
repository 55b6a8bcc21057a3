//! Regression coverage for domain error construction and serialisation.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> TraceId {
    TRACE_ID.parse().expect("fixture is a valid UUID")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::invalid_state("not pending"), ErrorCode::InvalidState)]
#[case(Error::unauthorized("login required"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::invalid_transition("pending -> completed"), ErrorCode::InvalidTransition)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::Conflict, "  \t ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_generic_message_for_blank_input() {
    let error = Error::forbidden("   ");
    assert_eq!(error.message(), "forbidden");
}

#[rstest]
fn blank_trace_id_is_rejected_and_ignored() {
    let error = Error::internal("boom");
    assert_eq!(
        error.clone().try_with_trace_id(" "),
        Err(ErrorValidationError::EmptyTraceId)
    );
    assert!(error.with_trace_id("").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn captures_trace_id_in_scope(trace_id: TraceId) {
    let error = TraceId::scope(trace_id, async { Error::not_found("gone") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn no_trace_id_out_of_scope() {
    assert!(Error::conflict("taken").trace_id().is_none());
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let error =
        Error::conflict("already assigned").with_details(json!({ "code": "already_assigned" }));
    let value = serde_json::to_value(&error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "already assigned",
            "details": { "code": "already_assigned" }
        })
    );
}

#[rstest]
#[tokio::test]
async fn deserialising_ignores_ambient_trace(trace_id: TraceId) {
    let payload = json!({ "code": "invalid_transition", "message": "nope" });
    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(payload).expect("valid payload")
    })
    .await;
    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    assert!(error.trace_id().is_none());
}

#[rstest]
fn deserialising_blank_message_fails() {
    let payload = json!({ "code": "not_found", "message": "" });
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
