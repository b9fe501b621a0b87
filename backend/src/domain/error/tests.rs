//! Tests for domain error construction, validation, and serialisation.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("Invalid PlanId")
}

#[rstest]
fn invalid_request_constructor_sets_code(base_error: Error) {
    assert_eq!(base_error.code(), ErrorCode::InvalidRequest);
    assert_eq!(base_error.message(), "Invalid PlanId");
}

#[rstest]
#[case(Error::not_found("UserId: 4 not found"), ErrorCode::NotFound)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
#[case(Error::service_unavailable("request cancelled"), ErrorCode::ServiceUnavailable)]
fn convenience_constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_to_camel_case_payload(expected_trace_id: String) {
    let error = Error::not_found("PlanId: 3 not found")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "planId": 3 }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "not_found",
            "message": "PlanId: 3 not found",
            "traceId": expected_trace_id,
            "details": { "planId": 3 },
        })
    );
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let payload = json!({ "code": "internal_error", "message": "  " });
    let result: Result<Error, _> = serde_json::from_value(payload);
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn deserialisation_ignores_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let payload = json!({ "code": "invalid_request", "message": "bad" });

    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(payload).expect("valid payload")
    })
    .await;

    assert!(error.trace_id().is_none());
}
