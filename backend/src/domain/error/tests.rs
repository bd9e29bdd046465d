//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
fn invalid_request_constructor_sets_code(base_error: Error) {
    assert_eq!(base_error.code(), ErrorCode::InvalidRequest);
    assert_eq!(base_error.message(), "bad");
}

#[rstest]
#[case("")]
#[case("   ")]
fn try_new_rejects_empty_messages(#[case] message: &str) {
    let result = Error::try_new(ErrorCode::NotFound, message);
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn trace_id_is_none_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_message_under_error_key() {
    let value = serde_json::to_value(Error::not_found("Not found")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "error": "Not found" }));
}

#[rstest]
fn serialises_trace_id_in_camel_case(base_error: Error) {
    let value = serde_json::to_value(base_error.with_trace_id(TRACE_ID)).expect("serialise");
    assert_eq!(value.get("traceId").and_then(Value::as_str), Some(TRACE_ID));
}
