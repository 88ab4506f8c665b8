//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("nope"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::conflict("taken") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[rstest]
fn serialises_details_and_trace_id() {
    let error = Error::conflict("taken")
        .with_trace_id("abc")
        .with_details(json!({ "field": "phone" }));
    let value = serde_json::to_value(error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "taken",
            "traceId": "abc",
            "details": { "field": "phone" }
        })
    );
}
