//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{Error, ErrorEntry};
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("pq: relation \"feedback\" does not exist").with_trace_id(expected_trace_id)
}

#[fixture]
fn not_found_case(expected_trace_id: String) -> Error {
    Error::not_found("Feedback not found", "Check the ID and try again.")
        .with_entry_debug("feedback 7 not found")
        .with_trace_id(expected_trace_id)
}

#[rstest]
#[case(Error::invalid_request("bad", "fix it"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing", "look again"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("stuck", "refresh"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("busy", "wait"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Value {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error_case: Error, expected_trace_id: String) {
    let body = assert_error_response(
        internal_error_case,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["traceId"], expected_trace_id.as_str());
    assert_eq!(body["errors"][0]["summary"], "An internal error occurred");
    assert!(body["errors"][0].get("debug").is_none());
    assert!(!body.to_string().contains("relation"));
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_entries_but_drop_debug(not_found_case: Error, expected_trace_id: String) {
    let body = assert_error_response(
        not_found_case,
        StatusCode::NOT_FOUND,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body["code"], "not_found");
    assert_eq!(body["errors"][0]["summary"], "Feedback not found");
    assert_eq!(body["errors"][0]["detail"], "Check the ID and try again.");
    assert!(body["errors"][0].get("debug").is_none());
}

#[rstest]
#[actix_web::test]
async fn every_entry_reaches_the_client() {
    let error = Error::from_entries(
        ErrorCode::InvalidRequest,
        [
            ErrorEntry::new("The Course field is missing", "Add it."),
            ErrorEntry::new("The Feedback field is missing", "Add it too."),
        ],
    )
    .expect("two entries");

    let body = assert_error_response(error, StatusCode::BAD_REQUEST, None).await;
    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[1]["summary"], "The Feedback field is missing");
    assert!(body.get("traceId").is_none());
}

#[rstest]
fn redaction_keeps_the_trace_id() {
    let error = Error::internal("boom").with_trace_id(TRACE_ID);

    let redacted = redact_if_internal(&error);

    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
    assert!(redacted.entries().iter().all(|entry| entry.debug.is_none()));
}

#[rstest]
fn from_actix_error_is_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.trace_id(), None);
    assert_eq!(err.entries()[0].debug.as_deref(), Some("boom"));
}
