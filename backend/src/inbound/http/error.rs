//! HTTP rendering of domain errors.
//!
//! Every failure leaves the server as the JSON [`Error`] envelope, including
//! payloads rejected by actix extractors before a handler runs. Responses
//! carry the request's `trace-id` header and are never cached. Clients only
//! see what [`public_body`] keeps: internal failures are reduced to a generic
//! message, and 401 bodies drop their details so that an unknown identifier
//! and a wrong password cannot be told apart.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError, web};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// `WWW-Authenticate` challenge attached to every 401 response.
pub const BEARER_CHALLENGE: &str = r#"Bearer realm="forum""#;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The part of `error` a client is allowed to see.
fn public_body(error: &Error) -> Error {
    let public = match error.code() {
        ErrorCode::InternalError => Error::internal(INTERNAL_MESSAGE),
        ErrorCode::Unauthorized => Error::unauthorized(error.message()),
        _ => return error.clone(),
    };
    match error.trace_id() {
        Some(id) => public.with_trace_id(id.to_owned()),
        None => public,
    }
}

fn log_failure(error: &Error, status: StatusCode) {
    if status.is_server_error() {
        error!(
            code = ?error.code(),
            message = error.message(),
            trace_id = error.trace_id(),
            "request failed"
        );
    } else {
        debug!(
            code = ?error.code(),
            %status,
            trace_id = error.trace_id(),
            "request rejected"
        );
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        log_failure(self, status);

        let mut builder = HttpResponse::build(status);
        builder.insert_header((header::CACHE_CONTROL, "no-store"));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, BEARER_CHALLENGE));
        }
        builder.json(public_body(self))
    }
}

/// Map a rejected JSON body onto the error envelope.
fn json_rejection(err: &JsonPayloadError) -> Error {
    let code = match err {
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "body_too_large"
        }
        _ => "malformed_body",
    };
    debug!(error = %err, code, "JSON payload rejected");
    Error::invalid_request("request body could not be read as JSON")
        .with_details(json!({ "code": code }))
}

fn query_rejection(err: &QueryPayloadError) -> Error {
    debug!(error = %err, "query string rejected");
    Error::invalid_request("query string could not be parsed")
        .with_details(json!({ "code": "malformed_query" }))
}

/// JSON extractor settings that answer bad payloads with the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| json_rejection(&err).into())
}

/// Query extractor settings that answer bad query strings with the error
/// envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| query_rejection(&err).into())
}
