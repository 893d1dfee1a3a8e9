//! HTTP rendering of console errors.
//!
//! Every failure leaves the API as the same JSON envelope
//! (`{code, message, traceId?, details?}`) marked `Cache-Control: no-store`.
//! That includes bodies and query strings actix rejects before a handler
//! runs, so clients only ever parse one error shape.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
        ErrorCode::UpstreamUnavailable => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The body sent to the browser. Internal failures keep only their trace id.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

/// Server-side failures are logged; client mistakes are not.
fn log_failure(error: &Error) {
    match error.code() {
        ErrorCode::InternalError => {
            error!(message = %error.message(), trace_id = ?error.trace_id(), "internal error");
        }
        ErrorCode::UpstreamError | ErrorCode::UpstreamUnavailable => {
            warn!(
                code = ?error.code(),
                message = %error.message(),
                details = ?error.details(),
                trace_id = ?error.trace_id(),
                "SAT API call failed"
            );
        }
        ErrorCode::ServiceUnavailable => {
            warn!(message = %error.message(), trace_id = ?error.trace_id(), "store unavailable");
        }
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_failure(self);
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(CacheControl(vec![CacheDirective::NoStore]));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(public_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        if err.as_response_error().status_code().is_client_error() {
            return Error::invalid_request(err.to_string());
        }
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED)
    }
}

fn json_payload_error(err: &JsonPayloadError) -> Error {
    let (code, message) = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            ("too_large", "request body is too large".to_owned())
        }
        JsonPayloadError::ContentType => (
            "unsupported_content_type",
            "request body must be application/json".to_owned(),
        ),
        other => ("malformed_json", format!("malformed JSON body: {other}")),
    };
    Error::invalid_request(message).with_details(json!({ "code": code }))
}

fn query_payload_error(err: &QueryPayloadError) -> Error {
    Error::invalid_request(format!("malformed query string: {err}"))
        .with_details(json!({ "code": "malformed_query" }))
}

/// Register extractor configs that render rejected payloads as [`Error`].
pub fn payload_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req: &HttpRequest| json_payload_error(&err).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req: &HttpRequest| query_payload_error(&err).into()),
    );
}
