//! HTTP adapter mapping for domain errors.
//!
//! The domain error stays HTTP-agnostic; this module picks status codes and
//! strips internal details before anything reaches a client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use planner::domain::Error;
/// use planner::inbound::http::ApiResult;
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("PlanId: 1 not found"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing copy of `error`.
///
/// Internal errors are logged in full and replaced with a generic message
/// that keeps only the trace identifier.
pub(crate) fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(
        message = error.message(),
        details = ?error.details(),
        trace_id = ?error.trace_id(),
        "internal error returned to client"
    );
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}
