//! HTTP mapping for domain errors.
//!
//! The domain error stays transport agnostic; this module picks the status
//! code and writes the JSON body and `trace-id` header.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal errors keep only their trace id; message and details are logged.
fn redact_if_internal(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    error!(message = err.message(), trace_id = ?err.trace_id(), "internal error");
    let redacted = Error::internal(ErrorCode::InternalError.default_message());
    match err.trace_id() {
        Some(id) => redacted.with_trace_id(id),
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
            builder.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        builder.json(redact_if_internal(self))
    }
}
