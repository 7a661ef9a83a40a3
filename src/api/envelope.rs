//! JSON bodies for the archive endpoints.
//!
//! Listing and detail lookups answer `{ "data": ..., "served_at": ... }`.
//! Failed lookups answer `{ "error": { "code", "message" }, "served_at": ... }`
//! with the status picked from the [`RetrievalError`] variant. The generate
//! endpoint does not go through here; it answers with the flat `RunResult`.

use crate::pipeline::RetrievalError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

fn served_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Successful archive lookup.
#[derive(Debug, Serialize)]
pub struct ArchiveBody<T: Serialize> {
    pub data: T,
    pub served_at: String,
}

impl<T: Serialize> ArchiveBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            served_at: served_at(),
        }
    }
}

impl<T: Serialize> IntoResponse for ArchiveBody<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct LookupFailure {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct LookupFailureBody {
    error: LookupFailure,
    served_at: String,
}

impl RetrievalError {
    pub const fn status(&self) -> StatusCode {
        match self {
            RetrievalError::InvalidName(_) => StatusCode::BAD_REQUEST,
            RetrievalError::NotFound(_) => StatusCode::NOT_FOUND,
            RetrievalError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            RetrievalError::InvalidName(_) => "INVALID_ARCHIVE_NAME",
            RetrievalError::NotFound(_) => "NOT_FOUND",
            RetrievalError::Io(_) => "ARCHIVE_IO_ERROR",
        }
    }
}

impl IntoResponse for RetrievalError {
    fn into_response(self) -> Response {
        if let RetrievalError::Io(_) = &self {
            tracing::error!(error = %self, "Archive retrieval failed");
        }
        let body = LookupFailureBody {
            error: LookupFailure {
                code: self.code(),
                message: self.to_string(),
            },
            served_at: served_at(),
        };
        (self.status(), Json(body)).into_response()
    }
}
