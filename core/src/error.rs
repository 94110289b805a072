//! Error types for the Trello HTTP adapter.
//!
//! # Design
//! An HTTP status >= 400 is reported as `RequestFailed`, carrying the status,
//! the raw body, and the request that produced it. Failures of the fetch
//! primitive itself and malformed success bodies get their own variants so a
//! caller can tell "Trello said no" apart from "we never got an answer".

use thiserror::Error;

use crate::http::{HttpMethod, TransportError};

/// Result type alias for adapter operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `TrelloHttp`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Construction was attempted without an application key.
    #[error("Application API key is required")]
    MissingKey,

    /// A required environment variable was not set.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The API answered with status >= 400.
    #[error(transparent)]
    RequestFailed(#[from] RequestFailure),

    /// The transport could not complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success response body was not valid JSON for the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request parameters could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status code, if the API answered with a failure status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed(failure) => Some(failure.status_code),
            _ => None,
        }
    }

    pub fn as_request_failure(&self) -> Option<&RequestFailure> {
        match self {
            ApiError::RequestFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The request a failure originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub method: HttpMethod,
}

/// An HTTP response with status >= 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} {} returned {status_code}: {body}", .request.method, .request.url)]
pub struct RequestFailure {
    pub status_code: u16,
    pub body: String,
    pub request: RequestInfo,
}

impl RequestFailure {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}
