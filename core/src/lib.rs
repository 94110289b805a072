//! Blocking Trello REST API adapter.
//!
//! # Overview
//! `TrelloHttp` injects the application key and user token into every
//! request, lays parameters out per method (query string for GET/DELETE,
//! JSON body for POST/PUT), hands the request to a `Transport`, and turns
//! the answer into a `Result`.
//!
//! # Design
//! - The fetch primitive is injected. `UreqTransport` (feature `ureq`) is the
//!   network implementation; any `Fn(&HttpRequest) -> Result<HttpResponse, _>`
//!   works too.
//! - Statuses >= 400 become `ApiError::RequestFailed`, carrying the status,
//!   raw body, and originating request.
//! - No retries, pagination, caching or rate limiting: one call, one fetch.

pub mod client;
pub mod credentials;
pub mod error;
pub mod http;
pub mod params;

pub use client::{TrelloHttp, TRELLO_ORIGIN};
pub use credentials::Credentials;
pub use error::{ApiError, ApiResult, RequestFailure, RequestInfo};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use params::{ParamValue, Params};
