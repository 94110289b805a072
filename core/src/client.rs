//! Request shaping and response classification for the Trello REST API.
//!
//! # Design
//! `TrelloHttp` owns the credential pair and a `Transport`. A call is split
//! into `build_request`, which merges parameters and lays them out for the
//! method, and `parse_response`, which turns the transport's answer into a
//! `Result`. `request` runs both around exactly one `Transport::fetch`. The
//! two halves are public so a host that does its own I/O can drive them
//! directly.
//!
//! Parameters are overlaid in a fixed order, each layer winning over the
//! previous one: stored credentials, caller params, then any query string
//! embedded in the pathname.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::{ApiError, ApiResult, RequestFailure, RequestInfo};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::params::Params;

/// Origin every pathname is resolved against.
pub const TRELLO_ORIGIN: &str = "https://api.trello.com";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Blocking Trello API client over an injected transport.
#[derive(Debug, Clone)]
pub struct TrelloHttp<T> {
    credentials: Credentials,
    transport: T,
}

impl<T: Transport> TrelloHttp<T> {
    /// Fails with `ApiError::MissingKey` if `key` is empty.
    pub fn new(key: impl Into<String>, token: Option<String>, transport: T) -> ApiResult<Self> {
        let credentials = Credentials::new(key, token)?;
        Ok(Self::with_credentials(credentials, transport))
    }

    pub fn with_credentials(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn origin(&self) -> &'static str {
        TRELLO_ORIGIN
    }

    pub fn get(&self, pathname: &str) -> ApiResult<Value> {
        self.request(HttpMethod::Get, pathname, &Params::new())
    }

    pub fn get_with(&self, pathname: &str, params: &Params) -> ApiResult<Value> {
        self.request(HttpMethod::Get, pathname, params)
    }

    pub fn post(&self, pathname: &str) -> ApiResult<Value> {
        self.request(HttpMethod::Post, pathname, &Params::new())
    }

    pub fn post_with(&self, pathname: &str, params: &Params) -> ApiResult<Value> {
        self.request(HttpMethod::Post, pathname, params)
    }

    pub fn put(&self, pathname: &str) -> ApiResult<Value> {
        self.request(HttpMethod::Put, pathname, &Params::new())
    }

    pub fn put_with(&self, pathname: &str, params: &Params) -> ApiResult<Value> {
        self.request(HttpMethod::Put, pathname, params)
    }

    pub fn delete(&self, pathname: &str) -> ApiResult<Value> {
        self.request(HttpMethod::Delete, pathname, &Params::new())
    }

    pub fn delete_with(&self, pathname: &str, params: &Params) -> ApiResult<Value> {
        self.request(HttpMethod::Delete, pathname, params)
    }

    /// Issue one request and return the parsed JSON body.
    pub fn request(&self, method: HttpMethod, pathname: &str, params: &Params) -> ApiResult<Value> {
        self.request_as(method, pathname, params)
    }

    /// Issue one request and deserialize the success body into `D`.
    pub fn request_as<D: DeserializeOwned>(
        &self,
        method: HttpMethod,
        pathname: &str,
        params: &Params,
    ) -> ApiResult<D> {
        let (path, request) = self.shape_request(method, pathname, params)?;
        debug!(%method, path, "issuing trello request");
        let response = self.transport.fetch(&request)?;
        self.parse_response_as(&request, response)
    }

    /// Merge parameters and lay them out for `method`.
    ///
    /// GET and DELETE put everything in the query string and send no body.
    /// POST and PUT send everything as a JSON object and leave the URL bare.
    pub fn build_request(
        &self,
        method: HttpMethod,
        pathname: &str,
        params: &Params,
    ) -> ApiResult<HttpRequest> {
        self.shape_request(method, pathname, params)
            .map(|(_, request)| request)
    }

    /// Like `build_request`, also returning the pathname without its query.
    fn shape_request<'a>(
        &self,
        method: HttpMethod,
        pathname: &'a str,
        params: &Params,
    ) -> ApiResult<(&'a str, HttpRequest)> {
        let (path, merged) = self.merge_params(pathname, params);
        let mut url = format!("{TRELLO_ORIGIN}{path}");

        let body = if method.has_body() {
            Some(serde_json::to_string(&merged).map_err(ApiError::Serialization)?)
        } else {
            url.push('?');
            url.push_str(&merged.to_query());
            None
        };

        let request = HttpRequest {
            method,
            url,
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            mute_http_exceptions: true,
            body,
        };
        Ok((path, request))
    }

    /// Classify a response to `request`: status >= 400 is a failure, anything
    /// else is parsed as JSON.
    pub fn parse_response(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> ApiResult<Value> {
        self.parse_response_as(request, response)
    }

    pub fn parse_response_as<D: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> ApiResult<D> {
        check_status(request, response.status, &response.body)?;
        debug!(status = response.status, "trello request succeeded");
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    /// Overlay credentials, caller params and the pathname's own query
    /// string, in that order. Returns the pathname without its query.
    ///
    /// Only the segment between the first and second `?` is read as the
    /// query; anything after a second `?` is dropped.
    fn merge_params<'a>(&self, pathname: &'a str, params: &Params) -> (&'a str, Params) {
        let mut merged = self.credentials.to_params();
        merged.extend(params);

        let mut parts = pathname.split('?');
        let path = parts.next().unwrap_or(pathname);
        if let Some(search) = parts.next() {
            merged.extend(&Params::from_query(search));
        }
        (path, merged)
    }
}

fn check_status(request: &HttpRequest, status: u16, body: &str) -> Result<(), RequestFailure> {
    if status < 400 {
        return Ok(());
    }
    warn!(
        method = %request.method,
        status,
        "trello request failed"
    );
    Err(RequestFailure {
        status_code: status,
        body: body.to_string(),
        request: RequestInfo {
            url: request.url.clone(),
            method: request.method,
        },
    })
}
