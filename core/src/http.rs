//! HTTP transport types and the fetch seam.
//!
//! # Design
//! Requests and responses are plain data. `TrelloHttp` builds an
//! `HttpRequest`, hands it to whatever `Transport` it was constructed with,
//! and classifies the returned `HttpResponse`. The transport only moves bytes:
//! it must hand back 4xx/5xx responses as data (when the request asks for
//! `mute_http_exceptions`) so that status classification happens in one place.
//!
//! Any closure with the right signature is a `Transport`, which is how the
//! unit tests script responses. `UreqTransport` is the blocking network
//! implementation behind the default `ureq` feature.

use std::fmt;

use thiserror::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Uppercase wire name, as it appears in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry their parameters in the query string; POST and
    /// PUT carry them in a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `TrelloHttp::build_request`. `url` is absolute and already
/// carries the query string for GET/DELETE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// When set, the transport must return HTTP error statuses as ordinary
    /// responses instead of failing.
    pub mute_http_exceptions: bool,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The fetch primitive itself failed: DNS, connect, TLS, a broken body
/// stream. HTTP error statuses are never reported through this type when the
/// request mutes them.
#[derive(Debug, Error)]
#[error("transport failed: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Executes one HTTP round-trip.
pub trait Transport {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

    impl From<ureq::Error> for TransportError {
        fn from(err: ureq::Error) -> Self {
            TransportError::new(err.to_string())
        }
    }

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// The agent never turns a status code into an error on its own; if a
    /// request does not mute HTTP exceptions, statuses >= 400 are converted
    /// into a `TransportError` here instead.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl std::fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let result = match request.method {
                HttpMethod::Get | HttpMethod::Delete => {
                    let mut builder = if request.method == HttpMethod::Get {
                        self.agent.get(&request.url)
                    } else {
                        self.agent.delete(&request.url)
                    };
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post | HttpMethod::Put => {
                    let mut builder = if request.method == HttpMethod::Post {
                        self.agent.post(&request.url)
                    } else {
                        self.agent.put(&request.url)
                    };
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    match &request.body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result?;
            let status = response.status().as_u16();
            let body = response.body_mut().read_to_string()?;

            if status >= 400 && !request.mute_http_exceptions {
                return Err(TransportError::new(format!(
                    "{} {} returned {status}",
                    request.method, request.url
                )));
            }

            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn only_post_and_put_have_bodies() {
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "https://example.com".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            mute_http_exceptions: true,
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn closures_are_transports() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, req.url.clone()))
        };
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "https://example.com/x".to_string(),
            headers: Vec::new(),
            mute_http_exceptions: true,
            body: None,
        };
        let resp = transport.fetch(&req).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "https://example.com/x");
    }
}
