//! Trello application key and user token.

use std::fmt;

use crate::error::{ApiError, ApiResult};
use crate::params::Params;

/// Environment variable holding the application key.
pub const KEY_ENV: &str = "TRELLO_KEY";
/// Environment variable holding the user token.
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

/// Application key plus optional user token, fixed at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    token: Option<String>,
}

impl Credentials {
    /// Fails with `ApiError::MissingKey` if `key` is empty.
    pub fn new(key: impl Into<String>, token: Option<String>) -> ApiResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ApiError::MissingKey);
        }
        Ok(Self { key, token })
    }

    /// Read `TRELLO_KEY` and, if set, `TRELLO_TOKEN`.
    pub fn from_env() -> ApiResult<Self> {
        let key =
            std::env::var(KEY_ENV).map_err(|_| ApiError::MissingEnvVar(KEY_ENV.to_string()))?;
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(key, token)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The credential pair as request parameters. An absent token is left
    /// out rather than sent empty.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new().with("key", self.key.as_str());
        if let Some(token) = &self.token {
            params.insert("token", token.as_str());
        }
        params
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
