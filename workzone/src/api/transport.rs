//! Transport seam between the Workzone APIs and HTTP
//!
//! Everything above this layer talks to a `dyn Transport`, so the reconciler
//! can run against the real [`Client`](super::Client) or an in-memory fake.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::users::UsersApi;
use super::workzone::{PolicyApi, WorkzonePolicy};

/// Raw HTTP response: status code plus body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Turn non-2xx responses into errors
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            return Ok(self);
        }
        if self.status == 401 {
            return Err(ApiError::AuthError);
        }
        Err(ApiError::ApiError {
            status: self.status,
            message: self.body,
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, self.body);
            ApiError::ParseError(e.to_string())
        })
    }
}

/// Sends a request to the Bitbucket server and returns the raw response
///
/// Only failures below HTTP (connect errors, timeouts) are errors here;
/// status handling is up to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, ApiError>;

    async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, path, None).await
    }

    /// Some Workzone endpoints refuse a DELETE without a body
    async fn delete_with_body(&self, path: &str, body: Vec<u8>) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, path, Some(body)).await
    }
}

impl<'a> dyn Transport + 'a {
    /// Bitbucket user API operations
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Workzone policy operations for one policy kind
    pub fn policies<P: WorkzonePolicy>(&self) -> PolicyApi<'_, P> {
        PolicyApi::new(self)
    }
}
