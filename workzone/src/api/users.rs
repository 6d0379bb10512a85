//! Bitbucket user lookup

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::escape_path_segment;
use super::error::ApiError;
use super::transport::Transport;

/// Bitbucket user record as embedded in Workzone payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub user_type: String,
}

impl User {
    /// A user reference carrying only the username
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Resolves a username to the full user record
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<User, ApiError>;
}

/// Users API for user operations
pub struct UsersApi<'a> {
    transport: &'a dyn Transport,
}

impl<'a> UsersApi<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    pub fn user_path(name: &str) -> String {
        format!("/rest/api/1.0/users/{}", escape_path_segment(name))
    }

    /// GET /rest/api/1.0/users/{name}
    ///
    /// Anything but a 200 is reported as `UserNotFound`.
    pub async fn get(&self, name: &str) -> Result<User, ApiError> {
        let response = self.transport.get(&Self::user_path(name)).await?;

        if response.status != 200 {
            tracing::debug!("User lookup for {} returned HTTP {}", name, response.status);
            return Err(ApiError::UserNotFound {
                name: name.to_string(),
                status: response.status,
            });
        }

        response.json()
    }
}

#[async_trait]
impl UserResolver for UsersApi<'_> {
    async fn resolve(&self, name: &str) -> Result<User, ApiError> {
        self.get(name).await
    }
}

/// Resolver that skips the lookup and returns name-only records
///
/// Used for DELETE bodies, whose content the server ignores.
pub struct UnresolvedUsers;

#[async_trait]
impl UserResolver for UnresolvedUsers {
    async fn resolve(&self, name: &str) -> Result<User, ApiError> {
        Ok(User::named(name))
    }
}
