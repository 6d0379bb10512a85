//! Workzone plugin REST API
//!
//! Every Workzone policy lives at
//! `/rest/workzoneresource/1.0/{kind}/{project}/{repository}` and supports
//! the same three verbs: POST upserts, GET returns the stored policies, and
//! DELETE removes them.

pub mod automerge;
pub mod reviewers;
pub mod workflow;

pub use automerge::AutomergeSettings;
pub use reviewers::{FilePathReviewers, ReviewerAssignment, ReviewersSettings};
pub use workflow::WorkflowSettings;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::common::{decode_policies, escape_path_segment};
use super::error::ApiError;
use super::transport::Transport;

/// A Workzone policy payload and the endpoint it belongs to
pub trait WorkzonePolicy: Serialize + DeserializeOwned + Send + Sync {
    /// Whether the endpoint rejects a DELETE without a request body
    const DELETE_WITH_BODY: bool;

    fn api_path() -> &'static str;

    fn resource_path(project: &str, repository: &str) -> String {
        format!(
            "{}/{}/{}",
            Self::api_path(),
            escape_path_segment(project),
            escape_path_segment(repository)
        )
    }
}

/// Policy API for one policy kind
pub struct PolicyApi<'a, P> {
    transport: &'a dyn Transport,
    _policy: PhantomData<fn() -> P>,
}

impl<'a, P: WorkzonePolicy> PolicyApi<'a, P> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            _policy: PhantomData,
        }
    }

    /// POST an already encoded policy
    pub async fn save(&self, project: &str, repository: &str, body: Vec<u8>) -> Result<(), ApiError> {
        let path = P::resource_path(project, repository);
        self.transport.post(&path, body).await?.error_for_status()?;
        Ok(())
    }

    /// GET the stored policy. A 404 or an empty list means there is none,
    /// otherwise the first entry is authoritative.
    pub async fn get(&self, project: &str, repository: &str) -> Result<Option<P>, ApiError> {
        let path = P::resource_path(project, repository);
        let response = self.transport.get(&path).await?;

        if response.is_not_found() {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        let policies: Vec<P> = decode_policies(&response.body).map_err(|e| {
            tracing::error!("Failed to decode {}: {}, body: {}", path, e, response.body);
            ApiError::ParseError(e.to_string())
        })?;

        Ok(policies.into_iter().next())
    }

    /// DELETE the policy. Returns `false` if it was already gone.
    pub async fn delete(
        &self,
        project: &str,
        repository: &str,
        body: Option<Vec<u8>>,
    ) -> Result<bool, ApiError> {
        let path = P::resource_path(project, repository);
        let response = match body {
            Some(body) => self.transport.delete_with_body(&path, body).await?,
            None => self.transport.delete(&path).await?,
        };

        if response.is_not_found() {
            return Ok(false);
        }

        response.error_for_status()?;
        Ok(true)
    }
}
