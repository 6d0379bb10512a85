use std::time::Duration;
use thiserror::Error;
use tfplug::TfplugError;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("incorrect ID format '{id}', should match `{expected}`")]
    InvalidId { id: String, expected: &'static str },

    #[error("invalid value '{value}' for {attribute}: must be non-empty and must not contain '|'")]
    InvalidKey { attribute: String, value: String },

    #[error("invalid resource data: {0}")]
    Attribute(#[from] TfplugError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to encode policy: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("timeout after {timeout:?} waiting for workzone settings at {path} to become available ({attempts} attempts): {source}")]
    CreateTimeout {
        path: String,
        timeout: Duration,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("timeout after {timeout:?} waiting for workzone settings at {path} to become available: no response before the deadline")]
    CreateNoResponse { path: String, timeout: Duration },
}
