//! Terraform resources for Workzone policies on Bitbucket Server
//!
//! Each policy is a settings object owned by the Workzone plugin. Resources
//! upsert it with a bounded retry, read back the server's copy and delete it
//! idempotently. See [`reconcile`] for the shared lifecycle.

pub mod api;
pub mod provider;
pub mod provider_data;
pub mod reconcile;
pub mod resources;

pub use provider::WorkzoneProvider;
pub use provider_data::WorkzoneProviderData;
