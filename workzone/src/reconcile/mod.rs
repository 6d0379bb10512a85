//! Create, read and delete for policies that live inside Workzone
//!
//! Terraform state only holds the policy identifier and a mirror of its
//! fields. Create is an idempotent upsert retried until the server accepts
//! it, followed by a read that overwrites local values with what the server
//! stored. Update is the same operation as create.

pub mod error;
pub mod id;
pub mod retry;

pub use error::ReconcileError;
pub use id::{KeyArity, PolicyKey};
pub use retry::{retry_until_deadline, RetryConfig};

use async_trait::async_trait;
use tfplug::{Context, ResourceData, ResourceModel, Schema};

use crate::api::{ApiError, Transport, UnresolvedUsers, UserResolver, WorkzonePolicy};

/// Typed configuration of one Workzone policy resource
#[async_trait]
pub trait PolicyConfig: ResourceModel + Send + Sync + 'static {
    type Payload: WorkzonePolicy;

    /// Terraform resource type name
    const TYPE_NAME: &'static str;
    /// Short policy name used in logs and diagnostics
    const KIND: &'static str;
    const ARITY: KeyArity;

    fn schema() -> Schema;

    fn key(&self) -> Result<PolicyKey, ReconcileError>;

    /// Build the request payload, resolving usernames through `users`
    async fn to_payload(&self, users: &dyn UserResolver) -> Result<Self::Payload, ApiError>;

    /// Overwrite local fields with the server's copy
    fn reconcile(&mut self, remote: Self::Payload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Present,
    /// The policy no longer exists and the identifier was cleared
    Gone,
}

/// Apply schema defaults and build the typed configuration
pub fn load_config<P: PolicyConfig>(data: &ResourceData) -> Result<P, ReconcileError> {
    let mut values = data.values.clone();
    P::schema().apply_defaults(&mut values);
    Ok(P::from_attributes(&values)?)
}

/// Key from the identifier if one is set, otherwise from the key attributes
fn current_key<P: PolicyConfig>(data: &ResourceData) -> Result<PolicyKey, ReconcileError> {
    if data.has_id() {
        PolicyKey::parse(data.id(), P::ARITY)
    } else {
        PolicyKey::from_attributes(&data.values, P::ARITY)
    }
}

/// Upsert the policy, retrying until the server accepts it, then read it back
pub async fn create<P: PolicyConfig>(
    ctx: &Context,
    transport: &dyn Transport,
    retry: &RetryConfig,
    data: &mut ResourceData,
) -> Result<ReadOutcome, ReconcileError> {
    let config = load_config::<P>(data)?;
    let key = config.key()?;

    let payload = config.to_payload(&transport.users()).await?;
    let body = serde_json::to_vec(&payload)?;

    let api = transport.policies::<P::Payload>();
    retry_until_deadline(ctx, retry, || {
        api.save(&key.project, &key.repository, body.clone())
    })
    .await
    .map_err(|exhausted| {
        let path = P::Payload::resource_path(&key.project, &key.repository);
        match exhausted.last_error {
            Some(source) => ReconcileError::CreateTimeout {
                path,
                timeout: retry.timeout,
                attempts: exhausted.attempts,
                source,
            },
            None => ReconcileError::CreateNoResponse {
                path,
                timeout: retry.timeout,
            },
        }
    })?;

    tracing::info!("Saved Workzone {} policy {}", P::KIND, key);

    config.write_attributes(&mut data.values);
    data.set_id(key.to_string());

    read::<P>(transport, data).await
}

/// Refresh local values from the server
///
/// A 404 or an empty response clears the identifier. A malformed identifier
/// is an error, never "gone".
pub async fn read<P: PolicyConfig>(
    transport: &dyn Transport,
    data: &mut ResourceData,
) -> Result<ReadOutcome, ReconcileError> {
    let key = current_key::<P>(data)?;
    key.write_to(&mut data.values);

    let remote = transport
        .policies::<P::Payload>()
        .get(&key.project, &key.repository)
        .await?;

    let Some(remote) = remote else {
        tracing::warn!(
            "Workzone {} policy ({}) not found, removing from state",
            P::KIND,
            key
        );
        data.clear_id();
        return Ok(ReadOutcome::Gone);
    };

    let mut config = load_config::<P>(data)?;
    config.reconcile(remote);
    config.write_attributes(&mut data.values);

    Ok(ReadOutcome::Present)
}

/// Remove the policy. A policy that is already gone is not an error.
pub async fn delete<P: PolicyConfig>(
    transport: &dyn Transport,
    data: &mut ResourceData,
) -> Result<(), ReconcileError> {
    let key = current_key::<P>(data)?;

    let body = if P::Payload::DELETE_WITH_BODY {
        // The server requires a body but ignores it, so skip user lookups
        let mut values = data.clone();
        key.write_to(&mut values.values);
        let config = load_config::<P>(&values)?;
        let payload = config.to_payload(&UnresolvedUsers).await?;
        Some(serde_json::to_vec(&payload)?)
    } else {
        None
    };

    let removed = transport
        .policies::<P::Payload>()
        .delete(&key.project, &key.repository, body)
        .await?;

    if removed {
        tracing::info!("Deleted Workzone {} policy {}", P::KIND, key);
    } else {
        tracing::debug!("Workzone {} policy {} was already gone", P::KIND, key);
    }

    data.clear_id();
    Ok(())
}
