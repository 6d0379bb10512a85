//! Provider data structure passed to resources

use std::sync::Arc;

use crate::api::{Client, Transport};
use crate::reconcile::RetryConfig;

#[derive(Clone)]
pub struct WorkzoneProviderData {
    pub transport: Arc<dyn Transport>,
    pub retry: RetryConfig,
}

impl WorkzoneProviderData {
    pub fn new(client: Client) -> Self {
        Self::with_transport(Arc::new(client), RetryConfig::default())
    }

    pub fn with_transport(transport: Arc<dyn Transport>, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }
}
