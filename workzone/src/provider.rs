//! The bitbucketserver provider

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::Diagnostic;
use tfplug::Attributes;

use crate::api::Client;
use crate::provider_data::WorkzoneProviderData;
use crate::reconcile::{PolicyConfig, RetryConfig};
use crate::resources::{
    AutomergePolicy, AutomergeResource, ReviewersPolicy, ReviewersResource, WorkflowPolicy,
    WorkflowResource,
};

pub const ENV_SERVER: &str = "BITBUCKET_SERVER";
pub const ENV_USERNAME: &str = "BITBUCKET_USERNAME";
pub const ENV_PASSWORD: &str = "BITBUCKET_PASSWORD";

pub struct WorkzoneProvider {
    provider_data: Option<WorkzoneProviderData>,
    retry: RetryConfig,
}

impl Default for WorkzoneProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkzoneProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
            retry: RetryConfig::default(),
        }
    }

    /// Override the create retry window handed to every resource
    pub fn with_retry(retry: RetryConfig) -> Self {
        Self {
            provider_data: None,
            retry,
        }
    }

    pub fn provider_data(&self) -> Option<&WorkzoneProviderData> {
        self.provider_data.as_ref()
    }
}

/// Value from provider config, falling back to an environment variable.
/// Empty strings count as unset on both sides.
fn setting(config: &Attributes, name: &str, env: &str) -> Option<String> {
    config
        .get(name)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
}

fn factory<R>() -> ResourceFactory
where
    R: ResourceWithConfigure + Default + 'static,
{
    Box::new(|| Box::new(R::default()) as Box<dyn ResourceWithConfigure>)
}

#[async_trait]
impl Provider for WorkzoneProvider {
    fn type_name(&self) -> &str {
        "bitbucketserver"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Workzone policies on Bitbucket Server")
            .attribute(
                AttributeBuilder::string("server")
                    .description("Bitbucket Server URL. Can also be set with BITBUCKET_SERVER.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("username")
                    .description("Username for basic auth. Can also be set with BITBUCKET_USERNAME.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("password")
                    .description("Password for basic auth. Can also be set with BITBUCKET_PASSWORD.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let server = setting(&request.config, "server", ENV_SERVER);
        let username = setting(&request.config, "username", ENV_USERNAME);
        let password = setting(&request.config, "password", ENV_PASSWORD);

        for (name, env, value) in [
            ("server", ENV_SERVER, &server),
            ("username", ENV_USERNAME, &username),
            ("password", ENV_PASSWORD, &password),
        ] {
            if value.is_none() {
                diagnostics.push(Diagnostic::error(
                    format!("{} is required (set in provider config or {} env var)", name, env),
                    format!("The provider cannot connect to Bitbucket Server without a {}", name),
                ));
            }
        }

        let (Some(server), Some(username), Some(password)) = (server, username, password) else {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        match Client::new(&server, &username, &password) {
            Ok(client) => {
                tracing::debug!("Configured Bitbucket Server client for {}", client.base_url());
                let mut data = WorkzoneProviderData::new(client);
                data.retry = self.retry.clone();
                self.provider_data = Some(data.clone());

                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(data)),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources = HashMap::new();
        resources.insert(
            AutomergePolicy::TYPE_NAME.to_string(),
            factory::<AutomergeResource>(),
        );
        resources.insert(
            ReviewersPolicy::TYPE_NAME.to_string(),
            factory::<ReviewersResource>(),
        );
        resources.insert(
            WorkflowPolicy::TYPE_NAME.to_string(),
            factory::<WorkflowResource>(),
        );
        resources
    }
}
