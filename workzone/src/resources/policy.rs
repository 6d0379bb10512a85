//! Terraform resource for any Workzone policy
//!
//! The three policy resources differ only in their configuration type, so a
//! single generic resource drives the shared create, read and delete cycle.

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    UpdateResourceRequest, UpdateResourceResponse, ValidateResourceConfigRequest,
    ValidateResourceConfigResponse,
};
use tfplug::types::Diagnostic;
use tfplug::{import_state_passthrough_id, ResourceData};

use crate::provider_data::WorkzoneProviderData;
use crate::reconcile::{self, PolicyConfig, PolicyKey, ReadOutcome};

pub struct PolicyResource<P> {
    provider_data: Option<WorkzoneProviderData>,
    _config: PhantomData<fn() -> P>,
}

impl<P: PolicyConfig> PolicyResource<P> {
    pub fn new() -> Self {
        Self {
            provider_data: None,
            _config: PhantomData,
        }
    }
}

impl<P: PolicyConfig> Default for PolicyResource<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

fn not_found_after_save<P: PolicyConfig>() -> String {
    format!(
        "Workzone {} policy not found after it was saved; the server returned no settings",
        P::KIND
    )
}

#[async_trait]
impl<P: PolicyConfig> Resource for PolicyResource<P> {
    fn type_name(&self) -> &str {
        P::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: P::schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let schema = P::schema();
        let mut config = request.config;
        schema.apply_defaults(&mut config);

        let mut diagnostics = schema.validate(&config);
        if !diagnostics.is_empty() {
            return ValidateResourceConfigResponse { diagnostics };
        }

        if let Err(e) = PolicyKey::from_attributes(&config, P::ARITY) {
            diagnostics.push(Diagnostic::error("Invalid policy key", e.to_string()));
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let mut state = request.planned_state;
        let detail = match reconcile::create::<P>(
            &ctx,
            provider_data.transport.as_ref(),
            &provider_data.retry,
            &mut state,
        )
        .await
        {
            Ok(ReadOutcome::Present) => None,
            Ok(ReadOutcome::Gone) => Some(not_found_after_save::<P>()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(detail) = detail {
            diagnostics.push(Diagnostic::error(
                format!("Failed to create Workzone {} policy", P::KIND),
                detail,
            ));
        }

        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let mut state = request.current_state.clone();
        match reconcile::read::<P>(provider_data.transport.as_ref(), &mut state).await {
            Ok(ReadOutcome::Present) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Ok(ReadOutcome::Gone) => ReadResourceResponse {
                new_state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Failed to read Workzone {} policy", P::KIND),
                    e.to_string(),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        // The POST is an upsert, so updating is creating again
        let mut state = request.planned_state;
        match reconcile::create::<P>(
            &ctx,
            provider_data.transport.as_ref(),
            &provider_data.retry,
            &mut state,
        )
        .await
        {
            Ok(ReadOutcome::Present) => UpdateResourceResponse {
                new_state: state,
                diagnostics,
            },
            outcome => {
                let detail = match outcome {
                    Err(e) => e.to_string(),
                    _ => not_found_after_save::<P>(),
                };
                diagnostics.push(Diagnostic::error(
                    format!("Failed to update Workzone {} policy", P::KIND),
                    detail,
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return DeleteResourceResponse { diagnostics };
            }
        };

        let mut state: ResourceData = request.prior_state;
        if let Err(e) = reconcile::delete::<P>(provider_data.transport.as_ref(), &mut state).await {
            diagnostics.push(Diagnostic::error(
                format!("Failed to delete Workzone {} policy", P::KIND),
                e.to_string(),
            ));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<P: PolicyConfig> ResourceWithConfigure for PolicyResource<P> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<WorkzoneProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract WorkzoneProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<P: PolicyConfig> ResourceWithImportState for PolicyResource<P> {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        if let Err(e) = PolicyKey::parse(&request.id, P::ARITY) {
            response
                .diagnostics
                .push(Diagnostic::error("Failed to import resource", e.to_string()));
            return response;
        }

        import_state_passthrough_id(&ctx, &request, &mut response);
        response
    }
}
