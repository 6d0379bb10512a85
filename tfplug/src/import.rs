//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::resource_data::{Attributes, ResourceData};
use crate::types::Diagnostic;

/// Imports a resource whose import ID is its resource ID
///
/// The state only carries the ID; the follow-up read fills in the rest.
pub fn import_state_passthrough_id(
    _ctx: &Context,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.is_empty() {
        response.diagnostics.push(Diagnostic::error(
            "Failed to import resource",
            format!("An empty ID was given for {}", request.type_name),
        ));
        return;
    }

    tracing::debug!("Importing {} with ID {}", request.type_name, request.id);

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state: ResourceData::with_id(request.id.clone(), Attributes::new()),
    });
}
