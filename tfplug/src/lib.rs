//! tfplug - Terraform provider building blocks for Rust
//!
//! Resource data, schemas and the async provider/resource traits that
//! provider crates implement.

// Core modules
pub mod context;
pub mod error;
pub mod resource_data;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use resource_data::{Attributes, ResourceData, ResourceModel};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{Diagnostic, DiagnosticSeverity, Dynamic};
