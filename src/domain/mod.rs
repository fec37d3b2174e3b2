//! Pure domain types: config store, managed resources, policies, errors.

pub mod config_store;
mod error;
pub mod policy;
pub mod remediation;
pub mod resource;

pub use config_store::ConfigStore;
pub use error::AppError;
pub use policy::{PropagationEvent, ToolPolicy, ValuePolicy};
pub use remediation::Remediation;
pub use resource::{ManagedResourceReference, ResourceRecord, ResourceRole, ResourceState};
