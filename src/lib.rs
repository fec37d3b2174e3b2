//! azup: reconcile an Azure deployment described by `deployment-config.env`
//! against reality, driving the `az` CLI idempotently.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::commands::doctor::{DoctorOptions, DoctorOutcome};
pub use app::commands::grant::GrantReport;
pub use app::commands::provision::{ProvisionOptions, ProvisionReport};
pub use app::commands::settings::SettingsPushReport;
pub use app::commands::teardown::{TeardownOptions, TeardownReport};
pub use app::services::reconciler::{MissingAction, ReconcileRequest, Reconciler};
pub use domain::{
    AppError, ConfigStore, ManagedResourceReference, Remediation, ResourceRole, ResourceState,
    ToolPolicy, ValuePolicy,
};
