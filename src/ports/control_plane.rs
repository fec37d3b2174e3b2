//! Port for the cloud provisioning CLI.
//!
//! The adapter is responsible for translating raw exit codes and stderr text
//! into typed `AppError` outcomes exactly once; callers never string-match.

use std::collections::BTreeMap;

use crate::domain::{AppError, ResourceRecord, ResourceRole};

pub trait ControlPlane {
    /// Version string of the underlying tool. Doubles as the availability
    /// probe: `ToolMissing` when it cannot be spawned.
    fn tool_version(&self) -> Result<String, AppError>;

    /// Existence query. `Ok(None)` when the resource does not exist;
    /// `Ok(Some)` carries the canonical name/ID as the provider reports it.
    fn probe(
        &self,
        role: ResourceRole,
        name: &str,
        group: Option<&str>,
    ) -> Result<Option<ResourceRecord>, AppError>;

    /// Discovery listing, scoped to the parent resource group for
    /// group-scoped roles.
    fn list(&self, role: ResourceRole, group: Option<&str>)
    -> Result<Vec<ResourceRecord>, AppError>;

    /// Idempotent creation. Implementations surface a provider-side
    /// "already exists" as `ResourceAlreadyExists` so callers can treat the
    /// race as success.
    fn create(
        &self,
        role: ResourceRole,
        name: &str,
        group: Option<&str>,
        location: &str,
    ) -> Result<ResourceRecord, AppError>;

    fn get_app_settings(&self, app: &str, group: &str)
    -> Result<BTreeMap<String, String>, AppError>;

    fn set_app_settings(
        &self,
        app: &str,
        group: &str,
        settings: &[(String, String)],
    ) -> Result<(), AppError>;

    fn get_secret(&self, vault: &str, name: &str) -> Result<String, AppError>;

    fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<(), AppError>;

    /// Object ID of the app's system-assigned managed identity.
    fn principal_id(&self, app: &str, group: &str) -> Result<String, AppError>;

    /// Role-definition names currently assigned to `assignee` at `scope`.
    fn list_role_assignments(&self, assignee: &str, scope: &str) -> Result<Vec<String>, AppError>;

    fn create_role_assignment(
        &self,
        assignee: &str,
        role_name: &str,
        scope: &str,
    ) -> Result<(), AppError>;

    fn list_registry_tags(&self, registry: &str, repository: &str)
    -> Result<Vec<String>, AppError>;

    fn delete_group(&self, group: &str) -> Result<(), AppError>;

    /// Recovery for a vault a prior run deleted without purging.
    fn purge_vault(&self, name: &str) -> Result<(), AppError>;
}
