//! Ensure the Function App's identity can read vault secrets.

use crate::app::services::reconciler::{MissingAction, ReconcileRequest, Reconciler};
use crate::domain::{AppError, ConfigStore, PropagationEvent, ResourceRole, ToolPolicy};
use crate::ports::{ControlPlane, OperatorPrompt, Waiter};

/// Role definition granted on the vault scope.
pub const VAULT_ROLE: &str = "Key Vault Secrets User";

#[derive(Debug, Clone)]
pub struct GrantReport {
    pub principal: String,
    pub vault: String,
    /// False when the assignment already existed.
    pub assigned: bool,
}

pub fn execute<C: ControlPlane, P: OperatorPrompt, W: Waiter>(
    cloud: &C,
    prompt: &P,
    waiter: &W,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
) -> Result<GrantReport, AppError> {
    let group = config.get(ResourceRole::ResourceGroup.config_key()).to_string();
    if group.is_empty() {
        return Err(AppError::ValueMissing { key: "RESOURCE_GROUP".to_string() });
    }

    let reconcile = |role: ResourceRole, config: &mut ConfigStore| {
        let request = ReconcileRequest {
            role,
            group: Some(group.as_str()),
            prefer: policy.detect_pattern(role),
            value_policy: policy.value_policy(role),
            on_missing: MissingAction::Abort,
            override_name: None,
        };
        let mut reconciler = Reconciler::new(cloud, prompt, config);
        reconciler.reconcile(&request)
    };

    let app = reconcile(ResourceRole::FunctionApp, config)?;
    let vault = reconcile(ResourceRole::KeyVault, config)?;
    let scope = vault.id.clone().ok_or(AppError::NotVerified { role: ResourceRole::KeyVault })?;

    let principal = cloud.principal_id(&app.name, &group)?;
    let existing = cloud.list_role_assignments(&principal, &scope)?;
    if existing.iter().any(|r| r == VAULT_ROLE) {
        return Ok(GrantReport { principal, vault: vault.name, assigned: false });
    }

    cloud.create_role_assignment(&principal, VAULT_ROLE, &scope)?;
    waiter.wait(
        PropagationEvent::RoleAssignment,
        policy.wait_for(PropagationEvent::RoleAssignment),
    );

    Ok(GrantReport { principal, vault: vault.name, assigned: true })
}
