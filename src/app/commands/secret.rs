//! Key Vault secret operations, gated on a reconciled vault reference.

use crate::app::services::reconciler::{MissingAction, ReconcileRequest, Reconciler};
use crate::domain::{AppError, ConfigStore, ResourceRole, ToolPolicy};
use crate::ports::{ControlPlane, OperatorPrompt};

pub fn set<C: ControlPlane, P: OperatorPrompt>(
    cloud: &C,
    prompt: &P,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
    name: &str,
    value: &str,
) -> Result<(), AppError> {
    let vault = reconcile_vault(cloud, prompt, config, policy)?;
    cloud.set_secret(&vault, name, value)
}

pub fn get<C: ControlPlane, P: OperatorPrompt>(
    cloud: &C,
    prompt: &P,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
    name: &str,
) -> Result<String, AppError> {
    let vault = reconcile_vault(cloud, prompt, config, policy)?;
    cloud.get_secret(&vault, name)
}

/// Vault references must be Verified or AutoDetected before any secret
/// operation; a Missing vault aborts with the create playbook.
fn reconcile_vault<C: ControlPlane, P: OperatorPrompt>(
    cloud: &C,
    prompt: &P,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
) -> Result<String, AppError> {
    let group = config.get(ResourceRole::ResourceGroup.config_key()).to_string();
    let request = ReconcileRequest {
        role: ResourceRole::KeyVault,
        group: (!group.is_empty()).then_some(group.as_str()),
        prefer: None,
        value_policy: policy.value_policy(ResourceRole::KeyVault),
        on_missing: MissingAction::Abort,
        override_name: None,
    };
    let mut reconciler = Reconciler::new(cloud, prompt, config);
    let vault = reconciler.reconcile(&request)?;
    if !vault.usable() {
        return Err(AppError::NotVerified { role: ResourceRole::KeyVault });
    }
    Ok(vault.name)
}
