//! Delete the resource group, optionally purging the soft-deleted vault.
//!
//! Directory objects (app registration, groups) are deliberately left alone.

use crate::domain::{AppError, ConfigStore, ResourceRole};
use crate::ports::{ControlPlane, OperatorPrompt};

#[derive(Debug, Clone, Copy, Default)]
pub struct TeardownOptions {
    /// Skip the interactive confirmation.
    pub yes: bool,
    /// Also purge the vault so the name can be reused immediately.
    pub purge_vault: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TeardownReport {
    pub cancelled: bool,
    pub deleted_group: Option<String>,
    pub purged_vault: Option<String>,
    pub warnings: Vec<String>,
}

pub fn execute<C: ControlPlane, P: OperatorPrompt>(
    cloud: &C,
    prompt: &P,
    config: &ConfigStore,
    options: TeardownOptions,
) -> Result<TeardownReport, AppError> {
    let group = config.get(ResourceRole::ResourceGroup.config_key());
    if group.is_empty() {
        return Err(AppError::ValueMissing { key: "RESOURCE_GROUP".to_string() });
    }

    if !options.yes {
        let question = format!("Delete resource group '{}' and everything in it?", group);
        if prompt.confirm(&question)? != Some(true) {
            return Ok(TeardownReport { cancelled: true, ..Default::default() });
        }
    }

    let mut report = TeardownReport::default();

    match cloud.probe(ResourceRole::ResourceGroup, group, None)? {
        Some(_) => {
            cloud.delete_group(group)?;
            report.deleted_group = Some(group.to_string());
        }
        None => {
            report.warnings.push(format!("resource group '{}' is already gone", group));
        }
    }

    if options.purge_vault {
        let vault = config.get(ResourceRole::KeyVault.config_key());
        if vault.is_empty() {
            report.warnings.push("KEY_VAULT_NAME not configured; nothing to purge".to_string());
        } else {
            match cloud.purge_vault(vault) {
                Ok(()) => report.purged_vault = Some(vault.to_string()),
                // Nothing soft-deleted under that name; fine.
                Err(AppError::CloudResourceNotFound { .. }) => {
                    report.warnings.push(format!("no soft-deleted vault named '{}'", vault));
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(report)
}
