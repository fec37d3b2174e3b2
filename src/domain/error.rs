use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::remediation::Remediation;
use crate::domain::resource::ResourceRole;

/// Library-wide error type for azup operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// No deployment config file at any candidate path.
    #[error("No deployment config found (tried: {})", format_tried(.tried))]
    ConfigMissing { tried: Vec<PathBuf> },

    /// A non-blank, non-comment config line without a `=`.
    #[error("Malformed config line {line}: '{content}' (expected KEY=value)")]
    ConfigParse { line: usize, content: String },

    /// `config init` refused to clobber an existing file.
    #[error("Deployment config already exists at {}", .path.display())]
    ConfigExists { path: PathBuf },

    /// A config key is required but empty, and its policy forbids guessing.
    #[error("Config value '{key}' is empty and no fallback is allowed")]
    ValueMissing { key: String },

    /// Probe and auto-detection both failed; terminal for this invocation.
    #[error("{role} '{name}' not found and auto-detection returned no candidates")]
    ResourceMissing { role: ResourceRole, name: String, group: Option<String> },

    /// Auto-detection returned several candidates and refused to guess.
    #[error("{role}: ambiguous auto-detection, candidates: {}", .candidates.join(", "))]
    AmbiguousAutoDetect { role: ResourceRole, candidates: Vec<String> },

    /// A mutating operation was attempted against an unverified resource.
    #[error("{role} reference is not verified; reconcile it first")]
    NotVerified { role: ResourceRole },

    /// The provisioning CLI (or a companion tool) is not installed.
    #[error("Required tool '{tool}' is not installed or not on PATH")]
    ToolMissing { tool: String },

    /// The CLI is installed but has no active session.
    #[error("Not logged in to the Azure CLI")]
    NotLoggedIn,

    /// The CLI rejected a command as unavailable (missing extension, wrong cloud).
    #[error("Command not available in this environment: {command}")]
    FeatureUnavailable { command: String },

    /// A prior run deleted the vault without purging it.
    #[error("Key vault '{name}' exists in soft-deleted state")]
    VaultSoftDeleted { name: String },

    /// The app has no system-assigned managed identity to grant roles to.
    #[error("Function app '{app}' has no system-assigned identity")]
    IdentityMissing { app: String },

    /// Creation raced with an existing resource. Callers treat this as success.
    #[error("{role} '{name}' already exists")]
    ResourceAlreadyExists { role: ResourceRole, name: String },

    /// The control plane reported the named resource does not exist.
    ///
    /// Probes translate this to `Ok(None)`; it only surfaces from operations
    /// that require the resource to be there.
    #[error("Resource '{name}' was not found")]
    CloudResourceNotFound { name: String },

    /// Non-zero exit from the provisioning CLI with no narrower translation.
    #[error("Command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Unparseable output from the provisioning CLI.
    #[error("Failed to parse {what}: {details}")]
    Parse { what: String, details: String },

    /// azup.toml could not be parsed.
    #[error("Policy file parse error: {0}")]
    PolicyParse(#[from] toml::de::Error),

    /// azup.toml parsed but failed validation.
    #[error("Policy file error: {0}")]
    Policy(String),
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

impl AppError {
    /// Process exit code for this failure at the CLI boundary.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Manual-fix playbook for conditions the operator must resolve.
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            AppError::ConfigMissing { tried } => Some(Remediation::new(
                "No deployment config file was found. To create one:",
                vec![
                    "Run `azup config init` to write a starter deployment-config.env".to_string(),
                    "Fill in RESOURCE_GROUP and the resource names for this deployment".to_string(),
                    format!(
                        "Or copy an existing file to one of: {}",
                        tried.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
                    ),
                ],
            )),
            AppError::ValueMissing { key } => Some(Remediation::new(
                format!("'{}' must be set before this operation can run:", key),
                vec![format!("azup config set {} <value>", key)],
            )),
            AppError::ResourceMissing { role, name, group } => {
                let group = group.as_deref().unwrap_or("<resource-group>");
                let name = if name.is_empty() { "<name>" } else { name.as_str() };
                Some(Remediation::new(
                    format!("The {} does not exist. To create it:", role),
                    vec![
                        role.create_command(name, group),
                        format!("azup config set {} {}", role.config_key(), name),
                        "Re-run the command".to_string(),
                    ],
                ))
            }
            AppError::AmbiguousAutoDetect { role, candidates } => Some(Remediation::new(
                format!("Several candidates matched the {}; pick one explicitly:", role),
                candidates
                    .iter()
                    .map(|c| format!("azup config set {} {}", role.config_key(), c))
                    .collect(),
            )),
            AppError::ToolMissing { tool } => Some(Remediation::new(
                format!("Install '{}' and retry:", tool),
                vec![
                    "https://learn.microsoft.com/cli/azure/install-azure-cli".to_string(),
                    format!("Confirm with `{} version`", tool),
                ],
            )),
            AppError::NotLoggedIn => Some(Remediation::new(
                "Sign in to the Azure CLI first:",
                vec![
                    "az login".to_string(),
                    "az account set --subscription <SUBSCRIPTION_ID>".to_string(),
                ],
            )),
            AppError::FeatureUnavailable { command } => Some(Remediation::new(
                "The command needs a CLI extension that is not installed:",
                vec![
                    format!("az extension add --name <extension for `{}`>", command),
                    "az extension list-available --output table".to_string(),
                ],
            )),
            AppError::VaultSoftDeleted { name } => Some(Remediation::new(
                "A previous run deleted this vault without purging it:",
                vec![
                    format!("az keyvault purge --name {}", name),
                    "Re-run the command to recreate it".to_string(),
                ],
            )),
            AppError::IdentityMissing { app } => Some(Remediation::new(
                "Enable the system-assigned identity first:",
                vec![
                    format!(
                        "az functionapp identity assign --name {} --resource-group <resource-group>",
                        app
                    ),
                    "Re-run `azup grant-access`".to_string(),
                ],
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vault_remediation_names_the_create_command() {
        let err = AppError::ResourceMissing {
            role: ResourceRole::KeyVault,
            name: String::new(),
            group: Some("pa-rg".to_string()),
        };
        let remediation = err.remediation().expect("vault missing must carry remediation");
        assert!(remediation.steps[0].starts_with("az keyvault create"));
        assert!(remediation.steps[0].contains("--resource-group pa-rg"));
    }

    #[test]
    fn ambiguous_detection_offers_one_step_per_candidate() {
        let err = AppError::AmbiguousAutoDetect {
            role: ResourceRole::WebApp,
            candidates: vec!["a".to_string(), "b".to_string()],
        };
        let remediation = err.remediation().unwrap();
        assert_eq!(remediation.steps.len(), 2);
        assert!(remediation.steps[0].contains("azup config set WEB_APP_NAME a"));
    }

    #[test]
    fn command_failures_have_no_playbook() {
        let err = AppError::CommandFailed { command: "az x".into(), stderr: "boom".into() };
        assert!(err.remediation().is_none());
    }
}
