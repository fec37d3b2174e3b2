//! Tool policy (`azup.toml`): per-key value policies, detection patterns,
//! and propagation waits.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::AppError;
use crate::domain::resource::ResourceRole;

/// Well-known file name for the optional policy file, looked up next to the
/// deployment config.
pub const POLICY_FILE_NAME: &str = "azup.toml";

/// What to do when a required config value is empty or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuePolicy {
    /// Ask the operator interactively.
    Prompt,
    /// Go straight to the list-and-filter discovery query.
    AutoDetect,
    /// Abort with remediation.
    Fail,
}

impl ValuePolicy {
    /// Default policy when `azup.toml` does not pin one for the key.
    ///
    /// Group-scoped resources can be discovered by listing the group;
    /// the group itself and directory objects cannot be guessed.
    pub fn default_for(role: ResourceRole) -> Self {
        if role.supports_discovery() { ValuePolicy::AutoDetect } else { ValuePolicy::Fail }
    }
}

/// Eventual-consistency waits, named rather than inlined as magic sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationEvent {
    RoleAssignment,
    Dns,
    ContainerRestart,
}

impl PropagationEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            PropagationEvent::RoleAssignment => "role assignment propagation",
            PropagationEvent::Dns => "DNS registration",
            PropagationEvent::ContainerRestart => "container restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolPolicy {
    #[serde(default)]
    pub reconcile: ReconcileSection,
    #[serde(default)]
    pub detect: DetectSection,
    #[serde(default)]
    pub waits: WaitSection,
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self {
            reconcile: ReconcileSection::default(),
            detect: DetectSection::default(),
            waits: WaitSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ReconcileSection {
    /// Create missing creatable resources without requiring `--create`.
    #[serde(default)]
    pub auto_create: bool,
    /// Per-config-key override of the empty-value policy.
    #[serde(default)]
    pub keys: BTreeMap<String, ValuePolicy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectSection {
    /// Preferred substring when several web apps are discovered.
    #[serde(default = "default_web_pattern")]
    pub web_app: String,
    /// Preferred substring when several function apps are discovered.
    #[serde(default = "default_function_pattern")]
    pub function_app: String,
}

impl Default for DetectSection {
    fn default() -> Self {
        Self { web_app: default_web_pattern(), function_app: default_function_pattern() }
    }
}

fn default_web_pattern() -> String {
    "web".to_string()
}

fn default_function_pattern() -> String {
    "api".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSection {
    #[serde(default = "default_role_assignment_secs")]
    pub role_assignment: u64,
    #[serde(default = "default_dns_secs")]
    pub dns: u64,
    #[serde(default = "default_container_restart_secs")]
    pub container_restart: u64,
}

impl Default for WaitSection {
    fn default() -> Self {
        Self {
            role_assignment: default_role_assignment_secs(),
            dns: default_dns_secs(),
            container_restart: default_container_restart_secs(),
        }
    }
}

fn default_role_assignment_secs() -> u64 {
    30
}

fn default_dns_secs() -> u64 {
    10
}

fn default_container_restart_secs() -> u64 {
    20
}

impl ToolPolicy {
    /// Effective empty-value policy for a role's config key.
    pub fn value_policy(&self, role: ResourceRole) -> ValuePolicy {
        self.reconcile
            .keys
            .get(role.config_key())
            .copied()
            .unwrap_or_else(|| ValuePolicy::default_for(role))
    }

    /// Preferred-substring pattern for auto-detection tie-breaks, if any.
    pub fn detect_pattern(&self, role: ResourceRole) -> Option<&str> {
        match role {
            ResourceRole::WebApp => Some(self.detect.web_app.as_str()),
            ResourceRole::FunctionApp => Some(self.detect.function_app.as_str()),
            _ => None,
        }
    }

    /// Configured duration for a propagation event.
    pub fn wait_for(&self, event: PropagationEvent) -> Duration {
        let secs = match event {
            PropagationEvent::RoleAssignment => self.waits.role_assignment,
            PropagationEvent::Dns => self.waits.dns,
            PropagationEvent::ContainerRestart => self.waits.container_restart,
        };
        Duration::from_secs(secs)
    }

    fn validate(&self) -> Result<(), AppError> {
        let known: Vec<&str> = ResourceRole::ALL.iter().map(|r| r.config_key()).collect();
        for key in self.reconcile.keys.keys() {
            if !known.contains(&key.as_str()) {
                return Err(AppError::Policy(format!(
                    "[reconcile.keys] names unknown config key '{}'",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Parse and validate policy content.
pub fn parse_policy_content(content: &str) -> Result<ToolPolicy, AppError> {
    let policy: ToolPolicy = toml::from_str(content)?;
    policy.validate()?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_sections() {
        let policy = parse_policy_content("").unwrap();
        assert!(!policy.reconcile.auto_create);
        assert_eq!(policy.detect_pattern(ResourceRole::WebApp), Some("web"));
        assert_eq!(policy.detect_pattern(ResourceRole::FunctionApp), Some("api"));
        assert_eq!(
            policy.wait_for(PropagationEvent::RoleAssignment),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn per_key_policy_overrides_the_default() {
        let policy = parse_policy_content(
            r#"
[reconcile.keys]
ACR_NAME = "prompt"
"#,
        )
        .unwrap();
        assert_eq!(policy.value_policy(ResourceRole::ContainerRegistry), ValuePolicy::Prompt);
        assert_eq!(policy.value_policy(ResourceRole::WebApp), ValuePolicy::AutoDetect);
        assert_eq!(policy.value_policy(ResourceRole::ResourceGroup), ValuePolicy::Fail);
    }

    #[test]
    fn unknown_policy_key_is_rejected() {
        let result = parse_policy_content(
            r#"
[reconcile.keys]
NOT_A_KEY = "fail"
"#,
        );
        assert!(matches!(result, Err(AppError::Policy(_))));
    }

    #[test]
    fn unknown_section_field_is_a_parse_error() {
        let result = parse_policy_content(
            r#"
[waits]
role_assignment = 5
retries = 3
"#,
        );
        assert!(matches!(result, Err(AppError::PolicyParse(_))));
    }

    #[test]
    fn waits_come_from_the_file() {
        let policy = parse_policy_content(
            r#"
[waits]
container_restart = 2
"#,
        )
        .unwrap();
        assert_eq!(
            policy.wait_for(PropagationEvent::ContainerRestart),
            Duration::from_secs(2)
        );
        assert_eq!(policy.wait_for(PropagationEvent::Dns), Duration::from_secs(10));
    }
}
