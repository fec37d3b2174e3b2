//! `az` CLI adapter implementing the control-plane port.
//!
//! All stderr/string matching on tool output lives here; the rest of the
//! crate only sees typed `AppError` outcomes.

use std::collections::BTreeMap;
use std::env;
use std::io::ErrorKind;
use std::process::Command;

use serde_json::Value;

use crate::domain::{AppError, ResourceRecord, ResourceRole};
use crate::ports::ControlPlane;

/// Environment variable overriding the `az` binary, for tests and unusual
/// installs.
pub const AZ_BIN_ENV: &str = "AZUP_AZ";

#[derive(Debug, Clone)]
pub struct AzureCliAdapter {
    program: String,
}

impl AzureCliAdapter {
    pub fn new() -> Self {
        let program = env::var(AZ_BIN_ENV).unwrap_or_else(|_| "az".to_string());
        Self { program }
    }

    fn run(&self, args: &[&str], context: FailureContext<'_>) -> Result<String, AppError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);

        let rendered = format!("{} {}", self.program, args.join(" "));
        let output = cmd.output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::ToolMissing { tool: self.program.clone() }
            } else {
                AppError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(translate_failure(rendered, stderr, context));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run_json(&self, args: &[&str], context: FailureContext<'_>) -> Result<Value, AppError> {
        let stdout = self.run(args, context)?;
        serde_json::from_str(&stdout).map_err(|e| AppError::Parse {
            what: format!("JSON output of `{} {}`", self.program, args.join(" ")),
            details: e.to_string(),
        })
    }

    fn require_group<'a>(&self, group: Option<&'a str>) -> Result<&'a str, AppError> {
        match group {
            Some(g) if !g.is_empty() => Ok(g),
            _ => Err(AppError::ValueMissing { key: "RESOURCE_GROUP".to_string() }),
        }
    }
}

impl Default for AzureCliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller context threaded into failure translation so typed variants carry
/// the resource they were about.
#[derive(Debug, Clone, Copy, Default)]
struct FailureContext<'a> {
    name: &'a str,
    role: Option<ResourceRole>,
}

impl<'a> FailureContext<'a> {
    fn resource(role: ResourceRole, name: &'a str) -> Self {
        Self { name, role: Some(role) }
    }

    fn named(name: &'a str) -> Self {
        Self { name, role: None }
    }
}

/// One-shot translation of a failed invocation into the typed taxonomy.
fn translate_failure(command: String, stderr: String, context: FailureContext<'_>) -> AppError {
    let lower = stderr.to_lowercase();

    if lower.contains("az login") || lower.contains("no subscriptions found") {
        return AppError::NotLoggedIn;
    }
    if lower.contains("not available in this environment") {
        return AppError::FeatureUnavailable { command };
    }
    if lower.contains("deleted state") || lower.contains("soft deleted") {
        return AppError::VaultSoftDeleted { name: context.name.to_string() };
    }
    if lower.contains("alreadyexists") || lower.contains("already exists") {
        if let Some(role) = context.role {
            return AppError::ResourceAlreadyExists { role, name: context.name.to_string() };
        }
    }
    if lower.contains("resourcenotfound")
        || lower.contains("resourcegroupnotfound")
        || lower.contains("was not found")
        || lower.contains("could not be found")
        || lower.contains("does not exist")
    {
        let name = if context.name.is_empty() { command.clone() } else { context.name.to_string() };
        return AppError::CloudResourceNotFound { name };
    }

    AppError::CommandFailed { command, stderr }
}

fn show_args<'a>(role: ResourceRole, name: &'a str, group: Option<&'a str>) -> Vec<&'a str> {
    match role {
        ResourceRole::ResourceGroup => vec!["group", "show", "--name", name, "--output", "json"],
        ResourceRole::Storage => {
            let g = group.unwrap_or_default();
            vec![
                "storage",
                "account",
                "show",
                "--name",
                name,
                "--resource-group",
                g,
                "--output",
                "json",
            ]
        }
        ResourceRole::ContainerRegistry => {
            let g = group.unwrap_or_default();
            vec!["acr", "show", "--name", name, "--resource-group", g, "--output", "json"]
        }
        ResourceRole::KeyVault => vec!["keyvault", "show", "--name", name, "--output", "json"],
        ResourceRole::AppInsights => {
            let g = group.unwrap_or_default();
            vec![
                "monitor",
                "app-insights",
                "component",
                "show",
                "--app",
                name,
                "--resource-group",
                g,
                "--output",
                "json",
            ]
        }
        ResourceRole::FunctionApp => {
            let g = group.unwrap_or_default();
            vec!["functionapp", "show", "--name", name, "--resource-group", g, "--output", "json"]
        }
        ResourceRole::WebApp => {
            let g = group.unwrap_or_default();
            vec!["webapp", "show", "--name", name, "--resource-group", g, "--output", "json"]
        }
        ResourceRole::AppRegistration => {
            vec!["ad", "app", "list", "--display-name", name, "--output", "json"]
        }
        ResourceRole::AdminGroup | ResourceRole::EmployeeGroup => {
            vec!["ad", "group", "show", "--group", name, "--output", "json"]
        }
    }
}

fn parse_record(role: ResourceRole, value: &Value) -> Result<ResourceRecord, AppError> {
    let parse_err = |details: &str| AppError::Parse {
        what: format!("{} record", role),
        details: details.to_string(),
    };
    match role {
        ResourceRole::AppRegistration => {
            let name =
                value["displayName"].as_str().ok_or_else(|| parse_err("missing displayName"))?;
            let id = value["appId"].as_str().ok_or_else(|| parse_err("missing appId"))?;
            Ok(ResourceRecord { name: name.to_string(), id: id.to_string() })
        }
        // Directory groups are configured by object ID, so the ID is the
        // canonical "name" the config file stores.
        ResourceRole::AdminGroup | ResourceRole::EmployeeGroup => {
            let id = value["id"].as_str().ok_or_else(|| parse_err("missing id"))?;
            Ok(ResourceRecord { name: id.to_string(), id: id.to_string() })
        }
        _ => {
            let name = value["name"].as_str().ok_or_else(|| parse_err("missing name"))?;
            let id = value["id"].as_str().unwrap_or_default();
            Ok(ResourceRecord { name: name.to_string(), id: id.to_string() })
        }
    }
}

impl ControlPlane for AzureCliAdapter {
    fn tool_version(&self) -> Result<String, AppError> {
        let value = self.run_json(&["version", "--output", "json"], FailureContext::default())?;
        let version = value["azure-cli"].as_str().unwrap_or("unknown");
        Ok(version.to_string())
    }

    fn probe(
        &self,
        role: ResourceRole,
        name: &str,
        group: Option<&str>,
    ) -> Result<Option<ResourceRecord>, AppError> {
        let args = show_args(role, name, group);
        let value = match self.run_json(&args, FailureContext::resource(role, name)) {
            Ok(value) => value,
            Err(AppError::CloudResourceNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        // `ad app list` probes by display name and yields an array.
        if role == ResourceRole::AppRegistration {
            return match value.as_array().and_then(|apps| apps.first()) {
                Some(first) => Ok(Some(parse_record(role, first)?)),
                None => Ok(None),
            };
        }

        Ok(Some(parse_record(role, &value)?))
    }

    fn list(
        &self,
        role: ResourceRole,
        group: Option<&str>,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        let args: Vec<&str> = match role {
            ResourceRole::ResourceGroup => vec!["group", "list", "--output", "json"],
            ResourceRole::Storage => {
                let g = self.require_group(group)?;
                vec![
                    "storage",
                    "account",
                    "list",
                    "--resource-group",
                    g,
                    "--output",
                    "json",
                ]
            }
            ResourceRole::ContainerRegistry => {
                let g = self.require_group(group)?;
                vec!["acr", "list", "--resource-group", g, "--output", "json"]
            }
            ResourceRole::KeyVault => {
                let g = self.require_group(group)?;
                vec!["keyvault", "list", "--resource-group", g, "--output", "json"]
            }
            ResourceRole::AppInsights => {
                let g = self.require_group(group)?;
                vec![
                    "monitor",
                    "app-insights",
                    "component",
                    "show",
                    "--resource-group",
                    g,
                    "--output",
                    "json",
                ]
            }
            ResourceRole::FunctionApp => {
                let g = self.require_group(group)?;
                vec!["functionapp", "list", "--resource-group", g, "--output", "json"]
            }
            ResourceRole::WebApp => {
                let g = self.require_group(group)?;
                vec!["webapp", "list", "--resource-group", g, "--output", "json"]
            }
            ResourceRole::AppRegistration => vec!["ad", "app", "list", "--output", "json"],
            // No scoped listing exists for directory groups; discovery is
            // gated off for them in the reconciler as well.
            ResourceRole::AdminGroup | ResourceRole::EmployeeGroup => return Ok(Vec::new()),
        };

        let value = match self.run_json(&args, FailureContext::default()) {
            Ok(value) => value,
            Err(AppError::CloudResourceNotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let items = value.as_array().cloned().unwrap_or_else(|| vec![value]);
        items.iter().map(|item| parse_record(role, item)).collect()
    }

    fn create(
        &self,
        role: ResourceRole,
        name: &str,
        group: Option<&str>,
        location: &str,
    ) -> Result<ResourceRecord, AppError> {
        let args: Vec<&str> = match role {
            ResourceRole::ResourceGroup => vec![
                "group", "create", "--name", name, "--location", location, "--output", "json",
            ],
            ResourceRole::Storage => {
                let g = self.require_group(group)?;
                vec![
                    "storage",
                    "account",
                    "create",
                    "--name",
                    name,
                    "--resource-group",
                    g,
                    "--location",
                    location,
                    "--sku",
                    "Standard_LRS",
                    "--output",
                    "json",
                ]
            }
            ResourceRole::ContainerRegistry => {
                let g = self.require_group(group)?;
                vec![
                    "acr",
                    "create",
                    "--name",
                    name,
                    "--resource-group",
                    g,
                    "--sku",
                    "Basic",
                    "--output",
                    "json",
                ]
            }
            ResourceRole::KeyVault => {
                let g = self.require_group(group)?;
                vec![
                    "keyvault",
                    "create",
                    "--name",
                    name,
                    "--resource-group",
                    g,
                    "--location",
                    location,
                    "--output",
                    "json",
                ]
            }
            ResourceRole::AppInsights => {
                let g = self.require_group(group)?;
                vec![
                    "monitor",
                    "app-insights",
                    "component",
                    "create",
                    "--app",
                    name,
                    "--resource-group",
                    g,
                    "--location",
                    location,
                    "--kind",
                    "web",
                    "--output",
                    "json",
                ]
            }
            // Not creatable by the reconciler; surface the manual playbook.
            _ => {
                return Err(AppError::ResourceMissing {
                    role,
                    name: name.to_string(),
                    group: group.map(str::to_string),
                });
            }
        };

        let value = self.run_json(&args, FailureContext::resource(role, name))?;
        parse_record(role, &value)
    }

    fn get_app_settings(
        &self,
        app: &str,
        group: &str,
    ) -> Result<BTreeMap<String, String>, AppError> {
        let value = self.run_json(
            &[
                "functionapp",
                "config",
                "appsettings",
                "list",
                "--name",
                app,
                "--resource-group",
                group,
                "--output",
                "json",
            ],
            FailureContext::named(app),
        )?;

        let mut settings = BTreeMap::new();
        for item in value.as_array().into_iter().flatten() {
            if let (Some(name), Some(value)) = (item["name"].as_str(), item["value"].as_str()) {
                settings.insert(name.to_string(), value.to_string());
            }
        }
        Ok(settings)
    }

    fn set_app_settings(
        &self,
        app: &str,
        group: &str,
        settings: &[(String, String)],
    ) -> Result<(), AppError> {
        let mut args = vec![
            "functionapp".to_string(),
            "config".to_string(),
            "appsettings".to_string(),
            "set".to_string(),
            "--name".to_string(),
            app.to_string(),
            "--resource-group".to_string(),
            group.to_string(),
            "--settings".to_string(),
        ];
        for (key, value) in settings {
            args.push(format!("{}={}", key, value));
        }
        let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&borrowed, FailureContext::named(app))?;
        Ok(())
    }

    fn get_secret(&self, vault: &str, name: &str) -> Result<String, AppError> {
        self.run(
            &[
                "keyvault",
                "secret",
                "show",
                "--vault-name",
                vault,
                "--name",
                name,
                "--query",
                "value",
                "--output",
                "tsv",
            ],
            FailureContext::named(name),
        )
    }

    fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<(), AppError> {
        self.run(
            &[
                "keyvault",
                "secret",
                "set",
                "--vault-name",
                vault,
                "--name",
                name,
                "--value",
                value,
                "--output",
                "none",
            ],
            FailureContext::named(name),
        )?;
        Ok(())
    }

    fn principal_id(&self, app: &str, group: &str) -> Result<String, AppError> {
        let principal = self.run(
            &[
                "functionapp",
                "identity",
                "show",
                "--name",
                app,
                "--resource-group",
                group,
                "--query",
                "principalId",
                "--output",
                "tsv",
            ],
            FailureContext::named(app),
        )?;
        if principal.is_empty() {
            return Err(AppError::IdentityMissing { app: app.to_string() });
        }
        Ok(principal)
    }

    fn list_role_assignments(&self, assignee: &str, scope: &str) -> Result<Vec<String>, AppError> {
        let value = self.run_json(
            &[
                "role",
                "assignment",
                "list",
                "--assignee",
                assignee,
                "--scope",
                scope,
                "--output",
                "json",
            ],
            FailureContext::named(assignee),
        )?;
        let roles = value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|item| item["roleDefinitionName"].as_str().map(str::to_string))
            .collect();
        Ok(roles)
    }

    fn create_role_assignment(
        &self,
        assignee: &str,
        role_name: &str,
        scope: &str,
    ) -> Result<(), AppError> {
        self.run(
            &[
                "role",
                "assignment",
                "create",
                "--assignee",
                assignee,
                "--role",
                role_name,
                "--scope",
                scope,
                "--output",
                "none",
            ],
            FailureContext::named(assignee),
        )?;
        Ok(())
    }

    fn list_registry_tags(
        &self,
        registry: &str,
        repository: &str,
    ) -> Result<Vec<String>, AppError> {
        let value = self.run_json(
            &[
                "acr",
                "repository",
                "show-tags",
                "--name",
                registry,
                "--repository",
                repository,
                "--output",
                "json",
            ],
            FailureContext::named(repository),
        )?;
        let tags = value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|tag| tag.as_str().map(str::to_string))
            .collect();
        Ok(tags)
    }

    fn delete_group(&self, group: &str) -> Result<(), AppError> {
        self.run(
            &["group", "delete", "--name", group, "--yes", "--output", "none"],
            FailureContext::resource(ResourceRole::ResourceGroup, group),
        )?;
        Ok(())
    }

    fn purge_vault(&self, name: &str) -> Result<(), AppError> {
        self.run(
            &["keyvault", "purge", "--name", name, "--output", "none"],
            FailureContext::resource(ResourceRole::KeyVault, name),
        )?;
        Ok(())
    }
}
