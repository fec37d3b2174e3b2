//! Read-only diagnosis of the deployment: tool, config, and resources.

mod diagnostics;

use url::Url;

use crate::domain::{AppError, ConfigStore, ResourceRole, ToolPolicy};
use crate::ports::ControlPlane;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};

#[derive(Debug, Clone, Copy, Default)]
pub struct DoctorOptions {
    /// Treat warnings as failures.
    pub strict: bool,
}

#[derive(Debug, Clone)]
pub struct DoctorOutcome {
    pub errors: usize,
    pub warnings: usize,
    pub exit_code: i32,
}

/// Run every check without mutating anything — neither the cloud nor the
/// config file.
pub fn execute<C: ControlPlane>(
    cloud: &C,
    config: &ConfigStore,
    policy: &ToolPolicy,
    options: DoctorOptions,
) -> Result<DoctorOutcome, AppError> {
    let mut diagnostics = Diagnostics::default();

    let tool_ok = tool_check(cloud, &mut diagnostics);
    url_checks(config, &mut diagnostics);

    if tool_ok {
        resource_checks(cloud, config, policy, &mut diagnostics);
        image_tag_check(cloud, config, &mut diagnostics);
    }

    diagnostics.emit();

    let errors = diagnostics.error_count();
    let warnings = diagnostics.warning_count();
    let exit_code = if errors > 0 {
        1
    } else if warnings > 0 && options.strict {
        2
    } else {
        0
    };

    if errors == 0 && warnings == 0 {
        println!("All checks passed.");
    } else if errors == 0 && !options.strict {
        eprintln!("Check completed with {} warning(s).", warnings);
    } else {
        eprintln!("Check failed: {} error(s), {} warning(s) found.", errors, warnings);
    }

    Ok(DoctorOutcome { errors, warnings, exit_code })
}

fn tool_check<C: ControlPlane>(cloud: &C, diagnostics: &mut Diagnostics) -> bool {
    match cloud.tool_version() {
        Ok(_) => true,
        Err(AppError::ToolMissing { tool }) => {
            diagnostics.push_error("az", format!("'{}' is not installed or not on PATH", tool));
            false
        }
        Err(AppError::NotLoggedIn) => {
            diagnostics.push_error("az", "no active session; run `az login`");
            false
        }
        Err(e) => {
            diagnostics.push_error("az", e.to_string());
            false
        }
    }
}

fn url_checks(config: &ConfigStore, diagnostics: &mut Diagnostics) {
    for (key, value) in config.entries() {
        if !key.ends_with("_URL") || value.is_empty() {
            continue;
        }
        if let Err(e) = Url::parse(value) {
            diagnostics.push_error(key, format!("'{}' is not a valid URL: {}", value, e));
        }
    }
}

fn resource_checks<C: ControlPlane>(
    cloud: &C,
    config: &ConfigStore,
    policy: &ToolPolicy,
    diagnostics: &mut Diagnostics,
) {
    let group = config.get(ResourceRole::ResourceGroup.config_key());

    for role in ResourceRole::ALL {
        let key = role.config_key();
        let name = config.get(key);
        if name.is_empty() {
            diagnostics.push_warning(key, "not configured");
            continue;
        }
        if role.group_scoped() && group.is_empty() {
            diagnostics.push_warning(key, "cannot probe without RESOURCE_GROUP");
            continue;
        }

        let scope = role.group_scoped().then_some(group);
        match cloud.probe(role, name, scope) {
            Ok(Some(record)) => {
                if record.name != name {
                    diagnostics.push_warning(
                        key,
                        format!(
                            "configured '{}' but the provider reports '{}'; run `azup provision` to correct it",
                            name, record.name
                        ),
                    );
                }
            }
            Ok(None) => {
                let hint = if role.supports_discovery() {
                    let pattern = policy.detect_pattern(role);
                    match pattern {
                        Some(p) => format!(
                            "{} '{}' not found; `azup provision` will auto-detect by '{}'",
                            role, name, p
                        ),
                        None => format!("{} '{}' not found", role, name),
                    }
                } else {
                    format!("{} '{}' not found", role, name)
                };
                diagnostics.push_error(key, hint);
            }
            Err(AppError::FeatureUnavailable { command }) => {
                diagnostics.push_warning(key, format!("probe unavailable here: {}", command));
            }
            Err(e) => diagnostics.push_error(key, e.to_string()),
        }
    }
}

fn image_tag_check<C: ControlPlane>(
    cloud: &C,
    config: &ConfigStore,
    diagnostics: &mut Diagnostics,
) {
    let registry = config.get("ACR_NAME");
    let repository = config.get("IMAGE_REPOSITORY");
    let tag = config.get("IMAGE_TAG");
    if registry.is_empty() || repository.is_empty() || tag.is_empty() {
        return;
    }

    match cloud.list_registry_tags(registry, repository) {
        Ok(tags) if tags.iter().any(|t| t == tag) => {}
        Ok(_) => {
            diagnostics.push_error(
                "IMAGE_TAG",
                format!("tag '{}' not found in {}/{}", tag, registry, repository),
            );
        }
        Err(e) => diagnostics.push_warning("IMAGE_TAG", format!("could not list tags: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeControlPlane;
    use std::path::PathBuf;

    fn store(content: &str) -> ConfigStore {
        ConfigStore::parse(PathBuf::from("deployment-config.env"), content).unwrap()
    }

    #[test]
    fn all_green_when_everything_resolves() {
        let cloud = FakeControlPlane::new()
            .with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg")
            .with_resource(ResourceRole::FunctionApp, "pa-api", "/fa");
        let config = store("RESOURCE_GROUP=pa-rg\nFUNCTION_APP_NAME=pa-api\n");

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions::default()).unwrap();

        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.exit_code, 0);
        // Unconfigured keys are warnings, not errors.
        assert!(outcome.warnings > 0);
    }

    #[test]
    fn missing_resource_is_an_error_with_exit_one() {
        let cloud =
            FakeControlPlane::new().with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg");
        let config = store("RESOURCE_GROUP=pa-rg\nFUNCTION_APP_NAME=pa-api\n");

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions::default()).unwrap();

        assert!(outcome.errors >= 1);
        assert_eq!(outcome.exit_code, 1);
    }

    #[test]
    fn strict_turns_warnings_into_exit_two() {
        let cloud =
            FakeControlPlane::new().with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg");
        let config = store("RESOURCE_GROUP=pa-rg\n");

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions { strict: true })
                .unwrap();

        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.exit_code, 2);
    }

    #[test]
    fn invalid_url_is_flagged() {
        let cloud =
            FakeControlPlane::new().with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg");
        let config = store("RESOURCE_GROUP=pa-rg\nSHAREPOINT_SITE_URL=not a url\n");

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions::default()).unwrap();

        assert_eq!(outcome.errors, 1);
    }

    #[test]
    fn image_tag_must_exist_in_the_registry() {
        let cloud = FakeControlPlane::new()
            .with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg")
            .with_resource(ResourceRole::ContainerRegistry, "paacr", "/acr")
            .with_registry_tags(&["v11", "v12"]);
        let config = store(
            "RESOURCE_GROUP=pa-rg\nACR_NAME=paacr\nIMAGE_REPOSITORY=backend\nIMAGE_TAG=v13\n",
        );

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions::default()).unwrap();

        assert_eq!(outcome.errors, 1);
    }

    #[test]
    fn name_drift_is_a_warning_not_an_error() {
        let cloud = FakeControlPlane::new()
            .with_resource(ResourceRole::ResourceGroup, "pa-rg", "/rg")
            .with_canonical(ResourceRole::Storage, "pastorage", "pastorage001", "/st");
        let config = store("RESOURCE_GROUP=pa-rg\nSTORAGE_ACCOUNT_NAME=pastorage\n");

        let outcome =
            execute(&cloud, &config, &ToolPolicy::default(), DoctorOptions::default()).unwrap();

        assert_eq!(outcome.errors, 0);
        assert!(outcome.warnings >= 1);
    }
}
