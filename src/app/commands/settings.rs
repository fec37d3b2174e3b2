//! Push config-derived app settings to the Function App, idempotently.

use crate::app::services::reconciler::{MissingAction, ReconcileRequest, Reconciler};
use crate::domain::{AppError, ConfigStore, PropagationEvent, ResourceRole, ToolPolicy};
use crate::ports::{ControlPlane, OperatorPrompt, Waiter};

/// Config keys mirrored into the Function App's application settings.
pub const PUSHED_KEYS: [&str; 5] =
    ["TENANT_ID", "APP_CLIENT_ID", "SHAREPOINT_SITE_URL", "SHAREPOINT_SITE_ID", "CORS_ORIGINS"];

#[derive(Debug, Clone, Default)]
pub struct SettingsPushReport {
    pub app: String,
    pub pushed: Vec<String>,
    pub skipped: Vec<String>,
}

pub fn push<C: ControlPlane, P: OperatorPrompt, W: Waiter>(
    cloud: &C,
    prompt: &P,
    waiter: &W,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
) -> Result<SettingsPushReport, AppError> {
    let group = config.get(ResourceRole::ResourceGroup.config_key()).to_string();
    if group.is_empty() {
        return Err(AppError::ValueMissing { key: "RESOURCE_GROUP".to_string() });
    }

    let request = ReconcileRequest {
        role: ResourceRole::FunctionApp,
        group: Some(group.as_str()),
        prefer: policy.detect_pattern(ResourceRole::FunctionApp),
        value_policy: policy.value_policy(ResourceRole::FunctionApp),
        on_missing: MissingAction::Abort,
        override_name: None,
    };
    let app = {
        let mut reconciler = Reconciler::new(cloud, prompt, config);
        reconciler.reconcile(&request)?
    };

    let current = cloud.get_app_settings(&app.name, &group)?;

    let mut report = SettingsPushReport { app: app.name.clone(), ..Default::default() };
    let mut changed: Vec<(String, String)> = Vec::new();
    for key in PUSHED_KEYS {
        let value = config.get(key);
        if value.is_empty() {
            continue;
        }
        if current.get(key).map(String::as_str) == Some(value) {
            report.skipped.push(key.to_string());
        } else {
            changed.push((key.to_string(), value.to_string()));
            report.pushed.push(key.to_string());
        }
    }

    if !changed.is_empty() {
        cloud.set_app_settings(&app.name, &group, &changed)?;
        waiter.wait(
            PropagationEvent::ContainerRestart,
            policy.wait_for(PropagationEvent::ContainerRestart),
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeControlPlane, InstantWaiter, ScriptedPrompt};
    use std::path::PathBuf;

    fn store(content: &str) -> ConfigStore {
        ConfigStore::parse(PathBuf::from("deployment-config.env"), content).unwrap()
    }

    fn config_with_settings() -> ConfigStore {
        store(
            "RESOURCE_GROUP=pa-rg\nFUNCTION_APP_NAME=pa-api\nTENANT_ID=t-1\nSHAREPOINT_SITE_URL=https://contoso.sharepoint.com/sites/bids\n",
        )
    }

    #[test]
    fn pushes_only_changed_settings_and_waits_for_restart() {
        let cloud = FakeControlPlane::new()
            .with_resource(ResourceRole::FunctionApp, "pa-api", "/fa")
            .with_app_settings(&[("TENANT_ID", "t-1")]);
        let prompt = ScriptedPrompt::default();
        let waiter = InstantWaiter::default();
        let mut config = config_with_settings();

        let report =
            push(&cloud, &prompt, &waiter, &mut config, &ToolPolicy::default()).unwrap();

        assert_eq!(report.skipped, vec!["TENANT_ID"]);
        assert_eq!(report.pushed, vec!["SHAREPOINT_SITE_URL"]);
        assert_eq!(cloud.set_settings_calls().len(), 1);
        let events: Vec<_> = waiter.events().into_iter().map(|(e, _)| e).collect();
        assert_eq!(events, vec![PropagationEvent::ContainerRestart]);
    }

    #[test]
    fn nothing_to_push_means_no_write_and_no_wait() {
        let cloud = FakeControlPlane::new()
            .with_resource(ResourceRole::FunctionApp, "pa-api", "/fa")
            .with_app_settings(&[
                ("TENANT_ID", "t-1"),
                ("SHAREPOINT_SITE_URL", "https://contoso.sharepoint.com/sites/bids"),
            ]);
        let prompt = ScriptedPrompt::default();
        let waiter = InstantWaiter::default();
        let mut config = config_with_settings();

        let report =
            push(&cloud, &prompt, &waiter, &mut config, &ToolPolicy::default()).unwrap();

        assert!(report.pushed.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(cloud.set_settings_calls().is_empty());
        assert!(waiter.events().is_empty());
    }

    #[test]
    fn requires_a_resource_group() {
        let cloud = FakeControlPlane::new();
        let prompt = ScriptedPrompt::default();
        let waiter = InstantWaiter::default();
        let mut config = store("FUNCTION_APP_NAME=pa-api\n");

        let err =
            push(&cloud, &prompt, &waiter, &mut config, &ToolPolicy::default()).unwrap_err();
        assert!(matches!(err, AppError::ValueMissing { key } if key == "RESOURCE_GROUP"));
    }
}
