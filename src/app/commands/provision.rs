//! Reconcile every managed resource named by the deployment config.

use crate::app::services::reconciler::{MissingAction, ReconcileRequest, Reconciler};
use crate::domain::{
    AppError, ConfigStore, ManagedResourceReference, PropagationEvent, ResourceRole, ToolPolicy,
};
use crate::ports::{ControlPlane, OperatorPrompt, Waiter};

#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// Create missing creatable resources instead of aborting.
    pub create: bool,
    /// Per-invocation overrides; never written back to the config file.
    pub resource_group: Option<String>,
    pub function_app: Option<String>,
    pub web_app: Option<String>,
}

impl ProvisionOptions {
    fn override_for(&self, role: ResourceRole) -> Option<&str> {
        match role {
            ResourceRole::ResourceGroup => self.resource_group.as_deref(),
            ResourceRole::FunctionApp => self.function_app.as_deref(),
            ResourceRole::WebApp => self.web_app.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    pub references: Vec<ManagedResourceReference>,
    pub warnings: Vec<String>,
    /// Set by the caller once corrected names were written back.
    pub persisted: bool,
}

pub fn execute<C: ControlPlane, P: OperatorPrompt, W: Waiter>(
    cloud: &C,
    prompt: &P,
    waiter: &W,
    config: &mut ConfigStore,
    policy: &ToolPolicy,
    options: &ProvisionOptions,
) -> Result<ProvisionReport, AppError> {
    cloud.tool_version()?;

    let allow_create = options.create || policy.reconcile.auto_create;
    let location = config.get("LOCATION").to_string();
    if allow_create && location.is_empty() {
        return Err(AppError::ValueMissing { key: "LOCATION".to_string() });
    }

    let mut report = ProvisionReport::default();

    // The group anchors every scoped probe, so it goes first.
    let group_name = {
        let request = ReconcileRequest {
            role: ResourceRole::ResourceGroup,
            group: None,
            prefer: None,
            value_policy: policy.value_policy(ResourceRole::ResourceGroup),
            on_missing: if allow_create {
                MissingAction::Create { location: &location }
            } else {
                MissingAction::Abort
            },
            override_name: options.override_for(ResourceRole::ResourceGroup),
        };
        let mut reconciler = Reconciler::new(cloud, prompt, config);
        let reference = reconciler.reconcile(&request)?;
        report.warnings.extend(reconciler.take_warnings());
        let name = reference.name.clone();
        report.references.push(reference);
        name
    };

    let mut created_any = false;
    for role in ResourceRole::ALL.into_iter().skip(1) {
        // Freshly created resources need a beat before dependent probes see
        // them (DNS for the app hostnames in particular).
        if created_any && matches!(role, ResourceRole::FunctionApp) {
            waiter.wait(PropagationEvent::Dns, policy.wait_for(PropagationEvent::Dns));
            created_any = false;
        }

        let request = ReconcileRequest {
            role,
            group: role.group_scoped().then_some(group_name.as_str()),
            prefer: policy.detect_pattern(role),
            value_policy: policy.value_policy(role),
            on_missing: if allow_create && role.creatable() {
                MissingAction::Create { location: &location }
            } else {
                MissingAction::Abort
            },
            override_name: options.override_for(role),
        };
        let mut reconciler = Reconciler::new(cloud, prompt, config);
        let reference = reconciler.reconcile(&request)?;
        created_any |= reconciler.did_create();
        report.warnings.extend(reconciler.take_warnings());
        report.references.push(reference);
    }

    Ok(report)
}
