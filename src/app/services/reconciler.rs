//! The probe → auto-detect → create-or-abort ladder.
//!
//! Brings one config-named resource into a known-good state, correcting the
//! config when the configured name has drifted from reality.

use crate::domain::{
    AppError, ConfigStore, ManagedResourceReference, ResourceRecord, ResourceRole, ResourceState,
    ValuePolicy,
};
use crate::ports::{ControlPlane, OperatorPrompt};

/// What to do when neither probe nor discovery finds the resource.
#[derive(Debug, Clone, Copy)]
pub enum MissingAction<'a> {
    /// Create it (creatable roles only), tolerating an "already exists" race.
    Create { location: &'a str },
    /// Surface the manual playbook and stop.
    Abort,
}

/// One resource's reconciliation inputs.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileRequest<'a> {
    pub role: ResourceRole,
    /// Parent resource group, for group-scoped roles.
    pub group: Option<&'a str>,
    /// Preferred-substring tie-break for discovery.
    pub prefer: Option<&'a str>,
    /// Policy when the config value is empty.
    pub value_policy: ValuePolicy,
    pub on_missing: MissingAction<'a>,
    /// Per-invocation name override (CLI flag); never persisted.
    pub override_name: Option<&'a str>,
}

/// Drives reconciliation against the control plane, mutating the config
/// store in memory when a corrected name is discovered. Persisting the store
/// stays with the caller so one run writes the file once.
pub struct Reconciler<'a, C: ControlPlane, P: OperatorPrompt> {
    cloud: &'a C,
    prompt: &'a P,
    config: &'a mut ConfigStore,
    warnings: Vec<String>,
    created: bool,
}

impl<'a, C: ControlPlane, P: OperatorPrompt> Reconciler<'a, C, P> {
    pub fn new(cloud: &'a C, prompt: &'a P, config: &'a mut ConfigStore) -> Self {
        Self { cloud, prompt, config, warnings: Vec::new(), created: false }
    }

    /// Heuristic choices made along the way, for the caller to surface.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Whether this reconciliation actually created the resource.
    pub fn did_create(&self) -> bool {
        self.created
    }

    pub fn reconcile(
        &mut self,
        request: &ReconcileRequest<'_>,
    ) -> Result<ManagedResourceReference, AppError> {
        let key = request.role.config_key();
        let mut candidate = match request.override_name {
            Some(name) => name.to_string(),
            None => self.config.get(key).to_string(),
        };

        if candidate.is_empty() {
            match request.value_policy {
                ValuePolicy::Prompt => {
                    let question = format!("{} name ({})", request.role, key);
                    match self.prompt.input(&question)? {
                        Some(value) => {
                            self.config.set(key, &value);
                            candidate = value;
                        }
                        None => return Err(AppError::ValueMissing { key: key.to_string() }),
                    }
                }
                ValuePolicy::AutoDetect => {}
                ValuePolicy::Fail => {
                    return Err(AppError::ValueMissing { key: key.to_string() });
                }
            }
        }

        if !candidate.is_empty() {
            if let Some(record) = self.cloud.probe(request.role, &candidate, request.group)? {
                if record.name != candidate && request.override_name.is_none() {
                    self.config.set(key, &record.name);
                }
                return Ok(ManagedResourceReference {
                    role: request.role,
                    name: record.name,
                    id: Some(record.id),
                    state: ResourceState::Verified,
                });
            }
        }

        if request.role.supports_discovery() {
            let found = self.cloud.list(request.role, request.group)?;
            match pick(&found, request.prefer) {
                Pick::One(record) => {
                    self.config.set(key, &record.name);
                    return Ok(ManagedResourceReference {
                        role: request.role,
                        name: record.name.clone(),
                        id: Some(record.id.clone()),
                        state: ResourceState::AutoDetected,
                    });
                }
                Pick::FirstOfMany { record, matched } => {
                    self.warnings.push(format!(
                        "{}: {} candidates matched '{}'; took '{}' (provider listing order)",
                        request.role,
                        matched,
                        request.prefer.unwrap_or_default(),
                        record.name
                    ));
                    self.config.set(key, &record.name);
                    return Ok(ManagedResourceReference {
                        role: request.role,
                        name: record.name.clone(),
                        id: Some(record.id.clone()),
                        state: ResourceState::AutoDetected,
                    });
                }
                Pick::Ambiguous(candidates) => {
                    return Err(AppError::AmbiguousAutoDetect { role: request.role, candidates });
                }
                Pick::None => {}
            }
        }

        match request.on_missing {
            MissingAction::Create { location } if request.role.creatable() => {
                if candidate.is_empty() {
                    return Err(AppError::ValueMissing { key: key.to_string() });
                }
                let record = self.create_with_recovery(request, &candidate, location)?;
                if record.name != candidate && request.override_name.is_none() {
                    self.config.set(key, &record.name);
                }
                Ok(ManagedResourceReference {
                    role: request.role,
                    name: record.name,
                    id: Some(record.id),
                    state: ResourceState::Verified,
                })
            }
            _ => Err(AppError::ResourceMissing {
                role: request.role,
                name: candidate,
                group: request.group.map(str::to_string),
            }),
        }
    }

    fn create_with_recovery(
        &mut self,
        request: &ReconcileRequest<'_>,
        name: &str,
        location: &str,
    ) -> Result<ResourceRecord, AppError> {
        match self.cloud.create(request.role, name, request.group, location) {
            Ok(record) => {
                self.created = true;
                Ok(record)
            }
            // Lost the creation race; the resource is there, fetch it.
            Err(AppError::ResourceAlreadyExists { .. }) => self
                .cloud
                .probe(request.role, name, request.group)?
                .ok_or_else(|| AppError::ResourceMissing {
                    role: request.role,
                    name: name.to_string(),
                    group: request.group.map(str::to_string),
                }),
            // Half-finished teardown left the vault soft-deleted.
            Err(AppError::VaultSoftDeleted { name: vault }) => {
                self.warnings.push(format!(
                    "key vault '{}' was soft-deleted by an earlier run; purging and recreating",
                    vault
                ));
                self.cloud.purge_vault(&vault)?;
                let record = self.cloud.create(request.role, name, request.group, location)?;
                self.created = true;
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }
}

enum Pick<'r> {
    None,
    One(&'r ResourceRecord),
    FirstOfMany { record: &'r ResourceRecord, matched: usize },
    Ambiguous(Vec<String>),
}

/// Tie-break for discovery results. A single candidate is taken as-is; with
/// several, the preferred substring decides. Several matches take the first
/// in listing order (flagged as a heuristic); zero matches refuse to guess.
fn pick<'r>(records: &'r [ResourceRecord], prefer: Option<&str>) -> Pick<'r> {
    match records {
        [] => Pick::None,
        [only] => Pick::One(only),
        _ => {
            let names = || records.iter().map(|r| r.name.clone()).collect();
            let Some(pattern) = prefer else {
                return Pick::Ambiguous(names());
            };
            let matched: Vec<&'r ResourceRecord> =
                records.iter().filter(|r| r.name.contains(pattern)).collect();
            match matched.len() {
                0 => Pick::Ambiguous(names()),
                1 => Pick::One(matched[0]),
                n => Pick::FirstOfMany { record: matched[0], matched: n },
            }
        }
    }
}
