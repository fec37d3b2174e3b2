//! Scripted in-memory control plane for unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::domain::{AppError, ResourceRecord, ResourceRole};
use crate::ports::ControlPlane;

#[derive(Default)]
pub struct FakeControlPlane {
    records: RefCell<BTreeMap<(ResourceRole, String), ResourceRecord>>,
    listings: RefCell<BTreeMap<ResourceRole, Vec<ResourceRecord>>>,
    hidden: RefCell<BTreeMap<String, usize>>,
    next_create_error: RefCell<Option<AppError>>,
    create_calls: RefCell<Vec<(ResourceRole, String)>>,
    list_calls: RefCell<usize>,
    purged_vaults: RefCell<Vec<String>>,
    deleted_groups: RefCell<Vec<String>>,
    secrets: RefCell<BTreeMap<(String, String), String>>,
    app_settings: RefCell<BTreeMap<String, String>>,
    set_settings_calls: RefCell<Vec<Vec<(String, String)>>>,
    role_assignments: RefCell<Vec<(String, String, String)>>,
    registry_tags: RefCell<Vec<String>>,
    principal: RefCell<Option<String>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resource the probe will find under `name`.
    pub fn with_resource(self, role: ResourceRole, name: &str, id: &str) -> Self {
        self.records.borrow_mut().insert(
            (role, name.to_string()),
            ResourceRecord { name: name.to_string(), id: id.to_string() },
        );
        self
    }

    /// A resource probed by `alias` but reporting `canonical` as its name.
    pub fn with_canonical(self, role: ResourceRole, alias: &str, canonical: &str, id: &str) -> Self {
        self.records.borrow_mut().insert(
            (role, alias.to_string()),
            ResourceRecord { name: canonical.to_string(), id: id.to_string() },
        );
        self
    }

    /// Discovery results for a role, in listing order.
    pub fn with_listing(self, role: ResourceRole, entries: &[(&str, &str)]) -> Self {
        let records = entries
            .iter()
            .map(|(name, id)| ResourceRecord { name: name.to_string(), id: id.to_string() })
            .collect();
        self.listings.borrow_mut().insert(role, records);
        self
    }

    pub fn with_secret(self, vault: &str, name: &str, value: &str) -> Self {
        self.secrets.borrow_mut().insert((vault.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn with_app_settings(self, entries: &[(&str, &str)]) -> Self {
        let mut settings = self.app_settings.borrow_mut();
        for (key, value) in entries {
            settings.insert(key.to_string(), value.to_string());
        }
        drop(settings);
        self
    }

    pub fn with_principal(self, id: &str) -> Self {
        *self.principal.borrow_mut() = Some(id.to_string());
        self
    }

    pub fn with_role_assignment(self, assignee: &str, role_name: &str, scope: &str) -> Self {
        self.role_assignments.borrow_mut().push((
            assignee.to_string(),
            role_name.to_string(),
            scope.to_string(),
        ));
        self
    }

    pub fn with_registry_tags(self, tags: &[&str]) -> Self {
        *self.registry_tags.borrow_mut() = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Make the next `misses` probes for `name` return nothing.
    pub fn hide_for_probes(&self, name: &str, misses: usize) {
        self.hidden.borrow_mut().insert(name.to_string(), misses);
    }

    pub fn fail_next_create(&self, error: AppError) {
        *self.next_create_error.borrow_mut() = Some(error);
    }

    pub fn create_count(&self, role: ResourceRole) -> usize {
        self.create_calls.borrow().iter().filter(|(r, _)| *r == role).count()
    }

    pub fn list_count(&self) -> usize {
        *self.list_calls.borrow()
    }

    pub fn purged(&self) -> Vec<String> {
        self.purged_vaults.borrow().clone()
    }

    pub fn deleted_groups(&self) -> Vec<String> {
        self.deleted_groups.borrow().clone()
    }

    pub fn secret(&self, vault: &str, name: &str) -> Option<String> {
        self.secrets.borrow().get(&(vault.to_string(), name.to_string())).cloned()
    }

    pub fn set_settings_calls(&self) -> Vec<Vec<(String, String)>> {
        self.set_settings_calls.borrow().clone()
    }

    pub fn role_assignments(&self) -> Vec<(String, String, String)> {
        self.role_assignments.borrow().clone()
    }
}

impl ControlPlane for FakeControlPlane {
    fn tool_version(&self) -> Result<String, AppError> {
        Ok("2.64.0".to_string())
    }

    fn probe(
        &self,
        role: ResourceRole,
        name: &str,
        _group: Option<&str>,
    ) -> Result<Option<ResourceRecord>, AppError> {
        let mut hidden = self.hidden.borrow_mut();
        if let Some(misses) = hidden.get_mut(name) {
            if *misses > 0 {
                *misses -= 1;
                return Ok(None);
            }
        }
        Ok(self.records.borrow().get(&(role, name.to_string())).cloned())
    }

    fn list(
        &self,
        role: ResourceRole,
        _group: Option<&str>,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        *self.list_calls.borrow_mut() += 1;
        Ok(self.listings.borrow().get(&role).cloned().unwrap_or_default())
    }

    fn create(
        &self,
        role: ResourceRole,
        name: &str,
        _group: Option<&str>,
        _location: &str,
    ) -> Result<ResourceRecord, AppError> {
        self.create_calls.borrow_mut().push((role, name.to_string()));
        if let Some(error) = self.next_create_error.borrow_mut().take() {
            return Err(error);
        }
        let record =
            ResourceRecord { name: name.to_string(), id: format!("/created/{}", name) };
        self.records.borrow_mut().insert((role, name.to_string()), record.clone());
        Ok(record)
    }

    fn get_app_settings(
        &self,
        _app: &str,
        _group: &str,
    ) -> Result<BTreeMap<String, String>, AppError> {
        Ok(self.app_settings.borrow().clone())
    }

    fn set_app_settings(
        &self,
        _app: &str,
        _group: &str,
        settings: &[(String, String)],
    ) -> Result<(), AppError> {
        self.set_settings_calls.borrow_mut().push(settings.to_vec());
        let mut current = self.app_settings.borrow_mut();
        for (key, value) in settings {
            current.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn get_secret(&self, vault: &str, name: &str) -> Result<String, AppError> {
        self.secret(vault, name)
            .ok_or_else(|| AppError::CloudResourceNotFound { name: name.to_string() })
    }

    fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<(), AppError> {
        self.secrets
            .borrow_mut()
            .insert((vault.to_string(), name.to_string()), value.to_string());
        Ok(())
    }

    fn principal_id(&self, app: &str, _group: &str) -> Result<String, AppError> {
        self.principal
            .borrow()
            .clone()
            .ok_or_else(|| AppError::IdentityMissing { app: app.to_string() })
    }

    fn list_role_assignments(&self, assignee: &str, scope: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .role_assignments
            .borrow()
            .iter()
            .filter(|(a, _, s)| a == assignee && s == scope)
            .map(|(_, role_name, _)| role_name.clone())
            .collect())
    }

    fn create_role_assignment(
        &self,
        assignee: &str,
        role_name: &str,
        scope: &str,
    ) -> Result<(), AppError> {
        self.role_assignments.borrow_mut().push((
            assignee.to_string(),
            role_name.to_string(),
            scope.to_string(),
        ));
        Ok(())
    }

    fn list_registry_tags(
        &self,
        _registry: &str,
        _repository: &str,
    ) -> Result<Vec<String>, AppError> {
        Ok(self.registry_tags.borrow().clone())
    }

    fn delete_group(&self, group: &str) -> Result<(), AppError> {
        self.deleted_groups.borrow_mut().push(group.to_string());
        Ok(())
    }

    fn purge_vault(&self, name: &str) -> Result<(), AppError> {
        self.purged_vaults.borrow_mut().push(name.to_string());
        Ok(())
    }
}
