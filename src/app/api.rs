//! Process-level wiring: adapters constructed here, commands stay
//! port-generic.

use std::env;
use std::path::PathBuf;

use crate::adapters::{AzureCliAdapter, ConsolePrompt, ThreadWaiter, config_file};
use crate::app::commands::{doctor, grant, provision, secret, settings, teardown};
use crate::domain::{AppError, ConfigStore, ToolPolicy};

fn load() -> Result<(ConfigStore, ToolPolicy), AppError> {
    let cwd = env::current_dir()?;
    let config = config_file::load(&cwd)?;
    let policy = config_file::load_policy(config.path())?;
    Ok((config, policy))
}

fn persist_if_dirty(config: &mut ConfigStore) -> Result<bool, AppError> {
    if config.is_dirty() {
        config_file::save(config)?;
        return Ok(true);
    }
    Ok(false)
}

pub fn provision(
    options: &provision::ProvisionOptions,
) -> Result<provision::ProvisionReport, AppError> {
    let (mut config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();
    let waiter = ThreadWaiter::new();

    let mut report = provision::execute(&cloud, &prompt, &waiter, &mut config, &policy, options)?;
    report.persisted = persist_if_dirty(&mut config)?;
    Ok(report)
}

pub fn doctor(options: doctor::DoctorOptions) -> Result<doctor::DoctorOutcome, AppError> {
    let (config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    doctor::execute(&cloud, &config, &policy, options)
}

pub fn config_init() -> Result<PathBuf, AppError> {
    let cwd = env::current_dir()?;
    config_file::init(&cwd)
}

pub fn config_get(key: &str) -> Result<String, AppError> {
    let (config, _) = load()?;
    Ok(config.get(key).to_string())
}

pub fn config_set(key: &str, value: &str) -> Result<PathBuf, AppError> {
    let (mut config, _) = load()?;
    config.set(key, value);
    config_file::save(&mut config)?;
    Ok(config.path().to_path_buf())
}

pub fn config_list() -> Result<Vec<(String, String)>, AppError> {
    let (config, _) = load()?;
    Ok(config.entries().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

/// Returns whether an auto-detected vault name was written back.
pub fn secret_set(name: &str, value: &str) -> Result<bool, AppError> {
    let (mut config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();

    secret::set(&cloud, &prompt, &mut config, &policy, name, value)?;
    persist_if_dirty(&mut config)
}

pub fn secret_get(name: &str) -> Result<String, AppError> {
    let (mut config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();

    let value = secret::get(&cloud, &prompt, &mut config, &policy, name)?;
    persist_if_dirty(&mut config)?;
    Ok(value)
}

pub fn settings_push() -> Result<(settings::SettingsPushReport, bool), AppError> {
    let (mut config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();
    let waiter = ThreadWaiter::new();

    let report = settings::push(&cloud, &prompt, &waiter, &mut config, &policy)?;
    let persisted = persist_if_dirty(&mut config)?;
    Ok((report, persisted))
}

pub fn grant_access() -> Result<(grant::GrantReport, bool), AppError> {
    let (mut config, policy) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();
    let waiter = ThreadWaiter::new();

    let report = grant::execute(&cloud, &prompt, &waiter, &mut config, &policy)?;
    let persisted = persist_if_dirty(&mut config)?;
    Ok((report, persisted))
}

pub fn teardown(options: teardown::TeardownOptions) -> Result<teardown::TeardownReport, AppError> {
    let (config, _) = load()?;
    let cloud = AzureCliAdapter::new();
    let prompt = ConsolePrompt::new();
    teardown::execute(&cloud, &prompt, &config, options)
}
