//! Filesystem adapter for the deployment config and the policy file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::config_store::FILE_NAME;
use crate::domain::policy::{POLICY_FILE_NAME, parse_policy_content};
use crate::domain::{AppError, ConfigStore, ToolPolicy};

/// Starter content written by `azup config init`.
const STARTER: &str = "\
# Deployment parameters shared by every azup command.
# Names discovered at provision time are written back into this file.

SUBSCRIPTION_ID=
TENANT_ID=
RESOURCE_GROUP=
LOCATION=uksouth

STORAGE_ACCOUNT_NAME=
ACR_NAME=
IMAGE_REPOSITORY=backend
IMAGE_TAG=latest
KEY_VAULT_NAME=
APP_INSIGHTS_NAME=
FUNCTION_APP_NAME=
WEB_APP_NAME=

# Directory objects; these outlive the resource group.
APP_REGISTRATION_NAME=
APP_CLIENT_ID=
ADMIN_GROUP_ID=
EMPLOYEE_GROUP_ID=

SHAREPOINT_SITE_URL=
SHAREPOINT_SITE_ID=
CORS_ORIGINS=
";

/// Candidate locations for the config file, tried in order: the working
/// directory first, then its parent (scripts are often run from a subdir).
pub fn candidate_paths(start: &Path) -> Vec<PathBuf> {
    vec![start.join(FILE_NAME), start.join("..").join(FILE_NAME)]
}

/// Locate and parse the deployment config.
pub fn load(start: &Path) -> Result<ConfigStore, AppError> {
    let tried = candidate_paths(start);
    for path in &tried {
        if path.is_file() {
            let content = fs::read_to_string(path)?;
            return ConfigStore::parse(path.clone(), &content);
        }
    }
    Err(AppError::ConfigMissing { tried })
}

/// Rewrite the whole file from the store's rendered content.
///
/// Whole-file rewrite, last writer wins; concurrent invocations are
/// unsupported.
pub fn save(store: &mut ConfigStore) -> Result<(), AppError> {
    fs::write(store.path(), store.render())?;
    store.mark_clean();
    Ok(())
}

/// Load the optional `azup.toml` next to the config file. Absence means
/// defaults.
pub fn load_policy(config_path: &Path) -> Result<ToolPolicy, AppError> {
    let dir = config_path.parent().unwrap_or(Path::new("."));
    let policy_path = dir.join(POLICY_FILE_NAME);
    if !policy_path.is_file() {
        return Ok(ToolPolicy::default());
    }
    let content = fs::read_to_string(&policy_path)?;
    parse_policy_content(&content)
}

/// Write a commented starter config, refusing to overwrite.
pub fn init(dir: &Path) -> Result<PathBuf, AppError> {
    let path = dir.join(FILE_NAME);
    if path.exists() {
        return Err(AppError::ConfigExists { path });
    }
    fs::write(&path, STARTER)?;
    Ok(path)
}
