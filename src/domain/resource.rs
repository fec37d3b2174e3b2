//! Managed cloud resources and their reconciliation states.

use std::fmt::{self, Display};

/// Logical role a managed resource plays in the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResourceRole {
    ResourceGroup,
    Storage,
    ContainerRegistry,
    KeyVault,
    AppInsights,
    FunctionApp,
    WebApp,
    AppRegistration,
    AdminGroup,
    EmployeeGroup,
}

impl ResourceRole {
    /// Every role, in the order provisioning reconciles them.
    ///
    /// The resource group comes first because the group-scoped roles need a
    /// verified group to probe against.
    pub const ALL: [ResourceRole; 10] = [
        ResourceRole::ResourceGroup,
        ResourceRole::Storage,
        ResourceRole::ContainerRegistry,
        ResourceRole::KeyVault,
        ResourceRole::AppInsights,
        ResourceRole::FunctionApp,
        ResourceRole::WebApp,
        ResourceRole::AppRegistration,
        ResourceRole::AdminGroup,
        ResourceRole::EmployeeGroup,
    ];

    /// The `deployment-config.env` key holding this role's name or ID.
    pub fn config_key(&self) -> &'static str {
        match self {
            ResourceRole::ResourceGroup => "RESOURCE_GROUP",
            ResourceRole::Storage => "STORAGE_ACCOUNT_NAME",
            ResourceRole::ContainerRegistry => "ACR_NAME",
            ResourceRole::KeyVault => "KEY_VAULT_NAME",
            ResourceRole::AppInsights => "APP_INSIGHTS_NAME",
            ResourceRole::FunctionApp => "FUNCTION_APP_NAME",
            ResourceRole::WebApp => "WEB_APP_NAME",
            ResourceRole::AppRegistration => "APP_REGISTRATION_NAME",
            ResourceRole::AdminGroup => "ADMIN_GROUP_ID",
            ResourceRole::EmployeeGroup => "EMPLOYEE_GROUP_ID",
        }
    }

    /// Whether the resource lives inside the deployment's resource group.
    ///
    /// Directory objects (app registration, security groups) are independent
    /// of the resource group lifecycle and can outlive it.
    pub fn group_scoped(&self) -> bool {
        !matches!(
            self,
            ResourceRole::ResourceGroup
                | ResourceRole::AppRegistration
                | ResourceRole::AdminGroup
                | ResourceRole::EmployeeGroup
        )
    }

    /// Whether a failed probe may fall back to a list-and-filter query.
    ///
    /// Only group-scoped roles have a parent to scope the listing to;
    /// directory objects are never guessed.
    pub fn supports_discovery(&self) -> bool {
        self.group_scoped()
    }

    /// Whether the reconciler may create this resource itself.
    ///
    /// Function and Web Apps need plan/storage wiring the operator must
    /// choose, so they only ever surface a remediation command.
    pub fn creatable(&self) -> bool {
        matches!(
            self,
            ResourceRole::ResourceGroup
                | ResourceRole::Storage
                | ResourceRole::ContainerRegistry
                | ResourceRole::KeyVault
                | ResourceRole::AppInsights
        )
    }

    /// The `az` command an operator runs to create the resource by hand.
    pub fn create_command(&self, name: &str, group: &str) -> String {
        match self {
            ResourceRole::ResourceGroup => {
                format!("az group create --name {} --location <location>", name)
            }
            ResourceRole::Storage => format!(
                "az storage account create --name {} --resource-group {} --sku Standard_LRS",
                name, group
            ),
            ResourceRole::ContainerRegistry => {
                format!("az acr create --name {} --resource-group {} --sku Basic", name, group)
            }
            ResourceRole::KeyVault => {
                format!("az keyvault create --name {} --resource-group {}", name, group)
            }
            ResourceRole::AppInsights => format!(
                "az monitor app-insights component create --app {} --resource-group {}",
                name, group
            ),
            ResourceRole::FunctionApp => format!(
                "az functionapp create --name {} --resource-group {} --storage-account <storage> --consumption-plan-location <location> --runtime python",
                name, group
            ),
            ResourceRole::WebApp => format!(
                "az webapp create --name {} --resource-group {} --plan <app-service-plan>",
                name, group
            ),
            ResourceRole::AppRegistration => {
                format!("az ad app create --display-name {}", name)
            }
            ResourceRole::AdminGroup | ResourceRole::EmployeeGroup => {
                format!("az ad group create --display-name {} --mail-nickname {}", name, name)
            }
        }
    }
}

impl Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceRole::ResourceGroup => "resource group",
            ResourceRole::Storage => "storage account",
            ResourceRole::ContainerRegistry => "container registry",
            ResourceRole::KeyVault => "key vault",
            ResourceRole::AppInsights => "application insights",
            ResourceRole::FunctionApp => "function app",
            ResourceRole::WebApp => "web app",
            ResourceRole::AppRegistration => "app registration",
            ResourceRole::AdminGroup => "admin group",
            ResourceRole::EmployeeGroup => "employee group",
        };
        write!(f, "{}", name)
    }
}

/// Existence state of a managed resource for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Unknown,
    Verified,
    AutoDetected,
    Missing,
}

/// Name and canonical ID of a resource as reported by the control plane.
///
/// For directory groups, `name` carries the object ID since that is what the
/// config file stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub id: String,
}

/// A config-named resource plus what reconciliation learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedResourceReference {
    pub role: ResourceRole,
    pub name: String,
    pub id: Option<String>,
    pub state: ResourceState,
}

impl ManagedResourceReference {
    pub fn unknown(role: ResourceRole, name: &str) -> Self {
        Self { role, name: name.to_string(), id: None, state: ResourceState::Unknown }
    }

    /// Mutating operations require a confirmed resource.
    pub fn usable(&self) -> bool {
        matches!(self.state, ResourceState::Verified | ResourceState::AutoDetected)
    }
}
