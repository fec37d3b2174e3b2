//! CLI adapter.

use chrono::Local;
use clap::{Parser, Subcommand};

use crate::app::api;
use crate::app::commands::doctor::DoctorOptions;
use crate::app::commands::provision::ProvisionOptions;
use crate::app::commands::teardown::TeardownOptions;
use crate::domain::{AppError, ResourceState, config_store};

#[derive(Parser)]
#[command(name = "azup")]
#[command(version)]
#[command(
    about = "Reconcile an Azure deployment against its deployment-config.env",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every configured resource, correcting drifted names
    #[clap(visible_alias = "p")]
    Provision {
        /// Create missing resources instead of aborting
        #[arg(long)]
        create: bool,
        /// Override RESOURCE_GROUP for this run only
        #[arg(long)]
        resource_group: Option<String>,
        /// Override FUNCTION_APP_NAME for this run only
        #[arg(long)]
        function_app: Option<String>,
        /// Override WEB_APP_NAME for this run only
        #[arg(long)]
        web_app: Option<String>,
    },
    /// Diagnose tool, config, and resource state without changing anything
    Doctor {
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
    /// Read and write deployment-config.env
    #[clap(visible_alias = "c")]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Key Vault secrets
    Secret {
        #[command(subcommand)]
        command: SecretCommands,
    },
    /// Application settings on the Function App
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Ensure the Function App identity can read vault secrets
    GrantAccess,
    /// Delete the resource group; directory objects are left alone
    Teardown {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Also purge the soft-deleted vault
        #[arg(long)]
        purge_vault: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a commented starter file in the current directory
    Init,
    /// Print every key and value
    List,
    /// Print one value (empty when not configured)
    Get { key: String },
    /// Set a value, preserving the rest of the file byte-for-byte
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum SecretCommands {
    /// Store a secret in the vault
    Set { name: String, value: String },
    /// Print a secret's value
    Get { name: String },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Push config-derived settings, skipping ones already current
    Push,
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    let result: Result<i32, AppError> = match cli.command {
        Commands::Provision { create, resource_group, function_app, web_app } => {
            let options = ProvisionOptions { create, resource_group, function_app, web_app };
            run_provision(&options).map(|_| 0)
        }
        Commands::Doctor { strict } => {
            api::doctor(DoctorOptions { strict }).map(|outcome| outcome.exit_code)
        }
        Commands::Config { command } => run_config(command).map(|_| 0),
        Commands::Secret { command } => run_secret(command).map(|_| 0),
        Commands::Settings { command } => match command {
            SettingsCommands::Push => run_settings_push().map(|_| 0),
        },
        Commands::GrantAccess => run_grant_access().map(|_| 0),
        Commands::Teardown { yes, purge_vault } => {
            run_teardown(TeardownOptions { yes, purge_vault })
        }
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(remediation) = e.remediation() {
                eprintln!();
                eprint!("{}", remediation);
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn run_provision(options: &ProvisionOptions) -> Result<(), AppError> {
    println!("azup provision — {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let report = api::provision(options)?;

    for reference in &report.references {
        match reference.state {
            ResourceState::Verified => println!("✅ {}: {}", reference.role, reference.name),
            ResourceState::AutoDetected => {
                println!("✅ {}: {} (auto-detected)", reference.role, reference.name);
            }
            _ => {}
        }
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
    if report.persisted {
        println!("✅ Updated {}", config_store::FILE_NAME);
    }
    Ok(())
}

fn run_config(command: ConfigCommands) -> Result<(), AppError> {
    match command {
        ConfigCommands::Init => {
            let path = api::config_init()?;
            println!("✅ Created {}", path.display());
        }
        ConfigCommands::List => {
            for (key, value) in api::config_list()? {
                println!("{}={}", key, value);
            }
        }
        ConfigCommands::Get { key } => {
            println!("{}", api::config_get(&key)?);
        }
        ConfigCommands::Set { key, value } => {
            let path = api::config_set(&key, &value)?;
            println!("✅ Set {} in {}", key, path.display());
        }
    }
    Ok(())
}

fn run_secret(command: SecretCommands) -> Result<(), AppError> {
    match command {
        SecretCommands::Set { name, value } => {
            let persisted = api::secret_set(&name, &value)?;
            println!("✅ Stored secret '{}'", name);
            if persisted {
                println!("✅ Updated {}", config_store::FILE_NAME);
            }
        }
        SecretCommands::Get { name } => {
            println!("{}", api::secret_get(&name)?);
        }
    }
    Ok(())
}

fn run_settings_push() -> Result<(), AppError> {
    let (report, persisted) = api::settings_push()?;

    if report.pushed.is_empty() {
        println!("✅ App settings on '{}' already current", report.app);
    } else {
        println!("✅ Pushed {} setting(s) to '{}'", report.pushed.len(), report.app);
        for key in &report.pushed {
            println!("  • {}", key);
        }
    }
    if !report.skipped.is_empty() {
        println!("  ({} unchanged)", report.skipped.len());
    }
    if persisted {
        println!("✅ Updated {}", config_store::FILE_NAME);
    }
    Ok(())
}

fn run_grant_access() -> Result<(), AppError> {
    let (report, persisted) = api::grant_access()?;

    if report.assigned {
        println!("✅ Granted vault access on '{}' to principal {}", report.vault, report.principal);
    } else {
        println!("✅ Principal {} already has access to '{}'", report.principal, report.vault);
    }
    if persisted {
        println!("✅ Updated {}", config_store::FILE_NAME);
    }
    Ok(())
}

fn run_teardown(options: TeardownOptions) -> Result<i32, AppError> {
    println!("azup teardown — {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let report = api::teardown(options)?;

    if report.cancelled {
        println!("Aborted.");
        return Ok(0);
    }
    if let Some(group) = &report.deleted_group {
        println!("✅ Deleted resource group '{}'", group);
    }
    if let Some(vault) = &report.purged_vault {
        println!("✅ Purged key vault '{}'", vault);
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
    Ok(0)
}
