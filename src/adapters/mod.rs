//! Adapters binding the ports to the real world: the `az` CLI, the
//! filesystem, the terminal.

pub mod azure_cli;
pub mod config_file;
mod console_prompt;
mod thread_wait;

pub use azure_cli::AzureCliAdapter;
pub use console_prompt::ConsolePrompt;
pub use thread_wait::ThreadWaiter;
