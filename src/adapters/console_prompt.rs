use std::io::{self, ErrorKind};

use dialoguer::{Confirm, Error as DialoguerError, Input};

use crate::domain::AppError;
use crate::ports::OperatorPrompt;

/// Terminal prompt adapter. Ctrl-C/EOF maps to `Ok(None)` so callers can
/// treat cancellation as a decision, not a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }
}

impl OperatorPrompt for ConsolePrompt {
    fn input(&self, question: &str) -> Result<Option<String>, AppError> {
        match Input::<String>::new().with_prompt(question).allow_empty(true).interact_text() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(AppError::Io(io::Error::other(err.to_string()))),
        }
    }

    fn confirm(&self, question: &str) -> Result<Option<bool>, AppError> {
        match Confirm::new().with_prompt(question).default(false).interact_opt() {
            Ok(choice) => Ok(choice),
            Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(AppError::Io(io::Error::other(err.to_string()))),
        }
    }
}
