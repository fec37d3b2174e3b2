//! Numbered manual-fix playbooks attached to unrecoverable errors.

use std::fmt::{self, Display};

/// An ordered list of copy-pasteable steps for the operator.
///
/// Fatal conditions always end with one of these, never a bare error chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    pub summary: String,
    pub steps: Vec<String>,
}

impl Remediation {
    pub fn new<S: Into<String>>(summary: S, steps: Vec<String>) -> Self {
        Self { summary: summary.into(), steps }
    }
}

impl Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {}", index + 1, step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_numbered_steps() {
        let remediation = Remediation::new(
            "Create the vault by hand:",
            vec!["az keyvault create --name v --resource-group g".to_string()],
        );
        let rendered = remediation.to_string();
        assert!(rendered.starts_with("Create the vault by hand:\n"));
        assert!(rendered.contains("  1. az keyvault create"));
    }
}
