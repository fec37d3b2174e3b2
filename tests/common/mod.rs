//! Shared testing utilities for azup CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)]
pub const CONFIG_FILE: &str = "deployment-config.env";

/// Isolated working directory plus helpers for invoking the compiled binary.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for the compiled `azup` binary in the work directory.
    ///
    /// `AZUP_AZ` points at a nonexistent binary by default so no test ever
    /// reaches a real `az` install; tests that need one install a stub.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("azup").expect("Failed to locate azup binary");
        cmd.current_dir(&self.work_dir).env("AZUP_AZ", self.root.path().join("no-such-az"));
        cmd
    }

    /// Same, but with the stubbed `az` installed by `install_az_stub`.
    pub fn cli_with_stub(&self) -> Command {
        let mut cmd = Command::cargo_bin("azup").expect("Failed to locate azup binary");
        cmd.current_dir(&self.work_dir).env("AZUP_AZ", self.stub_path());
        cmd
    }

    pub fn config_path(&self) -> PathBuf {
        self.work_dir.join(CONFIG_FILE)
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config fixture");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config file")
    }

    fn stub_path(&self) -> PathBuf {
        self.root.path().join("az-stub")
    }

    /// Write an executable shell script standing in for the `az` CLI.
    pub fn install_az_stub(&self, body: &str) {
        let path = self.stub_path();
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write az stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("Failed to mark az stub executable");
        }
    }
}
