//! Flat `KEY=value` deployment config with comment-preserving rewrite.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::domain::AppError;

/// Well-known file name for the deployment parameters.
pub const FILE_NAME: &str = "deployment-config.env";

/// Authoritative read/write view of the deployment parameters.
///
/// Raw lines are retained so that a rewrite only touches the lines whose key
/// was mutated; comments, blank lines, and ordering survive byte-for-byte.
/// Persistence is a whole-file rewrite with no lock: concurrent writers are
/// unsupported and the last one wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    lines: Vec<String>,
    map: BTreeMap<String, String>,
    dirty: BTreeSet<String>,
    appended: Vec<String>,
}

impl ConfigStore {
    /// Parse file content into a store.
    ///
    /// Blank lines and lines whose first non-whitespace character is `#` are
    /// skipped. Every other line must contain `=`: the key is the part before
    /// the first `=` (trimmed), the value everything after (trimmed). Later
    /// occurrences of a duplicated key win.
    pub fn parse(path: PathBuf, content: &str) -> Result<Self, AppError> {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        let mut map = BTreeMap::new();
        for (index, line) in lines.iter().enumerate() {
            if !is_entry(line) {
                continue;
            }
            let (key, value) = split_entry(line)
                .ok_or_else(|| AppError::ConfigParse { line: index + 1, content: line.clone() })?;
            map.insert(key, value);
        }

        Ok(Self { path, lines, map, dirty: BTreeSet::new(), appended: Vec::new() })
    }

    /// Path the store was loaded from and will persist back to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`, or `""` when absent. Never errors: callers treat an
    /// empty value as "not configured" and pick a policy.
    pub fn get(&self, key: &str) -> &str {
        self.map.get(key).map(String::as_str).unwrap_or("")
    }

    /// Whether the file has an entry line for `key` (even an empty one).
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// All key/value pairs, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Mutate a value in memory. A no-op when the value is already current,
    /// so an unchanged store always renders byte-identically.
    pub fn set(&mut self, key: &str, value: &str) {
        if self.map.get(key).map(String::as_str) == Some(value) {
            return;
        }
        let has_line = self.lines.iter().any(|line| line_key_is(line, key));
        if !has_line && !self.appended.iter().any(|k| k == key) {
            self.appended.push(key.to_string());
        }
        self.map.insert(key.to_string(), value.to_string());
        self.dirty.insert(key.to_string());
    }

    /// Whether any `set` is waiting to be persisted.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Render the file content: every line whose key was mutated becomes
    /// `KEY=value` (all occurrences of a duplicated key), everything else is
    /// preserved verbatim, and brand-new keys are appended at the end in the
    /// order they were first set. Line endings normalize to `\n`.
    pub fn render(&self) -> String {
        let mut out: Vec<String> = self
            .lines
            .iter()
            .map(|line| match entry_key(line) {
                Some(key) if self.dirty.contains(&key) => {
                    format!("{}={}", key, self.map[&key])
                }
                _ => line.clone(),
            })
            .collect();

        for key in &self.appended {
            out.push(format!("{}={}", key, self.map[key]));
        }

        if out.is_empty() {
            return String::new();
        }
        let mut content = out.join("\n");
        content.push('\n');
        content
    }

    /// Fold the pending mutations into the retained lines after a successful
    /// write, so a subsequent render starts from the persisted state.
    pub fn mark_clean(&mut self) {
        self.lines = self.render().lines().map(str::to_string).collect();
        self.dirty.clear();
        self.appended.clear();
    }
}

fn is_entry(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn split_entry(line: &str) -> Option<(String, String)> {
    line.split_once('=').map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
}

fn entry_key(line: &str) -> Option<String> {
    if !is_entry(line) {
        return None;
    }
    split_entry(line).map(|(key, _)| key)
}

fn line_key_is(line: &str, key: &str) -> bool {
    entry_key(line).is_some_and(|k| k == key)
}
