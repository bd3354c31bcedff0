use std::collections::HashMap;
use std::env as stdenv;

/// Variables available to `${NAME}` placeholders.
///
/// Starts as a snapshot of the process environment; explicit overrides win.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment, skipping entries that are
    /// not valid UTF-8.
    pub fn new() -> Self {
        let vars = stdenv::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// An environment with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Parse and apply a `KEY=VALUE` override. Returns `false` if there is no `=`
    /// or the key is empty.
    pub fn apply_assignment(&mut self, assignment: &str) -> bool {
        match assignment.split_once('=') {
            Some((key, val)) if !key.is_empty() => {
                self.set_var(key, val);
                true
            }
            _ => false,
        }
    }
}
