//! Raw command strings: directives, placeholders and conversion into a
//! [`CommandSpec`].

use crate::assemble::CommandSpec;
use crate::directive::{DEFAULT_SHELL, DEFAULT_SIGNAL, parse_shell, parse_signal};
use crate::substitute::substitute;
use std::collections::HashMap;

/// A command string with its directives split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Signal to stop the command with.
    pub signal: String,
    /// Shell to run the command body under, if requested.
    pub shell: Option<String>,
    /// The command body.
    pub command: String,
}

impl CommandLine {
    /// Parse with the default signal (`SIGTERM`) and shell (`bash`).
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, DEFAULT_SIGNAL, DEFAULT_SHELL)
    }

    /// Strip a `SIG*` prefix, then a `SHELL[=name]` prefix.
    pub fn parse_with(raw: &str, default_signal: &str, default_shell: &str) -> Self {
        let sig = parse_signal(raw, default_signal);
        let sh = parse_shell(&sig.command, default_shell);
        Self {
            signal: sig.signal,
            shell: sh.shell,
            command: sh.command,
        }
    }

    /// Replace `${NAME}` placeholders in the command body.
    pub fn substitute(mut self, vars: &HashMap<String, String>) -> Self {
        self.command = substitute(&self.command, vars);
        self
    }

    /// The process to start: `<shell> -c <body>` when a shell was requested,
    /// otherwise the body split on whitespace. `None` for an empty body.
    pub fn to_spec(&self) -> Option<CommandSpec> {
        if let Some(shell) = &self.shell {
            return Some(CommandSpec::new(shell).arg("-c").arg(&self.command));
        }
        let mut words = self.command.split_whitespace();
        let command = words.next()?;
        Some(CommandSpec::new(command).args(words))
    }
}
