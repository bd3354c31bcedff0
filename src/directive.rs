//! Leading directives in a command string.
//!
//! Two prefixes are recognized, each parsed independently:
//!
//! - `SIG<NAME> rest...` selects the signal used to terminate the command.
//! - `SHELL rest...` or `SHELL=<name> rest...` asks for the command to be
//!   wrapped in a shell.
//!
//! A string that does not start with a directive is returned untouched.
//! Parsing never fails. Only ASCII whitespace separates a directive from
//! the command, and the command is everything after that separator,
//! later lines included.

use regex::Regex;
use std::sync::LazyLock;

/// Signal used when a command carries no `SIG*` prefix.
pub const DEFAULT_SIGNAL: &str = "SIGTERM";

/// Shell used for a bare `SHELL` prefix.
pub const DEFAULT_SHELL: &str = "bash";

static SIGNAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A(SIG[A-Z0-9]+)[ \t\r\n\x0B\x0C]+(.*)\z").expect("signal prefix pattern is valid")
});

static SHELL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\ASHELL(?:=([^ \t\r\n\x0B\x0C]+))?[ \t\r\n\x0B\x0C]+(.*)\z").expect("shell prefix pattern is valid")
});

/// A command with its termination signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDirective {
    pub command: String,
    /// Always set: either the parsed prefix or the caller's default.
    pub signal: String,
}

/// A command with the shell it should run under, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellDirective {
    pub command: String,
    /// `None` when there was no `SHELL` prefix at all.
    pub shell: Option<String>,
}

/// Parse an optional `SIG*` prefix, e.g. `SIGINT foo bar`.
pub fn parse_signal(raw: &str, default: &str) -> CommandDirective {
    match SIGNAL_PREFIX.captures(raw) {
        Some(caps) => CommandDirective {
            command: caps[2].to_string(),
            signal: caps[1].to_string(),
        },
        None => CommandDirective {
            command: raw.to_string(),
            signal: default.to_string(),
        },
    }
}

/// Parse an optional `SHELL[=name]` prefix, e.g. `SHELL=zsh foo bar`.
pub fn parse_shell(raw: &str, default: &str) -> ShellDirective {
    match SHELL_PREFIX.captures(raw) {
        Some(caps) => ShellDirective {
            command: caps[2].to_string(),
            shell: Some(
                caps.get(1)
                    .map_or_else(|| default.to_string(), |m| m.as_str().to_string()),
            ),
        },
        None => ShellDirective {
            command: raw.to_string(),
            shell: None,
        },
    }
}
