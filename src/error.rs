use std::fmt;
use std::io;
use thiserror::Error;

/// Which run mode produced an error. Rendered verbatim in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Exec,
    Spawn,
    Run,
    SpawnPiped,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Exec => "exec",
            RunMode::Spawn => "spawn",
            RunMode::Run => "run",
            RunMode::SpawnPiped => "spawn_piped",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    /// The executable could not be located.
    NotFound,
    /// The synchronous run primitive could not create the process.
    CreationFailed,
    /// A checked call saw a non-zero exit code.
    NonZeroExit,
    /// Any other OS error, passed through unclassified.
    Os,
}

/// Error returned by every run mode.
///
/// The message is the whole contract: the mode, the attempted arguments
/// (formatted like `["ls", "-la"]`) and the underlying cause. The variant
/// only exists so callers can branch with [`RunError::kind`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to {mode} command {args}: {source}")]
    NotFound {
        mode: RunMode,
        args: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to run command {args} ({source})")]
    CreationFailed {
        args: String,
        #[source]
        source: io::Error,
    },

    #[error("command returned non-zero: {args} -> {code}")]
    NonZeroExit { args: String, code: i32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RunError {
    pub fn kind(&self) -> RunErrorKind {
        match self {
            RunError::NotFound { .. } => RunErrorKind::NotFound,
            RunError::CreationFailed { .. } => RunErrorKind::CreationFailed,
            RunError::NonZeroExit { .. } => RunErrorKind::NonZeroExit,
            RunError::Io(_) => RunErrorKind::Os,
        }
    }

    /// Wrap `err` as [`RunError::NotFound`] when the OS says the executable
    /// is missing; every other error passes through as [`RunError::Io`].
    pub(crate) fn classify(mode: RunMode, args: &[String], err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            RunError::NotFound {
                mode,
                args: format_args_list(args),
                source: err,
            }
        } else {
            RunError::Io(err)
        }
    }
}

/// Format an argument list the way error messages show it: `["a", "b"]`.
pub fn format_args_list<S: AsRef<str>>(args: &[S]) -> String {
    let quoted: Vec<String> = args.iter().map(|a| format!("{:?}", a.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_mode_and_args() {
        let args = vec!["nope".to_string(), "-x".to_string()];
        let err = RunError::classify(
            RunMode::Spawn,
            &args,
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );

        assert_eq!(err.kind(), RunErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "failed to spawn command [\"nope\", \"-x\"]: No such file or directory"
        );
    }

    #[test]
    fn test_other_io_errors_pass_through() {
        let err = RunError::classify(
            RunMode::Exec,
            &["x".to_string()],
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(err.kind(), RunErrorKind::Os);
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn test_non_zero_exit_message() {
        let err = RunError::NonZeroExit {
            args: format_args_list(&["false"]),
            code: 1,
        };
        assert_eq!(err.to_string(), "command returned non-zero: [\"false\"] -> 1");
    }

    #[test]
    fn test_format_args_list_escapes_quotes() {
        assert_eq!(format_args_list::<&str>(&[]), "[]");
        assert_eq!(format_args_list(&["say \"hi\""]), "[\"say \\\"hi\\\"\"]");
    }
}
