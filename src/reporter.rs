//! Logging and exit-code checks layered over [`ProcessRunner`].

use crate::assemble::CommandSpec;
use crate::error::{RunError, format_args_list};
use crate::runner::ProcessRunner;
use std::process::{Child, ExitStatus, Output};

/// Conventional process exit code: 0 is success, anything else failure.
pub type ExitCode = i32;

/// Anything a checked call can return that carries an exit code.
pub trait HasExitCode {
    fn exit_code(&self) -> ExitCode;
}

impl HasExitCode for ExitCode {
    fn exit_code(&self) -> ExitCode {
        *self
    }
}

impl HasExitCode for ExitStatus {
    fn exit_code(&self) -> ExitCode {
        exit_code(*self)
    }
}

impl HasExitCode for Output {
    fn exit_code(&self) -> ExitCode {
        exit_code(self.status)
    }
}

/// Shell-style exit code: the process's code, or `128 + signal` if it was
/// killed by a signal.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
        128 + signal
    } else if status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> ExitCode {
    -1
}

/// Run `call` on `spec` and fail with [`RunError::NonZeroExit`] if the
/// outcome's exit code is not 0. A zero outcome is returned unchanged.
pub fn check_exit<T, F>(spec: &CommandSpec, call: F) -> Result<T, RunError>
where
    T: HasExitCode,
    F: FnOnce(&CommandSpec) -> Result<T, RunError>,
{
    let outcome = call(spec)?;
    check_exit_status(&spec.argv(), outcome.exit_code())?;
    Ok(outcome)
}

pub fn check_exit_status(args: &[String], code: ExitCode) -> Result<(), RunError> {
    if code != 0 {
        return Err(exit_non_zero(args, code));
    }
    Ok(())
}

pub fn exit_non_zero(args: &[String], code: ExitCode) -> RunError {
    RunError::NonZeroExit {
        args: format_args_list(args),
        code,
    }
}

impl ProcessRunner {
    /// Log the command line, then [`spawn`](Self::spawn) it.
    pub fn ospawn(&self, spec: &CommandSpec) -> Result<Child, RunError> {
        self.logger().info(&spec.display_line());
        self.spawn(spec)
    }

    /// Log the command line, then [`spawn_and_wait`](Self::spawn_and_wait) for it.
    pub fn ospawn_and_wait(&self, spec: &CommandSpec) -> Result<ExitStatus, RunError> {
        self.logger().info(&spec.display_line());
        self.spawn_and_wait(spec)
    }
}
