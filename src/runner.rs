//! The five ways of starting a process.
//!
//! Every mode assembles the invocation the same way (see
//! [`crate::assemble`]) and reports "executable not found" as
//! [`RunError::NotFound`] naming the mode. Each call is single-shot and
//! blocking; reaping children and closing streams is up to the caller
//! except where a mode says otherwise.

use crate::assemble::{CommandSpec, assemble};
use crate::error::{RunError, RunMode};
use crate::logger::{ConsoleLogger, Logger};
use std::convert::Infallible;
use std::io;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus, Stdio};

/// A child started by [`ProcessRunner::spawn_piped`], with all three
/// standard streams connected to pipes.
///
/// Dropping it closes any streams still open and then reaps the child,
/// also when the callback unwinds.
pub struct PipedChild {
    /// `None` once closed with [`PipedChild::close_stdin`].
    pub stdin: Option<ChildStdin>,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
    // Declared last: fields drop in order, so the pipes are closed before
    // the reaper waits.
    child: Reaper,
}

/// Waits for the child when dropped.
struct Reaper(Child);

impl Drop for Reaper {
    fn drop(&mut self) {
        if let Err(e) = self.0.wait() {
            tracing::warn!(pid = self.0.id(), error = %e, "failed to reap piped child");
        }
    }
}

impl PipedChild {
    pub fn id(&self) -> u32 {
        self.child.0.id()
    }

    /// Close the child's standard input so it sees end-of-file.
    pub fn close_stdin(&mut self) {
        drop(self.stdin.take());
    }

    /// Close standard input and wait for the child to exit.
    ///
    /// Read `stdout` and `stderr` first: a child that fills a pipe buffer
    /// blocks on the write and this call never returns.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.close_stdin();
        self.child.0.wait()
    }
}

/// Starts processes and classifies how starting them failed.
pub struct ProcessRunner {
    logger: Box<dyn Logger>,
}

impl ProcessRunner {
    pub fn new(logger: Box<dyn Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Replace the current process with `spec`. Only returns on failure.
    ///
    /// A missing executable is reported as [`RunError::NotFound`]; any other
    /// failure of the underlying `execvp` comes back as [`RunError::Io`].
    #[cfg(unix)]
    pub fn exec(&self, spec: &CommandSpec) -> Result<Infallible, RunError> {
        use std::os::unix::process::CommandExt;

        tracing::debug!(mode = %RunMode::Exec, program = %spec.command, "replacing process image");
        let err = assemble(spec).to_command().exec();
        Err(RunError::classify(RunMode::Exec, &spec.argv(), err))
    }

    /// Without process replacement the child runs to completion and this
    /// process exits with its code.
    #[cfg(not(unix))]
    pub fn exec(&self, spec: &CommandSpec) -> Result<Infallible, RunError> {
        tracing::debug!(mode = %RunMode::Exec, program = %spec.command, "running in place of current process");
        let mut child = assemble(spec)
            .to_command()
            .spawn()
            .map_err(|e| RunError::classify(RunMode::Exec, &spec.argv(), e))?;
        let status = child.wait()?;
        std::process::exit(crate::reporter::exit_code(status))
    }

    /// Start `spec` as a child process and return its handle.
    pub fn spawn(&self, spec: &CommandSpec) -> Result<Child, RunError> {
        self.spawn_as(RunMode::Spawn, spec)
    }

    /// [`spawn`](Self::spawn), then block until the child exits.
    pub fn spawn_and_wait(&self, spec: &CommandSpec) -> Result<ExitStatus, RunError> {
        let mut child = self.spawn(spec)?;
        Ok(child.wait()?)
    }

    /// Run `spec` to completion and report whether it succeeded.
    ///
    /// A process that ran and exited non-zero (or was killed) is `Ok(false)`.
    /// Only a failure to create the process at all, including a missing
    /// executable, is an error.
    pub fn run(&self, spec: &CommandSpec) -> Result<bool, RunError> {
        tracing::debug!(mode = %RunMode::Run, program = %spec.command, "running");
        match assemble(spec).to_command().status() {
            Ok(status) => Ok(status.success()),
            Err(source) => Err(RunError::CreationFailed {
                args: crate::error::format_args_list(&spec.argv()),
                source,
            }),
        }
    }

    /// Start `spec` with piped stdin/stdout/stderr and hand the streams to `f`.
    ///
    /// The pipes exist before `f` is called. Once `f` returns or panics, any
    /// streams it left open are closed and the child is reaped; `f`'s value
    /// is returned.
    pub fn spawn_piped<F, R>(&self, spec: &CommandSpec, f: F) -> Result<R, RunError>
    where
        F: FnOnce(&mut PipedChild) -> R,
    {
        let mut cmd = assemble(spec).to_command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd
            .spawn()
            .map_err(|e| RunError::classify(RunMode::SpawnPiped, &spec.argv(), e))?;
        tracing::debug!(mode = %RunMode::SpawnPiped, program = %spec.command, pid = child.id(), "spawned");

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::other("child started without its pipes").into());
        };

        let mut piped = PipedChild {
            stdin: Some(stdin),
            stdout,
            stderr,
            child: Reaper(child),
        };
        Ok(f(&mut piped))
    }

    fn spawn_as(&self, mode: RunMode, spec: &CommandSpec) -> Result<Child, RunError> {
        let child = assemble(spec)
            .to_command()
            .spawn()
            .map_err(|e| RunError::classify(mode, &spec.argv(), e))?;
        tracing::debug!(mode = %mode, program = %spec.command, pid = child.id(), "spawned");
        Ok(child)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Box::new(ConsoleLogger::new()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::assemble::SpawnOptions;
    use crate::color::PlainColorizer;
    use crate::error::RunErrorKind;
    use std::io::{Read, Write};

    const MISSING: &str = "procrun-test-no-such-program";

    fn quiet_runner() -> ProcessRunner {
        ProcessRunner::new(Box::new(ConsoleLogger::with_writers(
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            PlainColorizer,
        )))
    }

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn test_spawn_missing_is_not_found() {
        let err = quiet_runner()
            .spawn(&CommandSpec::new(MISSING).arg("x"))
            .unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::NotFound);
        let msg = err.to_string();
        assert!(
            msg.starts_with(&format!("failed to spawn command [\"{}\", \"x\"]: ", MISSING)),
            "unexpected message: {}",
            msg
        );
    }

    #[test]
    fn test_spawn_returns_live_child() {
        let mut child = quiet_runner().spawn(&CommandSpec::new("true")).unwrap();
        assert!(child.id() > 0);
        assert!(child.wait().unwrap().success());
    }

    #[test]
    fn test_spawn_and_wait_returns_status() {
        let status = quiet_runner().spawn_and_wait(&sh("exit 3")).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_spawn_and_wait_missing_is_not_found() {
        let err = quiet_runner()
            .spawn_and_wait(&CommandSpec::new(MISSING))
            .unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::NotFound);
        assert!(err.to_string().contains("failed to spawn command"));
    }

    #[test]
    fn test_run_reports_exit_as_bool() {
        let runner = quiet_runner();
        assert!(runner.run(&CommandSpec::new("true")).unwrap());
        assert!(!runner.run(&CommandSpec::new("false")).unwrap());
        assert!(!runner.run(&sh("exit 7")).unwrap());
    }

    #[test]
    fn test_run_creation_failure_is_error() {
        let err = quiet_runner().run(&CommandSpec::new(MISSING)).unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::CreationFailed);
        assert!(
            err.to_string()
                .starts_with(&format!("failed to run command [\"{}\"] (", MISSING))
        );
    }

    #[test]
    fn test_exec_missing_is_not_found() {
        let err = quiet_runner().exec(&CommandSpec::new(MISSING)).unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::NotFound);
        assert!(err.to_string().contains("failed to exec command"));
    }

    #[test]
    fn test_spawn_piped_round_trips_through_cat() {
        let out = quiet_runner()
            .spawn_piped(&CommandSpec::new("cat"), |p| {
                p.stdin.as_mut().unwrap().write_all(b"hello pipe").unwrap();
                p.close_stdin();
                let mut s = String::new();
                p.stdout.read_to_string(&mut s).unwrap();
                s
            })
            .unwrap();
        assert_eq!(out, "hello pipe");
    }

    #[test]
    fn test_spawn_piped_separates_stderr() {
        let (out, err, code) = quiet_runner()
            .spawn_piped(&sh("echo out; echo err >&2; exit 4"), |p| {
                let mut out = String::new();
                let mut err = String::new();
                p.stdout.read_to_string(&mut out).unwrap();
                p.stderr.read_to_string(&mut err).unwrap();
                let code = p.wait().unwrap().code();
                (out, err, code)
            })
            .unwrap();
        assert_eq!(out, "out\n");
        assert_eq!(err, "err\n");
        assert_eq!(code, Some(4));
    }

    #[test]
    fn test_spawn_piped_missing_is_not_found() {
        let err = quiet_runner()
            .spawn_piped(&CommandSpec::new(MISSING), |_| ())
            .unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::NotFound);
        assert!(err.to_string().contains("failed to spawn_piped command"));
    }

    #[test]
    fn test_env_override_reaches_child() {
        let out = quiet_runner()
            .spawn_piped(&sh("printf %s \"$PROCRUN_TEST_VAR\"").env("PROCRUN_TEST_VAR", "bar"), |p| {
                let mut s = String::new();
                p.stdout.read_to_string(&mut s).unwrap();
                s
            })
            .unwrap();
        assert_eq!(out, "bar");
    }

    #[test]
    fn test_clear_env_keeps_only_overrides() {
        let spec = CommandSpec::new("/bin/sh")
            .arg("-c")
            .arg("printf '%s|%s' \"$HOME\" \"$ONLY\"")
            .env("ONLY", "me")
            .options(SpawnOptions {
                clear_env: true,
                ..SpawnOptions::default()
            });
        let out = quiet_runner()
            .spawn_piped(&spec, |p| {
                let mut s = String::new();
                p.stdout.read_to_string(&mut s).unwrap();
                s
            })
            .unwrap();
        assert_eq!(out, "|me");
    }

    #[test]
    fn test_current_dir_option() {
        let spec = CommandSpec::new("pwd").options(SpawnOptions {
            current_dir: Some(std::path::PathBuf::from("/")),
            ..SpawnOptions::default()
        });
        let out = quiet_runner()
            .spawn_piped(&spec, |p| {
                let mut s = String::new();
                p.stdout.read_to_string(&mut s).unwrap();
                s
            })
            .unwrap();
        assert_eq!(out, "/\n");
    }

    #[cfg(target_os = "linux")]
    fn is_reaped(pid: u32) -> bool {
        !std::path::Path::new(&format!("/proc/{}", pid)).exists()
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_spawn_piped_reaps_child_after_return() {
        let pid = quiet_runner()
            .spawn_piped(&CommandSpec::new("true"), |p| p.id())
            .unwrap();
        assert!(is_reaped(pid), "child {} left behind", pid);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_spawn_piped_reaps_child_when_callback_panics() {
        use std::cell::Cell;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let runner = quiet_runner();
        let pid = Cell::new(0);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            runner.spawn_piped::<_, ()>(&CommandSpec::new("true"), |p| {
                pid.set(p.id());
                panic!("callback failed");
            })
        }));

        assert!(outcome.is_err());
        assert!(pid.get() > 0);
        assert!(is_reaped(pid.get()), "child {} left behind", pid.get());
    }

    #[test]
    fn test_spawn_piped_closes_unread_pipes_before_reaping() {
        // Writes far more than a pipe buffer; only finishes once stdout is closed.
        let spec = sh("yes | head -c 1000000");
        let done = quiet_runner().spawn_piped(&spec, |_| "done").unwrap();
        assert_eq!(done, "done");
    }
}
