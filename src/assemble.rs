//! Turning a caller's [`CommandSpec`] into the exact invocation handed to
//! the OS.
//!
//! The command token is always used twice: once as the display name
//! (`argv[0]`) and once as the executable path. The program is therefore
//! started directly, never through a shell; a shell only runs when the
//! caller passes one as the command itself.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// How one of the child's standard streams is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    Inherit,
    Null,
}

impl StdioMode {
    fn to_stdio(self) -> Stdio {
        match self {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Null => Stdio::null(),
        }
    }
}

/// Spawn options other than the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    /// Working directory of the child.
    pub current_dir: Option<PathBuf>,
    /// Start from an empty environment instead of inheriting ours.
    pub clear_env: bool,
    pub stdin: Option<StdioMode>,
    pub stdout: Option<StdioMode>,
    pub stderr: Option<StdioMode>,
    /// Process group to move the child into; `Some(0)` makes it a group leader.
    #[cfg(unix)]
    pub process_group: Option<i32>,
}

impl SpawnOptions {
    fn apply(&self, cmd: &mut Command) {
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        if self.clear_env {
            cmd.env_clear();
        }
        if let Some(mode) = self.stdin {
            cmd.stdin(mode.to_stdio());
        }
        if let Some(mode) = self.stdout {
            cmd.stdout(mode.to_stdio());
        }
        if let Some(mode) = self.stderr {
            cmd.stderr(mode.to_stdio());
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(pgid) = self.process_group {
                cmd.process_group(pgid);
            }
        }
    }
}

/// A command to run: the command token, its arguments and optional
/// environment overrides and spawn options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    pub args: Vec<String>,
    /// Variables added to (or, with `clear_env`, forming) the child's environment.
    pub env: Option<HashMap<String, String>>,
    pub options: Option<SpawnOptions>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), val.into());
        self
    }

    pub fn options(mut self, options: SpawnOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Run the same command under `nohup`.
    pub fn nohup(self) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.command);
        args.extend(self.args);
        Self {
            command: "nohup".to_string(),
            args,
            env: self.env,
            options: self.options,
        }
    }

    /// Command followed by its arguments, without env or options.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// The argv joined by spaces, as shown in status lines.
    pub fn display_line(&self) -> String {
        self.argv().join(" ")
    }
}

/// The assembled invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnArguments {
    /// Name the child sees as `argv[0]`.
    pub display_name: String,
    /// Executable to start.
    pub program: String,
    pub args: Vec<String>,
    /// Passed to the OS as the environment, never as arguments.
    pub env: Option<HashMap<String, String>>,
    pub options: Option<SpawnOptions>,
}

/// Build the OS invocation for `spec`.
pub fn assemble(spec: &CommandSpec) -> SpawnArguments {
    SpawnArguments {
        display_name: spec.command.clone(),
        program: spec.command.clone(),
        args: spec.args.clone(),
        env: spec.env.clone(),
        options: spec.options.clone(),
    }
}

impl SpawnArguments {
    /// A [`Command`] ready to be spawned.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.display_name);
        }
        cmd.args(&self.args);
        // Options first: clearing the environment must not drop the overrides.
        if let Some(options) = &self.options {
            options.apply(&mut cmd);
        }
        if let Some(env) = &self.env {
            cmd.envs(env);
        }
        cmd
    }
}

/// Render an environment as `KEY="value"` strings, skipping unset values.
pub fn env_assignments(env: &BTreeMap<String, Option<String>>) -> Vec<String> {
    env.iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={:?}", k, v)))
        .collect()
}
