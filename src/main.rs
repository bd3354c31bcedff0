use anyhow::{Context, Result, anyhow};
use argh::FromArgs;
use procrun::{
    CommandLine, CommandSpec, Environment, ExitCode, ProcessRunner, check_exit, exit_code, exit_non_zero,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Exec,
    Spawn,
    Wait,
    Run,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exec" => Ok(Mode::Exec),
            "spawn" => Ok(Mode::Spawn),
            "wait" => Ok(Mode::Wait),
            "run" => Ok(Mode::Run),
            other => Err(format!(
                "unknown mode '{}', expected exec, spawn, wait or run",
                other
            )),
        }
    }
}

#[derive(FromArgs)]
/// Run a command line. It may start with a SIG<NAME> and a SHELL[=name]
/// directive and may contain ${NAME} placeholders.
struct Args {
    #[argh(option, short = 'm', default = "Mode::Wait")]
    /// how to run the command: exec, spawn, wait or run (default: wait)
    mode: Mode,

    #[argh(switch, short = 'c')]
    /// fail when the command exits non-zero
    check: bool,

    #[argh(option, short = 'v')]
    /// extra KEY=VALUE for placeholder substitution; may be repeated
    var: Vec<String>,

    #[argh(switch, short = 'q')]
    /// do not print the command line before running it
    quiet: bool,

    #[argh(switch, short = 'i')]
    /// read command lines from an interactive prompt
    interactive: bool,

    #[argh(positional, greedy)]
    /// the command line, e.g. `SIGINT SHELL=sh sleep 5 && echo ${USER}`
    words: Vec<String>,
}

struct Session {
    runner: ProcessRunner,
    env: Environment,
    mode: Mode,
    check: bool,
    quiet: bool,
}

impl Session {
    fn run_line(&self, raw: &str) -> Result<ExitCode> {
        let line = CommandLine::parse(raw).substitute(&self.env.vars);
        let spec = line
            .to_spec()
            .ok_or_else(|| anyhow!("nothing to run in {:?}", raw))?;
        tracing::debug!(signal = %line.signal, shell = ?line.shell, "parsed command line");

        match self.mode {
            Mode::Exec => {
                if !self.quiet {
                    self.runner.logger().info(&spec.display_line());
                }
                let never = self.runner.exec(&spec)?;
                match never {}
            }
            Mode::Spawn => {
                let child = if self.quiet {
                    self.runner.spawn(&spec)?
                } else {
                    self.runner.ospawn(&spec)?
                };
                let pid = format!("pid {}", child.id());
                let stop = format!("stop with {}", line.signal);
                self.runner
                    .logger()
                    .progress("started", &[pid.as_str(), stop.as_str()]);
                Ok(0)
            }
            Mode::Wait => {
                let wait = |s: &CommandSpec| {
                    if self.quiet {
                        self.runner.spawn_and_wait(s)
                    } else {
                        self.runner.ospawn_and_wait(s)
                    }
                };
                let status = if self.check {
                    check_exit(&spec, wait)?
                } else {
                    wait(&spec)?
                };
                Ok(exit_code(status))
            }
            Mode::Run => {
                if !self.quiet {
                    self.runner.logger().info(&spec.display_line());
                }
                let ok = self.runner.run(&spec)?;
                if self.check && !ok {
                    return Err(exit_non_zero(&spec.argv(), 1).into());
                }
                Ok(if ok { 0 } else { 1 })
            }
        }
    }

    fn repl(&self) -> Result<()> {
        let mut rl = DefaultEditor::new().context("failed to start line editor")?;

        loop {
            match rl.readline("procrun> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    match self.run_line(&line) {
                        Ok(0) => {}
                        Ok(code) => self.runner.logger().warn(&format!("exit code {}", code), None),
                        Err(e) => self.runner.logger().error(&format!("{:#}", e), None),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read line"),
            }
        }

        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    init_tracing();
    let args: Args = argh::from_env();

    let mut env = Environment::new();
    let runner = ProcessRunner::default();
    for assignment in &args.var {
        if !env.apply_assignment(assignment) {
            runner
                .logger()
                .error(&format!("invalid --var {:?}, expected KEY=VALUE", assignment), None);
            return std::process::ExitCode::from(2);
        }
    }

    let session = Session {
        runner,
        env,
        mode: args.mode,
        check: args.check,
        quiet: args.quiet,
    };

    let result = if args.interactive {
        session.repl().map(|()| 0)
    } else {
        session.run_line(&args.words.join(" "))
    };

    match result {
        Ok(code) => std::process::ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            session.runner.logger().error(&format!("{:#}", e), None);
            std::process::ExitCode::from(1)
        }
    }
}
