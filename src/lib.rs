//! A small process-execution layer.
//!
//! Command strings may start with a `SIG<NAME>` directive (how to stop the
//! command) and a `SHELL[=name]` directive (run the body under a shell), and
//! may contain `${NAME}` placeholders. [`CommandLine`] handles that parsing;
//! [`ProcessRunner`] starts the resulting [`CommandSpec`] in one of five
//! modes and normalizes failures into [`RunError`].
//!
//! ```no_run
//! use procrun::{CommandSpec, ProcessRunner};
//! let runner = ProcessRunner::default();
//! let ok = runner.run(&CommandSpec::new("ls").arg("-la")).unwrap();
//! assert!(ok);
//! ```

pub mod assemble;
pub mod color;
pub mod command_line;
pub mod directive;
pub mod env;
pub mod error;
pub mod io_adapters;
pub mod logger;
pub mod reporter;
pub mod runner;
pub mod substitute;

pub use assemble::{CommandSpec, SpawnArguments, SpawnOptions, StdioMode, assemble, env_assignments};
pub use color::{AnsiColorizer, Colorizer, PlainColorizer, Tag};
pub use command_line::CommandLine;
pub use directive::{CommandDirective, ShellDirective, parse_shell, parse_signal};
pub use env::Environment;
pub use error::{RunError, RunErrorKind, RunMode};
pub use io_adapters::MemWriter;
pub use logger::{ConsoleLogger, Logger, TracingLogger};
pub use reporter::{ExitCode, HasExitCode, check_exit, check_exit_status, exit_code, exit_non_zero};
pub use runner::{PipedChild, ProcessRunner};
pub use substitute::substitute;
