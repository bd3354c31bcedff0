//! Status and diagnostic messages.
//!
//! The runner never prints directly; it goes through an injected
//! [`Logger`]. [`ConsoleLogger`] prints the familiar `==> message` lines,
//! [`TracingLogger`] turns the same calls into `tracing` events.

use crate::color::{AnsiColorizer, Colorizer, Tag};
use std::cell::RefCell;
use std::io::Write;

/// Optional sink that receives `"<Label>: <msg>"` for warnings and errors.
pub type LogCallback<'a> = Option<&'a dyn Fn(&str)>;

pub trait Logger {
    /// Status line: `==> <msg>`.
    fn info(&self, msg: &str);

    /// Progress line: `==> <msg>: <a>, <b>`.
    fn progress(&self, msg: &str, what: &[&str]) {
        if what.is_empty() {
            self.info(msg);
        } else {
            self.info(&format!("{}: {}", msg, what.join(", ")));
        }
    }

    /// `Warning: <msg>` on the error stream.
    fn warn(&self, msg: &str, log: LogCallback<'_>);

    /// `Error: <msg>` on the error stream.
    fn error(&self, msg: &str, log: LogCallback<'_>);
}

/// Writes colored status lines to an output and an error stream.
pub struct ConsoleLogger {
    out: RefCell<Box<dyn Write>>,
    err: RefCell<Box<dyn Write>>,
    out_colors: Box<dyn Colorizer>,
    err_colors: Box<dyn Colorizer>,
}

impl ConsoleLogger {
    /// Logger on stdout/stderr, colored when each stream is a terminal.
    pub fn new() -> Self {
        Self {
            out_colors: Box::new(AnsiColorizer::auto(&std::io::stdout())),
            err_colors: Box::new(AnsiColorizer::auto(&std::io::stderr())),
            out: RefCell::new(Box::new(std::io::stdout())),
            err: RefCell::new(Box::new(std::io::stderr())),
        }
    }

    /// Logger on custom sinks sharing one colorizer.
    pub fn with_writers<C>(out: Box<dyn Write>, err: Box<dyn Write>, colors: C) -> Self
    where
        C: Colorizer + Clone + 'static,
    {
        Self {
            out: RefCell::new(out),
            err: RefCell::new(err),
            out_colors: Box::new(colors.clone()),
            err_colors: Box::new(colors),
        }
    }

    fn labelled(&self, label: &str, msg: &str, log: LogCallback<'_>) {
        // Console write failures are not worth failing a run over.
        let _ = writeln!(
            self.err.borrow_mut(),
            "{}: {}",
            self.err_colors.colorize(Tag::Failure, label),
            msg
        );
        if let Some(log) = log {
            log(&format!("{}: {}", label, msg));
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn info(&self, msg: &str) {
        let c = &self.out_colors;
        let _ = writeln!(
            self.out.borrow_mut(),
            "{}{}",
            c.colorize(Tag::Label, "==> "),
            c.colorize(Tag::Highlight, msg)
        );
    }

    fn progress(&self, msg: &str, what: &[&str]) {
        let c = &self.out_colors;
        let mut line = format!(
            "{}{}",
            c.colorize(Tag::Success, "==> "),
            c.colorize(Tag::Highlight, msg)
        );
        if !what.is_empty() {
            let items: Vec<String> = what.iter().map(|x| c.colorize(Tag::Success, x)).collect();
            line.push_str(": ");
            line.push_str(&items.join(", "));
        }
        let _ = writeln!(self.out.borrow_mut(), "{}", line);
    }

    fn warn(&self, msg: &str, log: LogCallback<'_>) {
        self.labelled("Warning", msg, log);
    }

    fn error(&self, msg: &str, log: LogCallback<'_>) {
        self.labelled("Error", msg, log);
    }
}

/// Forwards messages to the active `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }

    fn progress(&self, msg: &str, what: &[&str]) {
        tracing::info!(what = %what.join(", "), "{}", msg);
    }

    fn warn(&self, msg: &str, log: LogCallback<'_>) {
        tracing::warn!("{}", msg);
        if let Some(log) = log {
            log(&format!("Warning: {}", msg));
        }
    }

    fn error(&self, msg: &str, log: LogCallback<'_>) {
        tracing::error!("{}", msg);
        if let Some(log) = log {
            log(&format!("Error: {}", msg));
        }
    }
}
