//! Terminal output for the CLI.
//!
//! Human output goes to stdout (status lines to stderr). With `--json` only
//! machine-readable documents are printed, plus errors as `{"error": ...}`.

use console::{style, StyledObject};
use serde::Serialize;

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Info,
    Success,
    Warn,
    Error,
}

impl Status {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Status::Info => style("ℹ").blue(),
            Status::Success => style("✓").green(),
            Status::Warn => style("⚠").yellow(),
            Status::Error => style("✗").red(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Status::Warn | Status::Error)
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    fn status(&self, status: Status, msg: &str) {
        if self.json {
            if status == Status::Error {
                eprintln!("{}", serde_json::json!({ "error": msg }));
            }
            return;
        }
        let line = match status {
            Status::Error => format!("{} {}", status.marker(), style(msg).red()),
            _ => format!("{} {}", status.marker(), msg),
        };
        if status.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    pub fn info(&self, msg: &str) {
        self.status(Status::Info, msg);
    }

    pub fn success(&self, msg: &str) {
        self.status(Status::Success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.status(Status::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.status(Status::Error, msg);
    }

    /// Verbose-only trace line.
    pub fn debug(&self, msg: &str) {
        if self.verbose && !self.json {
            eprintln!("{} {}", style("→").dim(), style(msg).dim());
        }
    }

    pub fn header(&self, title: &str) {
        if !self.json {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// Indented `key: value` detail line.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.json {
            println!("  {} {}", style("•").dim(), item);
        }
    }

    /// Pretty JSON document on stdout, regardless of mode.
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(doc) => println!("{doc}"),
            Err(e) => self.error(&format!("could not encode output: {e}")),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}
