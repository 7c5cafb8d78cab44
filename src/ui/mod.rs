use colored::Colorize;
use std::io::{self, Write};

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Operator-facing output used by commands
///
/// Commands receive a logger instead of printing directly so that tests can
/// observe prompts and progress steps.
pub trait Logger: Send + Sync {
    /// Announce a progress step
    fn step(&self, message: &str);

    /// Print a line of plain output (values meant to be piped)
    fn println(&self, message: &str);

    /// Ask a question; the answer is read by the caller
    fn prompt(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn step(&self, message: &str) {
        println!("{} {}", "step:".cyan().bold(), message);
    }

    fn println(&self, message: &str) {
        println!("{}", message);
    }

    fn prompt(&self, message: &str) {
        print!("{} {} (y/N): ", "?".yellow().bold(), message);
        if let Err(e) = io::stdout().flush() {
            warning(&format!("Failed to flush terminal: {}", e));
        }
    }
}
