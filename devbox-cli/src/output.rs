//! Operator-facing status lines. Progress goes to stdout, failures to stderr.

use colored::Colorize;

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

pub fn failure(message: impl AsRef<str>) {
    eprintln!("{} {}", "✗".red().bold(), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", "!".yellow().bold(), message.as_ref());
}

pub fn error(message: impl std::fmt::Display) {
    eprintln!("{} {message}", "error:".red().bold());
}
