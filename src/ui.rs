//! Human-facing console messages.
//!
//! Everything here goes to stderr; stdout is reserved for the machine
//! readable result.

use console::style;

use crate::error::ValidationError;
use crate::validator::{CiCheck, ValidationResult};

/// Format an error message in red.
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

/// Format a success message with green checkmark.
pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

/// Format a status message with yellow arrow.
pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

/// Format a violated release rule, naming the rule first.
pub fn format_violation(err: &ValidationError) -> String {
    format!(
        "{} [{}] {}",
        style("✗ validation failed").red().bold(),
        style(err.kind()).cyan(),
        err
    )
}

/// One-line human summary of a successful validation.
pub fn format_summary(result: &ValidationResult) -> String {
    let kind = if result.is_first_rc {
        "first release candidate"
    } else if result.is_release_candidate {
        "release candidate"
    } else {
        "final release"
    };

    let mut summary = format!(
        "{} ({}) on {}",
        style(&result.tag).green().bold(),
        kind,
        result.release_branch
    );

    if let Some(last_rc) = &result.last_rc {
        summary.push_str(&format!(", from {}", last_rc));
    }

    match result.ci {
        CiCheck::Passed => summary.push_str(", CI passed"),
        CiCheck::Skipped => summary.push_str(", CI not checked"),
        CiCheck::NotRequired => {}
    }

    summary
}

pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

pub fn display_success(message: &str) {
    eprintln!("{}", format_success(message));
}

pub fn display_status(message: &str) {
    eprintln!("{}", format_status(message));
}

pub fn display_violation(err: &ValidationError) {
    eprintln!("{}", format_violation(err));
}
