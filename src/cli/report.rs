//! Output formatting for CLI commands.

use std::io::{self, Write};

use colored::Colorize;

use crate::vault::Heading;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print a note's headings to stdout.
pub fn print_headings(filepath: &str, headings: &[Heading]) {
    print_headings_to(filepath, headings, &mut io::stdout().lock());
}

/// Print a note's headings to a custom writer.
///
/// Each line shows the heading marker followed by the path to use as a
/// patch target.
pub fn print_headings_to<W: Write>(filepath: &str, headings: &[Heading], writer: &mut W) {
    if headings.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("No headings found in {}.", filepath).red()
        );
        return;
    }

    for heading in headings {
        let _ = writeln!(
            writer,
            "{} {}",
            "#".repeat(heading.level).cyan(),
            heading.path.bold()
        );
    }

    let noun = if headings.len() == 1 { "heading" } else { "headings" };
    let _ = writeln!(writer);
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("{} {} in {}", headings.len(), noun, filepath).green()
    );
}
