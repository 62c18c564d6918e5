//! Heading extraction for targeting patch operations.
//!
//! A line is a heading when, after trimming, it starts with one or more `#`
//! followed by a space. Each heading gets a path that joins the text of the
//! nearest preceding heading with a strictly smaller level and its own text,
//! e.g. `Project::Tasks`. Only one ancestor is attached, so an H3 below an H2
//! below an H1 is addressed as `H2::H3`.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

/// Delimiter between the segments of a heading path.
pub const HEADING_PATH_DELIMITER: &str = "::";

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+) (.*)$").expect("valid heading regex"));

/// A heading found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Heading {
    pub level: usize,
    pub text: String,
    pub path: String,
}

/// Extract all headings from note content, in document order.
pub fn parse_headings(content: &str) -> Vec<Heading> {
    let mut headings: Vec<Heading> = Vec::new();

    for line in content.lines() {
        let Some(caps) = HEADING_REGEX.captures(line.trim()) else {
            continue;
        };
        let level = caps[1].len();
        let text = caps[2].trim().to_string();

        let path = match headings.iter().rev().find(|h| h.level < level) {
            Some(parent) => format!("{}{}{}", parent.text, HEADING_PATH_DELIMITER, text),
            None => text.clone(),
        };

        headings.push(Heading { level, text, path });
    }

    headings
}
