//! Plain text rendering for outlines.

use std::fmt::Write;

use crate::model::Outline;

/// Render an outline as an indented listing, one heading per line.
///
/// ```text
/// Annual Report 2024
///
/// 1. Introduction (p. 2)
///   1.1 Background (p. 3)
/// ```
pub fn to_text(outline: &Outline) -> String {
    let mut output = String::new();

    if !outline.title.is_empty() {
        output.push_str(&outline.title);
        output.push('\n');
        if !outline.is_empty() {
            output.push('\n');
        }
    }

    for entry in outline.headings() {
        let indent = "  ".repeat(usize::from(entry.level.depth()) - 1);
        let _ = writeln!(output, "{}{} (p. {})", indent, entry.text, entry.page);
    }

    output.trim_end().to_string()
}
