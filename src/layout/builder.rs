//! Final outline assembly.

use std::collections::HashSet;

use crate::model::{Outline, OutlineEntry};

use super::config::BuilderConfig;
use super::cover::TitleResult;
use super::hierarchy::LeveledHeading;
use super::signature::normalize_text;

/// Combines the title and leveled headings into an [`Outline`].
pub struct OutlineBuilder<'a> {
    config: &'a BuilderConfig,
}

impl<'a> OutlineBuilder<'a> {
    /// Create a new builder.
    pub fn new(config: &'a BuilderConfig) -> Self {
        Self { config }
    }

    /// Build the outline, sorting headings by page and reading order.
    pub fn build(&self, title: TitleResult, mut headings: Vec<LeveledHeading>) -> Outline {
        headings.sort_by_key(|h| (h.page, h.order_index));

        let title_key = normalize_text(&title.text);
        let mut seen: HashSet<String> = HashSet::new();
        let mut outline = Vec::with_capacity(headings.len());

        for heading in headings {
            let key = normalize_text(&heading.text);
            if key.is_empty() || (!title_key.is_empty() && key == title_key) {
                continue;
            }
            if self.config.dedupe_headings && !seen.insert(key) {
                continue;
            }
            outline.push(OutlineEntry::new(heading.level, heading.text, heading.page));
        }

        Outline {
            title: title.text,
            outline,
        }
    }
}
