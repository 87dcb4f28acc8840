//! The outline produced for a document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level, from the most prominent (H1) to the least (H4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// All levels, most prominent first.
    pub const ALL: [HeadingLevel; 4] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
    ];

    /// Level for a zero-based size rank (0 → H1). Ranks past H4 have no level.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    /// Numeric depth, 1 for H1 through 4 for H4.
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }

    /// Label used in serialized output ("H1".."H4").
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document title plus its headings in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title (empty when none could be inferred)
    pub title: String,
    /// Headings sorted by page and reading order
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an outline with a title and no headings.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            outline: Vec::new(),
        }
    }

    /// Headings in document order.
    pub fn headings(&self) -> &[OutlineEntry] {
        &self.outline
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Distinct levels used, most prominent first.
    pub fn levels_used(&self) -> Vec<HeadingLevel> {
        let mut levels: Vec<HeadingLevel> = self.outline.iter().map(|e| e.level).collect();
        levels.sort();
        levels.dedup();
        levels
    }
}
