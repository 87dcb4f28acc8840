//! Heuristic thresholds for the outline pipeline.
//!
//! Every constant the pipeline compares against lives here, grouped by the
//! stage that uses it, so callers and tests can move individual boundaries.

use crate::error::{Error, Result};

/// Configuration for the whole outline pipeline.
#[derive(Debug, Clone, Default)]
pub struct OutlineConfig {
    /// Span-to-line grouping
    pub lines: LineConfig,

    /// Body size, noise and table-of-contents profiling
    pub profile: ProfileConfig,

    /// Cover page title reconstruction
    pub title: TitleConfig,

    /// Heading acceptance rules
    pub classifier: ClassifierConfig,

    /// Font size to level mapping
    pub hierarchy: HierarchyConfig,

    /// Final outline assembly
    pub builder: BuilderConfig,
}

impl OutlineConfig {
    /// Create a configuration with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line grouping configuration.
    pub fn with_lines(mut self, lines: LineConfig) -> Self {
        self.lines = lines;
        self
    }

    /// Set the profiling configuration.
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    /// Set the title configuration.
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.title = title;
        self
    }

    /// Set the classifier configuration.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the hierarchy configuration.
    pub fn with_hierarchy(mut self, hierarchy: HierarchyConfig) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Set the builder configuration.
    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = builder;
        self
    }

    /// Set what happens to headings smaller than the deepest level's size.
    pub fn with_level_overflow(mut self, overflow: LevelOverflow) -> Self {
        self.hierarchy.overflow = overflow;
        self
    }

    /// Check that all thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        positive("lines.merge_tolerance", self.lines.merge_tolerance)?;
        non_negative("lines.space_gap_ratio", self.lines.space_gap_ratio)?;

        if !(self.profile.noise_page_ratio > 0.0 && self.profile.noise_page_ratio <= 1.0) {
            return Err(Error::InvalidConfig(
                "profile.noise_page_ratio must be in (0, 1]".to_string(),
            ));
        }
        if self.profile.noise_min_occurrences == 0 {
            return Err(Error::InvalidConfig(
                "profile.noise_min_occurrences must be at least 1".to_string(),
            ));
        }
        non_negative("profile.toc_line_ratio", self.profile.toc_line_ratio)?;

        if !(self.title.size_ratio > 0.0 && self.title.size_ratio <= 1.0) {
            return Err(Error::InvalidConfig(
                "title.size_ratio must be in (0, 1]".to_string(),
            ));
        }
        positive("title.gap_ratio", self.title.gap_ratio)?;

        positive("classifier.min_size_ratio", self.classifier.min_size_ratio)?;
        positive("classifier.size_floor_ratio", self.classifier.size_floor_ratio)?;
        positive(
            "classifier.all_caps_min_size_ratio",
            self.classifier.all_caps_min_size_ratio,
        )?;
        if self.classifier.max_words == 0 || self.classifier.all_caps_max_words == 0 {
            return Err(Error::InvalidConfig(
                "classifier word limits must be at least 1".to_string(),
            ));
        }

        if !(1..=4).contains(&self.hierarchy.max_levels) {
            return Err(Error::InvalidConfig(
                "hierarchy.max_levels must be between 1 and 4".to_string(),
            ));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must be positive", name)))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must not be negative", name)))
    }
}

/// Grouping of spans into visual lines.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum distance between vertical centres, as a fraction of the font
    /// size, for a span to join the current line
    pub merge_tolerance: f32,

    /// Horizontal gap, as a fraction of the average character width, above
    /// which a space is inserted between spans
    pub space_gap_ratio: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            merge_tolerance: 0.3,
            space_gap_ratio: 0.2,
        }
    }
}

/// Document profiling: body size, running headers/footers, ToC pages.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Documents with fewer pages than this get no noise detection
    pub noise_min_document_pages: usize,

    /// A signature must appear on at least `min(this, page_count)` pages
    pub noise_min_occurrences: usize,

    /// A signature must appear on at least this fraction of all pages
    pub noise_page_ratio: f32,

    /// Strip digits from noise signatures so "Page 3" matches "Page 4"
    pub strip_digits: bool,

    /// Exclude table-of-contents pages from heading candidacy
    pub skip_toc_pages: bool,

    /// A ToC page needs more than this many leader lines
    pub toc_min_lines: usize,

    /// A ToC page needs more than this fraction of its lines to be leader lines
    pub toc_line_ratio: f32,

    /// Leader lines longer than this many characters are ignored
    pub toc_max_line_chars: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            noise_min_document_pages: 4,
            noise_min_occurrences: 3,
            noise_page_ratio: 0.5,
            strip_digits: true,
            skip_toc_pages: true,
            toc_min_lines: 4,
            toc_line_ratio: 0.2,
            toc_max_line_chars: 100,
        }
    }
}

/// Title reconstruction on the cover page.
#[derive(Debug, Clone)]
pub struct TitleConfig {
    /// Lines at least this fraction of the largest cover size are title lines
    pub size_ratio: f32,

    /// Title lines closer than this many line heights form one block
    pub gap_ratio: f32,

    /// Collapse glyphs drawn several times over ("RRRReport") in the title
    pub repair_repeated_glyphs: bool,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            size_ratio: 0.9,
            gap_ratio: 1.5,
            repair_repeated_glyphs: false,
        }
    }
}

/// Heading acceptance rules.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Size ratio to body text that makes a line typographically distinct
    pub min_size_ratio: f32,

    /// Lines smaller than this ratio to body text are never headings
    pub size_floor_ratio: f32,

    /// Longest heading, in words
    pub max_words: usize,

    /// Lines ending in `.`, `!` or `?` with more words than this are sentences
    pub sentence_min_words: usize,

    /// Size floor for all-caps lines
    pub all_caps_min_size_ratio: f32,

    /// Longest all-caps heading, in words
    pub all_caps_max_words: usize,

    /// Reject lines made only of digits (bare page numbers)
    pub reject_numeric_only: bool,

    /// Reject numbered lines longer than this many words (list items)
    pub max_numbered_item_words: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_size_ratio: 1.05,
            size_floor_ratio: 1.0,
            max_words: 20,
            sentence_min_words: 12,
            all_caps_min_size_ratio: 0.95,
            all_caps_max_words: 25,
            reject_numeric_only: true,
            max_numbered_item_words: None,
        }
    }
}

/// What to do with headings smaller than the deepest level's font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOverflow {
    /// Leave them out of the outline
    #[default]
    Drop,
    /// Assign them the deepest level
    Clamp,
}

/// Mapping of heading font sizes to levels.
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Number of distinct sizes that get a level (1-4)
    pub max_levels: usize,

    /// Policy for sizes past the last level
    pub overflow: LevelOverflow,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_levels: 4,
            overflow: LevelOverflow::Drop,
        }
    }
}

/// Final outline assembly.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Drop headings whose text already appeared earlier in the outline
    pub dedupe_headings: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            dedupe_headings: true,
        }
    }
}
