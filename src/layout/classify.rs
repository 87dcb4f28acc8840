//! Heading classification of individual lines.

use regex::Regex;

use crate::model::Line;

use super::config::ClassifierConfig;
use super::cover::CoverIgnoreSet;
use super::lines::DocumentLines;
use super::profile::DocumentProfile;
use super::{size_from_key, size_key};

/// A line accepted as a heading, before a level is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Heading text
    pub text: String,
    /// Font size (0.1pt precision)
    pub font_size: f32,
    /// Whether the line is bold
    pub is_bold: bool,
    /// Page number (1-indexed)
    pub page: u32,
    /// Position in document reading order
    pub order_index: usize,
}

impl HeadingCandidate {
    fn from_line(line: &Line) -> Self {
        Self {
            text: line.text().to_string(),
            font_size: size_from_key(size_key(line.font_size())),
            is_bold: line.is_bold(),
            page: line.page(),
            order_index: line.order_index(),
        }
    }
}

/// Typographic and structural signals of one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFeatures {
    /// Line size over body size, both at 0.1pt precision
    pub size_ratio: f32,
    /// Whitespace-separated words
    pub word_count: usize,
    /// Whether the line is bold
    pub is_bold: bool,
    /// Every letter is uppercase (and there is at least one)
    pub is_all_caps: bool,
    /// Starts with a section number, a chapter-style label or a Roman numeral
    pub is_numbered: bool,
    /// Long line ending in sentence punctuation
    pub sentence_penalty: bool,
    /// Only digits, e.g. a bare page number
    pub is_numeric_only: bool,
}

/// Decides which lines are headings.
pub struct HeadingClassifier<'a> {
    config: &'a ClassifierConfig,
    numbered: Regex,
    label: Regex,
    roman: Regex,
}

impl<'a> HeadingClassifier<'a> {
    /// Create a new classifier.
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self {
            config,
            numbered: Regex::new(r"^\d+(?:\.\d+)*(?:[.):]\s*|\s+)[^\s\d]")
                .expect("static numbering pattern"),
            label: Regex::new(r"(?i)^(?:chapter|appendix|section|part)\s+(?:\d+|[ivxlc]+|[a-z])\b")
                .expect("static label pattern"),
            roman: Regex::new(r"^[IVXLC]+\.\s+\S").expect("static roman pattern"),
        }
    }

    /// Scan pages 2..N and return the accepted headings in reading order.
    pub fn classify(
        &self,
        doc: &DocumentLines,
        profile: &DocumentProfile,
        ignore: &CoverIgnoreSet,
    ) -> Vec<HeadingCandidate> {
        let body_size = match profile.body_size {
            Some(size) if size > 0.0 => size,
            _ => return Vec::new(),
        };
        let degenerate = profile.is_degenerate();

        let mut candidates = Vec::new();
        let mut scanned = 0;

        for page in doc.pages.iter().skip(1) {
            if profile.is_toc_page(page.number) {
                log::debug!("classify: skipping ToC page {}", page.number);
                continue;
            }

            for line in &page.lines {
                scanned += 1;
                if ignore.contains(line) {
                    continue;
                }

                let features = self.features(line, body_size);
                if profile.is_noise(line) && !self.is_numbered_heading(line, &features, profile) {
                    continue;
                }
                if self.accepts(&features, degenerate) {
                    candidates.push(HeadingCandidate::from_line(line));
                }
            }
        }

        log::debug!(
            "classify: {} of {} lines accepted as headings",
            candidates.len(),
            scanned
        );

        candidates
    }

    /// Compute the signals of a line against the body size.
    pub fn features(&self, line: &Line, body_size: f32) -> LineFeatures {
        let text = line.text();
        let word_count = line.word_count();
        let line_size = size_from_key(size_key(line.font_size()));

        LineFeatures {
            size_ratio: line_size / body_size,
            word_count,
            is_bold: line.is_bold(),
            is_all_caps: is_all_caps(text),
            is_numbered: self.is_numbered(text),
            sentence_penalty: text.ends_with(['.', '!', '?'])
                && word_count > self.config.sentence_min_words,
            is_numeric_only: is_numeric_only(text),
        }
    }

    /// Apply the acceptance rules.
    pub fn accepts(&self, f: &LineFeatures, degenerate: bool) -> bool {
        if f.sentence_penalty {
            return false;
        }
        if self.config.reject_numeric_only && f.is_numeric_only {
            return false;
        }
        if let Some(max_words) = self.config.max_numbered_item_words {
            if f.is_numbered && f.word_count > max_words {
                return false;
            }
        }

        if f.is_all_caps
            && (degenerate || f.size_ratio >= self.config.all_caps_min_size_ratio)
            && f.word_count <= self.config.all_caps_max_words
        {
            return true;
        }

        let larger = !degenerate && f.size_ratio >= self.config.min_size_ratio;
        let distinct = larger || f.is_bold || f.is_numbered;
        let above_floor = degenerate || f.size_ratio >= self.config.size_floor_ratio;

        distinct && above_floor && f.word_count <= self.config.max_words
    }

    /// A styled numbered line whose text never repeats verbatim.
    ///
    /// "Chapter 1" .. "Chapter 5" share a digit-stripped signature with a
    /// running "Page N" footer; only the number tells them apart.
    fn is_numbered_heading(
        &self,
        line: &Line,
        f: &LineFeatures,
        profile: &DocumentProfile,
    ) -> bool {
        f.is_numbered
            && (f.is_bold || f.size_ratio >= self.config.min_size_ratio)
            && !profile.noise.contains_verbatim(line)
    }

    /// Check for a section number, a chapter-style label or a Roman numeral.
    pub fn is_numbered(&self, text: &str) -> bool {
        self.numbered.is_match(text) || self.label.is_match(text) || self.roman.is_match(text)
    }
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn is_numeric_only(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace()).peekable();
    chars.peek().is_some() && chars.all(|c| c.is_ascii_digit())
}
