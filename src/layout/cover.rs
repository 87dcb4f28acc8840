//! Title reconstruction from the cover page.

use std::collections::HashSet;

use regex::Regex;

use crate::model::Line;

use super::config::TitleConfig;
use super::lines::DocumentLines;
use super::profile::DocumentProfile;
use super::signature::Signature;

/// The reconstructed document title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleResult {
    /// Title text, empty when none was found
    pub text: String,
    /// Order indices of the cover lines the title was built from
    pub source_lines: Vec<usize>,
}

impl TitleResult {
    /// Check if no title was found.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Styled cover-page lines that must never become headings.
#[derive(Debug, Clone, Default)]
pub struct CoverIgnoreSet {
    signatures: HashSet<Signature>,
}

impl CoverIgnoreSet {
    /// Create an empty ignore set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the text of a cover line.
    pub fn insert(&mut self, text: &str) {
        let signature = Signature::exact(text);
        if !signature.is_empty() {
            self.signatures.insert(signature);
        }
    }

    /// Check if `text` matches a styled cover line.
    pub fn contains_text(&self, text: &str) -> bool {
        !self.signatures.is_empty() && self.signatures.contains(&Signature::exact(text))
    }

    /// Check if a line matches a styled cover line.
    pub fn contains(&self, line: &Line) -> bool {
        self.contains_text(line.text())
    }

    /// Number of ignored signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Extracts the title and the ignore set from page 1.
pub struct CoverPageExtractor<'a> {
    config: &'a TitleConfig,
    colon_spacing: Regex,
}

impl<'a> CoverPageExtractor<'a> {
    /// Create a new extractor.
    pub fn new(config: &'a TitleConfig) -> Self {
        Self {
            config,
            colon_spacing: Regex::new(r"\s*:\s*").expect("static colon pattern"),
        }
    }

    /// Reconstruct the title and collect the styled cover lines to ignore.
    pub fn extract(
        &self,
        doc: &DocumentLines,
        profile: &DocumentProfile,
    ) -> (TitleResult, CoverIgnoreSet) {
        let mut ignore = CoverIgnoreSet::new();
        let lines: &[Line] = match doc.cover() {
            Some(page) if !page.lines.is_empty() => &page.lines,
            _ => return (TitleResult::default(), ignore),
        };

        let body_size = profile.body_size.unwrap_or(f32::INFINITY);
        if !lines.iter().any(|l| l.font_size() > body_size) {
            return (self.largest_line(lines), ignore);
        }

        let max_size = lines.iter().map(|l| l.font_size()).fold(0.0_f32, f32::max);
        let threshold = max_size * self.config.size_ratio;

        let title_lines: Vec<&Line> = lines
            .iter()
            .filter(|l| l.font_size() >= threshold && !profile.is_noise(l))
            .collect();
        let block = self.first_block(&title_lines);

        for line in lines {
            if block.contains(&line.order_index()) {
                continue;
            }
            if line.font_size() > body_size {
                ignore.insert(line.text());
            }
        }

        let text = title_lines
            .iter()
            .filter(|l| block.contains(&l.order_index()))
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ");

        let title = TitleResult {
            text: self.finish(&text),
            source_lines: block,
        };

        log::debug!(
            "cover: title {:?} from {} lines, {} cover lines ignored",
            title.text,
            title.source_lines.len(),
            ignore.len()
        );

        (title, ignore)
    }

    /// Order indices of the first vertically contiguous run of title lines.
    fn first_block(&self, title_lines: &[&Line]) -> Vec<usize> {
        let mut block = Vec::new();
        let mut prev: Option<&Line> = None;

        for line in title_lines {
            if let Some(prev) = prev {
                let gap = line.bbox().y0 - prev.bbox().y1;
                let limit = prev.bbox().height().max(prev.font_size()) * self.config.gap_ratio;
                if gap >= limit {
                    break;
                }
            }
            block.push(line.order_index());
            prev = Some(line);
        }

        block
    }

    /// Fallback when nothing on the cover stands out from body text.
    fn largest_line(&self, lines: &[Line]) -> TitleResult {
        let mut best: Option<&Line> = None;
        for line in lines {
            match best {
                Some(b) if line.font_size() <= b.font_size() => {}
                _ => best = Some(line),
            }
        }

        match best {
            Some(line) => TitleResult {
                text: self.finish(line.text()),
                source_lines: vec![line.order_index()],
            },
            None => TitleResult::default(),
        }
    }

    fn finish(&self, text: &str) -> String {
        if self.config.repair_repeated_glyphs {
            self.repair_glyphs(text)
        } else {
            text.trim().to_string()
        }
    }

    /// Undo fake-bold rendering where every glyph is drawn several times,
    /// e.g. "RRRRFFFFPPPP" becomes "RFP".
    pub fn repair_glyphs(&self, text: &str) -> String {
        let collapsed = collapse_repeats(text, 3);
        self.colon_spacing
            .replace_all(&collapsed, ": ")
            .trim()
            .to_string()
    }
}

/// Collapse runs of at least `min_run` identical characters to one.
fn collapse_repeats(text: &str, min_run: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        if run >= min_run {
            result.push(c);
        } else {
            result.extend(std::iter::repeat(c).take(run));
        }
        i += run;
    }

    result
}
