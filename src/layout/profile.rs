//! Document-wide typography profile: body size, running headers/footers
//! and table-of-contents pages.

use std::collections::{BTreeSet, HashMap, HashSet};

use regex::Regex;

use crate::model::Line;

use super::config::ProfileConfig;
use super::lines::{DocumentLines, PageLines};
use super::signature::Signature;
use super::{size_from_key, size_key};

/// Signatures of text repeated across pages (running headers and footers).
#[derive(Debug, Clone, Default)]
pub struct NoiseSet {
    signatures: HashSet<Signature>,
    verbatim: HashSet<Signature>,
    strip_digits: bool,
}

impl NoiseSet {
    /// Create an empty noise set.
    pub fn new(strip_digits: bool) -> Self {
        Self {
            signatures: HashSet::new(),
            verbatim: HashSet::new(),
            strip_digits,
        }
    }

    /// Signature of `text` under this set's normalization.
    pub fn signature(&self, text: &str) -> Signature {
        Signature::new(text, self.strip_digits)
    }

    /// Check if `text` is a running header or footer.
    pub fn contains_text(&self, text: &str) -> bool {
        !self.signatures.is_empty() && self.signatures.contains(&self.signature(text))
    }

    /// Check if a line is a running header or footer.
    pub fn contains(&self, line: &Line) -> bool {
        self.contains_text(line.text())
    }

    /// Check if a line repeats across pages with its digits intact.
    ///
    /// Without digit stripping this is the same as [`NoiseSet::contains`].
    pub fn contains_verbatim(&self, line: &Line) -> bool {
        if !self.strip_digits {
            return self.contains(line);
        }
        !self.verbatim.is_empty() && self.verbatim.contains(&Signature::exact(line.text()))
    }

    /// Add a signature.
    pub fn insert(&mut self, signature: Signature) {
        if !signature.is_empty() {
            self.signatures.insert(signature);
        }
    }

    /// Add a signature whose digits were kept.
    pub fn insert_verbatim(&mut self, signature: Signature) {
        if !signature.is_empty() {
            self.verbatim.insert(signature);
        }
    }

    /// Number of noise signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Check if no noise was detected.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Facts about the whole document, computed once before classification.
#[derive(Debug, Clone, Default)]
pub struct DocumentProfile {
    /// Dominant body font size; `None` when the document has no text
    pub body_size: Option<f32>,
    /// Distinct span font sizes (0.1pt precision), largest first
    pub distinct_sizes: Vec<f32>,
    /// Number of pages, including empty ones
    pub page_count: usize,
    /// Running headers and footers
    pub noise: NoiseSet,
    /// Pages recognized as a table of contents
    pub toc_pages: BTreeSet<u32>,
}

impl DocumentProfile {
    /// A profile with a single font size carries no size signal.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_sizes.len() <= 1
    }

    /// Check if a page was recognized as a table of contents.
    pub fn is_toc_page(&self, page: u32) -> bool {
        self.toc_pages.contains(&page)
    }

    /// Check if a line is a running header or footer.
    pub fn is_noise(&self, line: &Line) -> bool {
        self.noise.contains(line)
    }
}

/// Computes the [`DocumentProfile`] of a document.
pub struct DocumentProfiler<'a> {
    config: &'a ProfileConfig,
    toc: TocDetector,
}

impl<'a> DocumentProfiler<'a> {
    /// Create a new profiler.
    pub fn new(config: &'a ProfileConfig) -> Self {
        Self {
            config,
            toc: TocDetector::new(config),
        }
    }

    /// Profile a document.
    pub fn profile(&self, doc: &DocumentLines) -> DocumentProfile {
        let histogram = size_histogram(doc);
        let body_size = body_size(&histogram);

        let mut distinct_sizes: Vec<f32> = histogram.keys().map(|k| size_from_key(*k)).collect();
        distinct_sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let noise = self.detect_noise(doc);
        let toc_pages = if self.config.skip_toc_pages {
            self.detect_toc_pages(doc)
        } else {
            BTreeSet::new()
        };

        log::debug!(
            "profile: body size {:?}, {} distinct sizes, {} noise signatures, {} ToC pages",
            body_size,
            distinct_sizes.len(),
            noise.len(),
            toc_pages.len()
        );

        DocumentProfile {
            body_size,
            distinct_sizes,
            page_count: doc.page_count(),
            noise,
            toc_pages,
        }
    }

    fn detect_noise(&self, doc: &DocumentLines) -> NoiseSet {
        let mut noise = NoiseSet::new(self.config.strip_digits);
        let page_count = doc.page_count();
        if page_count < self.config.noise_min_document_pages {
            return noise;
        }

        let mut pages_by_signature: HashMap<Signature, HashSet<u32>> = HashMap::new();
        let mut pages_by_text: HashMap<Signature, HashSet<u32>> = HashMap::new();
        for page in &doc.pages {
            for line in &page.lines {
                let signature = noise.signature(line.text());
                if signature.is_empty() {
                    continue;
                }
                pages_by_signature
                    .entry(signature)
                    .or_default()
                    .insert(page.number);
                if self.config.strip_digits {
                    pages_by_text
                        .entry(Signature::exact(line.text()))
                        .or_default()
                        .insert(page.number);
                }
            }
        }

        let min_pages = self.config.noise_min_occurrences.min(page_count);
        let min_fraction = self.config.noise_page_ratio * page_count as f32;
        let repeated =
            |pages: &HashSet<u32>| pages.len() >= min_pages && pages.len() as f32 >= min_fraction;

        for (signature, pages) in pages_by_signature {
            if repeated(&pages) {
                noise.insert(signature);
            }
        }
        for (signature, pages) in pages_by_text {
            if repeated(&pages) {
                noise.insert_verbatim(signature);
            }
        }

        noise
    }

    fn detect_toc_pages(&self, doc: &DocumentLines) -> BTreeSet<u32> {
        let toc_pages: BTreeSet<u32> = doc
            .pages
            .iter()
            .filter(|page| self.toc.is_toc_page(page))
            .map(|page| page.number)
            .collect();

        // When every page after the cover looks like a ToC, keep them all
        let content_pages = doc.pages.iter().skip(1).filter(|p| !p.lines.is_empty());
        let mut content_pages = content_pages.peekable();
        if content_pages.peek().is_some()
            && content_pages.all(|p| toc_pages.contains(&p.number))
        {
            log::debug!("profile: every content page looks like a ToC, ignoring ToC detection");
            return BTreeSet::new();
        }

        toc_pages
    }
}

/// Recognizes table-of-contents pages by their dotted-leader lines.
pub struct TocDetector {
    leader_line: Regex,
    min_lines: usize,
    line_ratio: f32,
    max_line_chars: usize,
}

impl TocDetector {
    /// Create a detector using the thresholds in `config`.
    pub fn new(config: &ProfileConfig) -> Self {
        Self {
            leader_line: Regex::new(r"^.+?(?:[.·…_]{2,}|\s)\s*\d{1,4}$")
                .expect("static ToC pattern"),
            min_lines: config.toc_min_lines,
            line_ratio: config.toc_line_ratio,
            max_line_chars: config.toc_max_line_chars,
        }
    }

    /// Check if a single line looks like a ToC entry ("Introduction ..... 3").
    pub fn is_leader_line(&self, text: &str) -> bool {
        text.chars().count() < self.max_line_chars && self.leader_line.is_match(text)
    }

    /// Check if a page is a table of contents.
    pub fn is_toc_page(&self, page: &PageLines) -> bool {
        let total = page.lines.len();
        let leaders = page
            .lines
            .iter()
            .filter(|line| self.is_leader_line(line.text()))
            .count();
        leaders > self.min_lines && leaders as f32 > total as f32 * self.line_ratio
    }
}

/// Character count per quantized span font size.
fn size_histogram(doc: &DocumentLines) -> HashMap<i32, usize> {
    let mut histogram: HashMap<i32, usize> = HashMap::new();
    for line in doc.lines() {
        for span in line.spans() {
            let chars = span.char_count();
            if chars == 0 || !(span.font_size > 0.0) {
                continue;
            }
            *histogram.entry(size_key(span.font_size)).or_insert(0) += chars;
        }
    }
    histogram
}

/// Size covering the most characters; ties go to the smaller size.
fn body_size(histogram: &HashMap<i32, usize>) -> Option<f32> {
    histogram
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(key, _)| size_from_key(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LineConfig;
    use crate::layout::lines::LineAggregator;
    use crate::model::{BBox, SpanDocument, TextSpan};

    fn span(text: &str, top: f32, size: f32) -> TextSpan {
        let width = text.chars().count() as f32 * size * 0.5;
        TextSpan::new(text, size, false, BBox::new(72.0, top, 72.0 + width, top + size), 1)
    }

    fn lines(pages: Vec<Vec<TextSpan>>) -> DocumentLines {
        let config = LineConfig::default();
        LineAggregator::new(&config).aggregate(&SpanDocument::from_pages(pages))
    }

    #[test]
    fn test_body_size_is_weighted_mode() {
        // Many short 16pt lines, one long 10pt paragraph line
        let doc = lines(vec![vec![
            span("A", 50.0, 16.0),
            span("B", 80.0, 16.0),
            span("C", 110.0, 16.0),
            span("This is the body text of the document", 140.0, 10.0),
        ]]);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert_eq!(profile.body_size, Some(10.0));
        assert_eq!(profile.distinct_sizes, vec![16.0, 10.0]);
        assert!(!profile.is_degenerate());
    }

    #[test]
    fn test_body_size_tie_prefers_smaller() {
        let doc = lines(vec![vec![span("abcd", 50.0, 12.0), span("wxyz", 80.0, 11.0)]]);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert_eq!(profile.body_size, Some(11.0));
    }

    #[test]
    fn test_empty_document_has_no_body_size() {
        let doc = lines(vec![vec![], vec![]]);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert_eq!(profile.body_size, None);
        assert_eq!(profile.page_count, 2);
        assert!(profile.is_degenerate());
    }

    #[test]
    fn test_footer_detected_as_noise() {
        let pages: Vec<Vec<TextSpan>> = (1..=5)
            .map(|n| {
                vec![
                    span(&format!("Unique body text {}", n * 7), 100.0, 10.0),
                    span(&format!("Confidential — Page {}", n), 760.0, 8.0),
                ]
            })
            .collect();
        let doc = lines(pages);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);

        assert!(profile.noise.contains_text("Confidential — Page 99"));
        // Digits are stripped, so the numbered body lines share a signature too
        assert!(profile.noise.contains_text("Unique body text 14"));
        assert_eq!(profile.noise.len(), 2);
    }

    #[test]
    fn test_no_noise_in_short_documents() {
        let pages: Vec<Vec<TextSpan>> = (1..=3)
            .map(|_| vec![span("Running header", 40.0, 9.0)])
            .collect();
        let doc = lines(pages);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert!(profile.noise.is_empty());
    }

    #[test]
    fn test_noise_needs_half_the_pages() {
        let mut pages: Vec<Vec<TextSpan>> = (1..=8).map(|_| vec![span("filler", 100.0, 10.0)]).collect();
        for page in pages.iter_mut().take(3) {
            page.push(span("Draft", 40.0, 9.0));
        }
        let doc = lines(pages);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert!(!profile.noise.contains_text("Draft"));
        assert!(profile.noise.contains_text("filler"));
    }

    fn occurrence_pages(page_count: usize, marked: usize) -> DocumentLines {
        let pages: Vec<Vec<TextSpan>> = (0..page_count)
            .map(|i| {
                let text = format!("Distinct paragraph {}", "x".repeat(i + 1));
                let mut page = vec![span(&text, 100.0, 10.0)];
                if i < marked {
                    page.push(span("Internal use only", 40.0, 9.0));
                }
                page
            })
            .collect();
        lines(pages)
    }

    #[test]
    fn test_noise_at_exactly_half_the_pages() {
        let config = ProfileConfig::default();
        let profiler = DocumentProfiler::new(&config);

        assert!(profiler.profile(&occurrence_pages(8, 4)).noise.contains_text("Internal use only"));
        assert!(!profiler.profile(&occurrence_pages(8, 3)).noise.contains_text("Internal use only"));
    }

    #[test]
    fn test_noise_occurrence_floor() {
        let config = ProfileConfig::default();
        let profiler = DocumentProfiler::new(&config);

        // Half of four pages, but fewer than three occurrences
        assert!(!profiler.profile(&occurrence_pages(4, 2)).noise.contains_text("Internal use only"));
        assert!(profiler.profile(&occurrence_pages(4, 3)).noise.contains_text("Internal use only"));
    }

    #[test]
    fn test_verbatim_repeats_tracked_separately() {
        let pages: Vec<Vec<TextSpan>> = (1..=5)
            .map(|n| {
                vec![
                    span(&format!("Chapter {}", n), 80.0, 16.0),
                    span("Acme Corporation", 40.0, 9.0),
                ]
            })
            .collect();
        let doc = lines(pages);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);

        let chapter = &doc.pages[1].lines[1];
        let company = &doc.pages[1].lines[0];
        assert_eq!(chapter.text(), "Chapter 2");
        assert!(profile.is_noise(chapter));
        assert!(!profile.noise.contains_verbatim(chapter));
        assert!(profile.noise.contains_verbatim(company));
    }

    #[test]
    fn test_toc_leader_lines() {
        let config = ProfileConfig::default();
        let detector = TocDetector::new(&config);
        assert!(detector.is_leader_line("1. Introduction ........ 3"));
        assert!(detector.is_leader_line("Background 12"));
        assert!(!detector.is_leader_line("Introduction"));
        assert!(!detector.is_leader_line("12"));
    }

    #[test]
    fn test_toc_page_detected() {
        let toc: Vec<TextSpan> = (0..6)
            .map(|i| span(&format!("Section {} ....... {}", i + 1, i + 3), 100.0 + i as f32 * 20.0, 10.0))
            .collect();
        let doc = lines(vec![
            vec![span("Cover", 100.0, 24.0)],
            toc,
            vec![span("Body text", 100.0, 10.0)],
        ]);
        let config = ProfileConfig::default();
        let profile = DocumentProfiler::new(&config).profile(&doc);
        assert!(profile.is_toc_page(2));
        assert!(!profile.is_toc_page(3));
    }
}
