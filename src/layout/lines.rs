//! Grouping of text spans into visual lines.

use crate::model::{Line, PageSpans, SpanDocument, TextSpan};

use super::config::LineConfig;

/// The lines of one page, top to bottom.
#[derive(Debug, Clone, Default)]
pub struct PageLines {
    /// Page number (1-indexed)
    pub number: u32,
    /// Lines in reading order
    pub lines: Vec<Line>,
}

/// All lines of a document, page-major.
#[derive(Debug, Clone, Default)]
pub struct DocumentLines {
    /// Pages in document order, including pages without lines
    pub pages: Vec<PageLines>,
}

impl DocumentLines {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The cover page, i.e. the first page of the document.
    pub fn cover(&self) -> Option<&PageLines> {
        self.pages.first()
    }

    /// Every line in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }

    /// Check if the document has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }
}

/// Groups spans sharing a visual row into [`Line`]s.
pub struct LineAggregator<'a> {
    config: &'a LineConfig,
}

impl<'a> LineAggregator<'a> {
    /// Create a new aggregator.
    pub fn new(config: &'a LineConfig) -> Self {
        Self { config }
    }

    /// Build the lines of every page, numbering them in reading order
    /// across the whole document.
    pub fn aggregate(&self, doc: &SpanDocument) -> DocumentLines {
        let mut next_index = 0;
        let pages = doc
            .pages
            .iter()
            .map(|page| self.aggregate_page(page, &mut next_index))
            .collect();
        DocumentLines { pages }
    }

    /// Build the lines of a single page, starting at `next_index`.
    pub fn aggregate_page(&self, page: &PageSpans, next_index: &mut usize) -> PageLines {
        let lines = self
            .group_rows(&page.spans)
            .into_iter()
            .map(|row| {
                let line = Line::from_spans(
                    row,
                    page.number,
                    *next_index,
                    self.config.space_gap_ratio,
                );
                *next_index += 1;
                line
            })
            .collect();

        PageLines {
            number: page.number,
            lines,
        }
    }

    /// Split spans into rows, top to bottom.
    fn group_rows(&self, spans: &[TextSpan]) -> Vec<Vec<TextSpan>> {
        let mut spans: Vec<TextSpan> = spans.iter().filter(|s| !s.is_blank()).cloned().collect();
        if spans.is_empty() {
            return vec![];
        }

        spans.sort_by(|a, b| {
            let y_cmp = a
                .bbox
                .y0
                .partial_cmp(&b.bbox.y0)
                .unwrap_or(std::cmp::Ordering::Equal);
            if y_cmp == std::cmp::Ordering::Equal {
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else {
                y_cmp
            }
        });

        let mut rows: Vec<Vec<TextSpan>> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_center = 0.0_f32;

        for span in spans {
            let center = span.bbox.center_y();
            let tolerance = span.font_size.max(1.0) * self.config.merge_tolerance;

            if !current.is_empty() && (center - current_center).abs() <= tolerance {
                // Running mean keeps a slightly sloped row together
                let n = current.len() as f32;
                current_center = (current_center * n + center) / (n + 1.0);
                current.push(span);
            } else {
                if !current.is_empty() {
                    rows.push(std::mem::take(&mut current));
                }
                current_center = center;
                current.push(span);
            }
        }

        if !current.is_empty() {
            rows.push(current);
        }

        rows
    }
}
