//! Text spans and the per-page span document consumed by the pipeline.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the top edge and `y1` the bottom edge; y grows toward the
/// bottom of the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Vertical centre of the box.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A run of text with uniform style, as produced by a PDF extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font is bold
    pub is_bold: bool,
    /// Bounding box on the page
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        is_bold: bool,
        bbox: BBox,
        page: u32,
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            bbox,
            page,
        }
    }

    /// Create a span whose boldness is inferred from a font name
    /// (e.g. "Helvetica-Bold").
    pub fn with_font_name(
        text: impl Into<String>,
        font_size: f32,
        font_name: &str,
        bbox: BBox,
        page: u32,
    ) -> Self {
        Self::new(text, font_size, is_bold_font_name(font_name), bbox, page)
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Check whether a font name denotes a bold face.
pub fn is_bold_font_name(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
        || lower.contains("semibold")
        || lower.contains("demi")
}

/// The spans of one page, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpans {
    /// Page number (1-indexed)
    pub number: u32,
    /// Spans on this page
    pub spans: Vec<TextSpan>,
}

impl PageSpans {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            spans: Vec::new(),
        }
    }

    /// Create a page from its spans.
    pub fn with_spans(number: u32, spans: Vec<TextSpan>) -> Self {
        Self { number, spans }
    }
}

/// A whole document as an ordered sequence of pages of spans.
///
/// The first page is treated as the cover page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanDocument {
    /// Pages in reading order
    pub pages: Vec<PageSpans>,
}

impl SpanDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from per-page span lists, numbering pages from 1.
    pub fn from_pages(pages: Vec<Vec<TextSpan>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, spans)| PageSpans::with_spans(i as u32 + 1, spans))
                .collect(),
        }
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageSpans) {
        self.pages.push(page);
    }

    /// Number of pages, including pages without text.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of spans across all pages.
    pub fn span_count(&self) -> usize {
        self.pages.iter().map(|p| p.spans.len()).sum()
    }
}
