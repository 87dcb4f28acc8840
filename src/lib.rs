//! # pdfoutline
//!
//! Heading outline extraction for PDF documents.
//!
//! The library reads the text spans of a PDF, infers a title and a
//! hierarchy of headings (H1–H4) from typography alone, and returns the
//! result as an [`Outline`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{outline_file, render, JsonFormat};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = outline_file("report.pdf")?;
//!     println!("{}", render::to_json(&outline, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Line grouping**: spans sharing a visual row become one line
//! - **Profiling**: body text size, running headers/footers, ToC pages
//! - **Cover page**: the title is rebuilt from the largest lines on page 1
//! - **Classification**: size, weight, numbering and shape decide headings
//! - **Hierarchy**: distinct heading sizes are ranked into H1..H4
//!
//! The pipeline also runs on spans from any other extractor, see
//! [`outline_spans`].

pub mod batch;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

pub use batch::{process_directory, BatchOptions, BatchReport};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use layout::{LevelOverflow, OutlineConfig, OutlinePipeline};
pub use model::{BBox, HeadingLevel, Outline, OutlineEntry, PageSpans, SpanDocument, TextSpan};
pub use parser::{ErrorMode, PageSelection, ParseOptions};
pub use render::JsonFormat;

use std::path::Path;

/// Infer the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_file;
///
/// let outline = outline_file("report.pdf").unwrap();
/// println!("{} ({} headings)", outline.title, outline.len());
/// ```
pub fn outline_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Outliner::new().file(path)
}

/// Infer the outline of an in-memory PDF.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_bytes;
///
/// let data = std::fs::read("report.pdf").unwrap();
/// let outline = outline_bytes(&data).unwrap();
/// ```
pub fn outline_bytes(data: &[u8]) -> Result<Outline> {
    Outliner::new().bytes(data)
}

/// Infer the outline of an already extracted document with default thresholds.
pub fn outline_spans(doc: &SpanDocument) -> Outline {
    OutlinePipeline::new().run(doc)
}

/// Builder for outlining documents with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{LevelOverflow, OutlineConfig, Outliner};
///
/// let outline = Outliner::new()
///     .with_config(OutlineConfig::new().with_level_overflow(LevelOverflow::Clamp))
///     .lenient()
///     .file("report.pdf")?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Outliner {
    config: OutlineConfig,
    parse_options: ParseOptions,
}

impl Outliner {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline thresholds.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Skip pages that fail to decode instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Restrict extraction to some pages; the first selected page is the cover.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Outline a PDF file.
    pub fn file<P: AsRef<Path>>(self, path: P) -> Result<Outline> {
        let pipeline = OutlinePipeline::with_config(self.config)?;
        let doc = parser::extract_file(path, self.parse_options)?;
        Ok(pipeline.run(&doc))
    }

    /// Outline an in-memory PDF.
    pub fn bytes(self, data: &[u8]) -> Result<Outline> {
        let pipeline = OutlinePipeline::with_config(self.config)?;
        let doc = parser::extract_bytes(data, self.parse_options)?;
        Ok(pipeline.run(&doc))
    }

    /// Outline an already extracted document.
    pub fn spans(self, doc: &SpanDocument) -> Result<Outline> {
        let pipeline = OutlinePipeline::with_config(self.config)?;
        Ok(pipeline.run(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outliner_builder() {
        let outliner = Outliner::new()
            .lenient()
            .with_pages(PageSelection::Range(1..=5))
            .with_config(OutlineConfig::new().with_level_overflow(LevelOverflow::Clamp));

        assert_eq!(outliner.parse_options.error_mode, ErrorMode::Lenient);
        assert_eq!(outliner.parse_options.pages, PageSelection::Range(1..=5));
        assert_eq!(outliner.config.hierarchy.overflow, LevelOverflow::Clamp);
    }

    #[test]
    fn test_outline_bytes_empty_data() {
        assert!(matches!(outline_bytes(&[]), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_outline_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(outline_bytes(&data).is_err());
    }

    #[test]
    fn test_outline_bytes_truncated_pdf() {
        // Valid header, no document body
        assert!(outline_bytes(b"%PDF-1.7\n%%EOF").is_err());
    }

    #[test]
    fn test_outline_file_missing() {
        assert!(matches!(
            outline_file("/nonexistent/report.pdf"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_outliner_rejects_invalid_config() {
        let mut config = OutlineConfig::default();
        config.hierarchy.max_levels = 0;
        let result = Outliner::new().with_config(config).spans(&SpanDocument::new());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_outline_spans_empty() {
        let outline = outline_spans(&SpanDocument::new());
        assert_eq!(outline, Outline::new());
    }
}
