//! PDF span extraction.

mod backend;
mod extractor;
mod options;

pub use backend::{
    decode_text_simple, get_number_from_value, BackendFontInfo, ContentOp, LopdfBackend,
    PageId, PdfBackend, PdfValue, DEFAULT_PAGE_SIZE,
};
pub use extractor::SpanExtractor;
pub use options::{ErrorMode, PageSelection, ParseOptions};

use std::path::Path;

use crate::detect::detect_format_from_bytes;
use crate::error::Result;
use crate::model::SpanDocument;

/// Extract the spans of a PDF file.
pub fn extract_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<SpanDocument> {
    let data = std::fs::read(path.as_ref())?;
    extract_bytes(&data, options)
}

/// Extract the spans of an in-memory PDF.
pub fn extract_bytes(data: &[u8], options: ParseOptions) -> Result<SpanDocument> {
    let format = detect_format_from_bytes(data)?;
    log::debug!("detected {}", format);

    let backend = LopdfBackend::load_bytes(data)?;
    SpanExtractor::with_options(backend, options).extract()
}
