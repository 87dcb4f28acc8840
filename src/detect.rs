//! PDF format detection.
//!
//! Checks the `%PDF-x.y` header before a file is handed to the parser, so
//! batch runs can reject stray non-PDF files cheaply.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the header; some writers emit junk before it
    pub header_offset: usize,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Readers must accept a header anywhere in the first 1024 bytes.
const HEADER_SEARCH_LIMIT: usize = 1024;

/// Detect PDF format from a file path.
///
/// ```no_run
/// use pdfoutline::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.pdf").unwrap();
/// println!("PDF version: {}", format.version);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_SEARCH_LIMIT);
    file.take(HEADER_SEARCH_LIMIT as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect PDF format from the leading bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat {
        version,
        header_offset: offset,
    })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'1' | b'2')
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

/// Check if a file is a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Check for a `.pdf` extension, ignoring case.
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.header_offset, 0);
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_header_after_junk() {
        let mut data = b"\x00\x00garbage\n".to_vec();
        data.extend_from_slice(b"%PDF-2.0\n");
        let format = detect_format_from_bytes(&data).unwrap();
        assert_eq!(format.version, "2.0");
        assert_eq!(format.header_offset, 10);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_bad_version() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n1 0 obj"));
        assert!(!is_pdf_bytes(b"PK\x03\x04"));
        assert!(!is_pdf("/nonexistent/report.pdf"));
    }

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension("a/report.PDF"));
        assert!(has_pdf_extension("report.pdf"));
        assert!(!has_pdf_extension("report.pdf.json"));
        assert!(!has_pdf_extension("README"));
    }
}
