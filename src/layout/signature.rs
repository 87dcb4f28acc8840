//! Normalized text keys for matching lines across pages.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// A normalized text key.
///
/// Two lines with the same signature are treated as the same text, no
/// matter which page they sit on or how their whitespace was extracted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    /// Signature of `text`, optionally with all digits removed.
    pub fn new(text: &str, strip_digits: bool) -> Self {
        if strip_digits {
            let without_digits: String = text.chars().filter(|c| !c.is_numeric()).collect();
            Signature(normalize_text(&without_digits))
        } else {
            Signature(normalize_text(text))
        }
    }

    /// Signature that keeps digits.
    pub fn exact(text: &str) -> Self {
        Self::new(text, false)
    }

    /// The normalized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether nothing is left of the text after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// NFKC-normalize, lowercase and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Annual   REPORT\t2024 "), "annual report 2024");
        // Ligature folds under NFKC
        assert_eq!(normalize_text("\u{FB01}nal"), "final");
    }

    #[test]
    fn test_signature_strips_digits() {
        let a = Signature::new("Confidential — Page 3", true);
        let b = Signature::new("Confidential —  Page 14", true);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "confidential — page");

        let exact = Signature::exact("Page 3");
        assert_ne!(exact, Signature::exact("Page 4"));
    }

    #[test]
    fn test_signature_empty_for_page_numbers() {
        assert!(Signature::new(" 12 ", true).is_empty());
        assert!(!Signature::exact("12").is_empty());
    }
}
