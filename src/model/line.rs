//! Visual lines built from text spans.

use super::{BBox, TextSpan};

/// A text line composed of the spans sharing one visual row of a page.
///
/// Lines are built once by the line aggregator and never change afterwards;
/// all derived attributes are computed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    spans: Vec<TextSpan>,
    text: String,
    font_size: f32,
    is_bold: bool,
    page: u32,
    bbox: BBox,
    order_index: usize,
}

impl Line {
    /// Build a line from the spans of one row.
    ///
    /// Spans are ordered left to right. `space_gap_ratio` is the fraction of
    /// the average character width above which a horizontal gap between two
    /// spans is rendered as a space.
    pub fn from_spans(
        mut spans: Vec<TextSpan>,
        page: u32,
        order_index: usize,
        space_gap_ratio: f32,
    ) -> Self {
        spans.sort_by(|a, b| {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let text = join_spans(&spans, space_gap_ratio);
        let font_size = spans.iter().map(|s| s.font_size).fold(0.0_f32, f32::max);

        let bold_chars: usize = spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.char_count())
            .sum();
        let total_chars: usize = spans.iter().map(|s| s.char_count()).sum();
        let is_bold = total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5;

        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();

        Self {
            spans,
            text,
            font_size,
            is_bold,
            page,
            bbox,
            order_index,
        }
    }

    /// The spans in this line, left to right.
    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    /// The joined, trimmed text of the line.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Largest font size among the spans.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Whether most of the line's characters are bold.
    pub fn is_bold(&self) -> bool {
        self.is_bold
    }

    /// Page number (1-indexed).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Union of the span bounding boxes.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Position of the line in document reading order.
    pub fn order_index(&self) -> usize {
        self.order_index
    }

    /// Number of whitespace-delimited words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        self.spans.iter().map(|s| s.char_count()).sum()
    }
}

/// Join spans with spaces where the horizontal gap calls for one.
///
/// No space is inserted between two characters of a script that does not
/// separate words with spaces.
fn join_spans(spans: &[TextSpan], space_gap_ratio: f32) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i == 0 {
            result.push_str(&span.text);
            continue;
        }

        let prev = &spans[i - 1];
        let gap = span.bbox.x0 - prev.bbox.x1;

        let char_count = span.text.chars().count();
        let width = span.bbox.width();
        let avg_char_width = if char_count > 0 && width > 0.0 {
            width / char_count as f32
        } else {
            span.font_size * 0.5
        };

        let prev_last = prev.text.chars().last();
        let curr_first = span.text.chars().next();

        let both_spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
            && curr_first.map(is_spaceless_script_char).unwrap_or(false);
        let already_spaced = prev_last.map(char::is_whitespace).unwrap_or(false)
            || curr_first.map(char::is_whitespace).unwrap_or(false);

        if gap > avg_char_width * space_gap_ratio && !both_spaceless && !already_spaced {
            result.push(' ');
        }

        result.push_str(&span.text);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if a character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
