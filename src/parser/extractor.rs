//! Span extraction from page content streams.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{is_bold_font_name, is_spaceless_script_char, BBox, PageSpans, SpanDocument, TextSpan};

use super::backend::{
    get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue, DEFAULT_PAGE_SIZE,
};
use super::options::{ErrorMode, PageSelection, ParseOptions};

/// Estimated glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f32 = 0.5;

/// TJ adjustments beyond this (thousandths of an em) are read as word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Extracts positioned, styled text spans from every selected page.
pub struct SpanExtractor<B: PdfBackend> {
    backend: B,
    options: ParseOptions,
}

impl<B: PdfBackend> SpanExtractor<B> {
    /// Create an extractor with default options.
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, ParseOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(backend: B, options: ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Extract the spans of all selected pages.
    ///
    /// In lenient mode a page that fails to decode is kept as an empty page
    /// so page numbers stay aligned.
    pub fn extract(&self) -> Result<SpanDocument> {
        let pages = self.backend.pages();
        let total = pages.len() as u32;
        self.check_selection(total)?;

        let mut doc = SpanDocument::new();
        for (&number, &page_id) in &pages {
            if !self.options.pages.includes(number) {
                continue;
            }

            match self.extract_page(number, page_id) {
                Ok(page) => doc.add_page(page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", number, e);
                    doc.add_page(PageSpans::new(number));
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "extracted {} spans from {} of {} pages",
            doc.span_count(),
            doc.page_count(),
            total
        );

        Ok(doc)
    }

    /// Extract the spans of one page.
    pub fn extract_page(&self, number: u32, page_id: PageId) -> Result<PageSpans> {
        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name, f.base_font))
            .collect();

        let (_, page_height) = match self.backend.page_size(page_id) {
            Ok(size) => size,
            Err(e) => {
                log::debug!("page {}: {}, assuming Letter", number, e);
                DEFAULT_PAGE_SIZE
            }
        };

        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;

        let mut state = TextState::new(number, page_height, &fonts);
        for op in &ops {
            state.apply(op, |font, bytes| self.backend.decode_text(page_id, font, bytes));
        }

        Ok(PageSpans::with_spans(number, state.spans))
    }

    fn check_selection(&self, total: u32) -> Result<()> {
        let out_of_range = match &self.options.pages {
            PageSelection::All => None,
            PageSelection::Range(range) => Some(*range.start()).filter(|p| *p > total),
            PageSelection::Pages(pages) => pages.iter().copied().find(|p| *p > total),
        };

        match out_of_range {
            Some(page) if self.options.error_mode == ErrorMode::Strict => {
                Err(Error::PageOutOfRange(page, total))
            }
            Some(page) => {
                log::warn!("Page {} is out of range (document has {} pages)", page, total);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// A 2D affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6]
            .iter()
            .map(|v| get_number_from_value(v).unwrap_or(0.0))
            .collect();
        Some(Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Pre-multiply by a translation.
    fn translate(&self, tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    /// Length of the transformed y unit vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics and text state while walking one content stream.
struct TextState<'a> {
    page: u32,
    page_height: f32,
    fonts: &'a HashMap<Vec<u8>, String>,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: Option<f32>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a> TextState<'a> {
    fn new(page: u32, page_height: f32, fonts: &'a HashMap<Vec<u8>, String>) -> Self {
        Self {
            page,
            page_height,
            fonts,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: None,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply<F>(&mut self, op: &ContentOp, decode: F)
    where
        F: Fn(&[u8], &[u8]) -> String,
    {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = operands.first() {
                    self.font_name = self
                        .fonts
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                    self.font_resource = name.clone();
                }
                if let Some(size) = operands.get(1).and_then(get_number_from_value) {
                    self.font_size = size;
                }
            }
            "TL" => self.leading = operands.first().and_then(get_number_from_value),
            "Td" | "TD" => {
                let tx = operands.first().and_then(get_number_from_value).unwrap_or(0.0);
                let ty = operands.get(1).and_then(get_number_from_value).unwrap_or(0.0);
                if op.operator == "TD" {
                    self.leading = Some(-ty);
                }
                self.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    let text = decode(&self.font_resource, bytes);
                    self.show(text, 0.0);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = operands.first() {
                    let (text, adjustment) = self.join_tj(items, &decode);
                    self.show(text, adjustment);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    let text = decode(&self.font_resource, bytes);
                    self.show(text, 0.0);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = operands.get(2) {
                    let text = decode(&self.font_resource, bytes);
                    self.show(text, 0.0);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.translate(tx, ty);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading.unwrap_or(self.font_size * 1.2);
        self.move_line(0.0, -leading);
    }

    /// Concatenate a TJ array, returning the text and the total horizontal
    /// adjustment in thousandths of an em.
    fn join_tj<F>(&self, items: &[PdfValue], decode: &F) -> (String, f32)
    where
        F: Fn(&[u8], &[u8]) -> String,
    {
        let mut combined = String::new();
        let mut adjustment = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&decode(&self.font_resource, bytes)),
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let n = get_number_from_value(item).unwrap_or(0.0);
                    adjustment += n;
                    // Negative values advance to the right; large ones are word gaps
                    if -n > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        (combined, adjustment)
    }

    /// Emit a span for `text` at the current position and advance past it.
    fn show(&mut self, text: String, tj_adjustment: f32) {
        let chars = text.chars().count() as f32;
        let advance = chars * self.font_size * GLYPH_WIDTH_RATIO - tj_adjustment / 1000.0 * self.font_size;

        if self.in_text && !text.trim().is_empty() {
            let rendering = self.text_matrix.multiply(&self.ctm);
            let size = self.font_size * rendering.vertical_scale();
            let x0 = rendering.e;
            let baseline = self.page_height - rendering.f;
            let width = chars * size * GLYPH_WIDTH_RATIO;

            self.spans.push(TextSpan::new(
                text,
                size,
                is_bold_font_name(&self.font_name),
                BBox::new(x0, baseline - size, x0 + width, baseline),
                self.page,
            ));
        }

        self.text_matrix = self.text_matrix.translate(advance, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::backend::{decode_text_simple, BackendFontInfo};
    use std::collections::BTreeMap;

    fn num(n: f32) -> PdfValue {
        PdfValue::Real(n)
    }

    fn text(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn run(ops: &[ContentOp]) -> Vec<TextSpan> {
        let mut fonts = HashMap::new();
        fonts.insert(b"F1".to_vec(), "Helvetica".to_string());
        fonts.insert(b"F2".to_vec(), "ABCDEF+Helvetica-Bold".to_string());

        let mut state = TextState::new(1, 792.0, &fonts);
        for op in ops {
            state.apply(op, |_, bytes| decode_text_simple(bytes));
        }
        state.spans
    }

    #[test]
    fn test_td_positions_flip_y() {
        let spans = run(&[
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F2".to_vec()), num(18.0)]),
            ContentOp::new("Td", vec![num(72.0), num(700.0)]),
            ContentOp::new("Tj", vec![text("Title")]),
            ContentOp::new("ET", vec![]),
        ]);

        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.text, "Title");
        assert_eq!(span.font_size, 18.0);
        assert!(span.is_bold);
        assert_eq!(span.bbox.x0, 72.0);
        assert_eq!(span.bbox.y1, 92.0);
        assert_eq!(span.bbox.y0, 74.0);
        assert_eq!(span.bbox.width(), 45.0);
    }

    #[test]
    fn test_tm_scales_font_size() {
        let spans = run(&[
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(1.0)]),
            ContentOp::new(
                "Tm",
                vec![num(12.0), num(0.0), num(0.0), num(12.0), num(100.0), num(500.0)],
            ),
            ContentOp::new("Tj", vec![text("Body")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].font_size, 12.0);
        assert!(!spans[0].is_bold);
        assert_eq!(spans[0].bbox.y1, 292.0);
    }

    #[test]
    fn test_cm_applies_to_text() {
        let spans = run(&[
            ContentOp::new("q", vec![]),
            ContentOp::new(
                "cm",
                vec![num(2.0), num(0.0), num(0.0), num(2.0), num(0.0), num(0.0)],
            ),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            ContentOp::new("Td", vec![num(10.0), num(100.0)]),
            ContentOp::new("Tj", vec![text("Scaled")]),
            ContentOp::new("ET", vec![]),
            ContentOp::new("Q", vec![]),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Td", vec![num(10.0), num(100.0)]),
            ContentOp::new("Tj", vec![text("Plain")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].font_size, 20.0);
        assert_eq!(spans[0].bbox.x0, 20.0);
        assert_eq!(spans[1].font_size, 10.0);
        assert_eq!(spans[1].bbox.x0, 10.0);
    }

    #[test]
    fn test_next_line_uses_leading() {
        let spans = run(&[
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            ContentOp::new("TL", vec![num(14.0)]),
            ContentOp::new("Td", vec![num(72.0), num(700.0)]),
            ContentOp::new("Tj", vec![text("first")]),
            ContentOp::new("'", vec![text("second")]),
            ContentOp::new("T*", vec![]),
            ContentOp::new("Tj", vec![text("third")]),
            ContentOp::new("ET", vec![]),
        ]);
        let bottoms: Vec<f32> = spans.iter().map(|s| s.bbox.y1).collect();
        assert_eq!(bottoms, vec![92.0, 106.0, 120.0]);
        assert!(spans.iter().all(|s| s.bbox.x0 == 72.0));
    }

    #[test]
    fn test_tj_array_word_gaps() {
        let spans = run(&[
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    text("Exec"),
                    PdfValue::Integer(-20),
                    text("utive"),
                    PdfValue::Integer(-300),
                    text("Summary"),
                ])],
            ),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(spans[0].text, "Executive Summary");
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let spans = run(&[
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            ContentOp::new("Tj", vec![text("stray")]),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tj", vec![text("   ")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert!(spans.is_empty());
    }

    /// In-memory backend with one good page and one broken page.
    struct FakeBackend;

    impl PdfBackend for FakeBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            let mut pages = BTreeMap::new();
            pages.insert(1, (1, 0));
            pages.insert(2, (2, 0));
            pages
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![BackendFontInfo {
                name: b"F1".to_vec(),
                base_font: "Times-Roman".to_string(),
                encoding: None,
            }])
        }

        fn page_size(&self, _page: PageId) -> Result<(f32, f32)> {
            Ok((612.0, 792.0))
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            if page.0 == 2 {
                return Err(Error::PdfParse("broken stream".to_string()));
            }
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(11.0)]),
                ContentOp::new("Td", vec![num(72.0), num(720.0)]),
                ContentOp::new("Tj", vec![text("Hello")]),
                ContentOp::new("ET", vec![]),
            ])
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }
    }

    #[test]
    fn test_strict_mode_fails_on_broken_page() {
        let extractor = SpanExtractor::new(FakeBackend);
        assert!(matches!(extractor.extract(), Err(Error::PdfParse(_))));
    }

    #[test]
    fn test_lenient_mode_keeps_empty_page() {
        let extractor = SpanExtractor::with_options(FakeBackend, ParseOptions::new().lenient());
        let doc = extractor.extract().unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].spans[0].text, "Hello");
        assert!(doc.pages[1].spans.is_empty());
        assert_eq!(doc.pages[1].number, 2);
    }

    #[test]
    fn test_page_selection() {
        let options = ParseOptions::new().with_pages(PageSelection::Pages(vec![1]));
        let doc = SpanExtractor::with_options(FakeBackend, options).extract().unwrap();
        assert_eq!(doc.page_count(), 1);

        let options = ParseOptions::new().with_pages(PageSelection::Pages(vec![5]));
        let result = SpanExtractor::with_options(FakeBackend, options).extract();
        assert!(matches!(result, Err(Error::PageOutOfRange(5, 2))));
    }
}
