//! Benchmarks for outline inference.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfoutline::{BBox, OutlinePipeline, Outliner, SpanDocument, TextSpan};

const BODY: &str = "Quarterly revenue grew in every region while operating costs stayed flat";

/// Synthetic document: a cover page, then pages with a numbered heading,
/// a subheading, body text and a running footer.
fn span_document(page_count: u32) -> SpanDocument {
    let mut pages = Vec::new();
    for number in 1..=page_count {
        let mut spans = Vec::new();
        let mut top = 72.0;
        let mut push = |text: String, size: f32, bold: bool| {
            let width = text.chars().count() as f32 * size * 0.5;
            spans.push(TextSpan::new(
                text,
                size,
                bold,
                BBox::new(72.0, top, 72.0 + width, top + size),
                number,
            ));
            top += size * 1.8;
        };

        if number == 1 {
            push("Annual Report".to_string(), 26.0, true);
            push("Fiscal Year 2024".to_string(), 26.0, true);
        } else {
            push(format!("{}. Section {}", number - 1, number - 1), 16.0, true);
            push(format!("{}.1 Details", number - 1), 13.0, true);
        }
        for _ in 0..30 {
            push(BODY.to_string(), 10.0, false);
        }
        push(format!("Confidential - Page {}", number), 8.0, false);

        pages.push(spans);
    }
    SpanDocument::from_pages(pages)
}

/// Minimal PDF with a heading and body text on every page.
fn pdf_document(page_count: usize) -> Vec<u8> {
    let mut content = String::new();
    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 5)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> >>\nendobj\n",
        kids.join(" "),
        page_count
    ));
    content.push_str("3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");
    content.push_str("4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>\nendobj\n");

    let mut next_obj = 5;
    for i in 0..page_count {
        let page_obj = next_obj;
        let content_obj = next_obj + 1;
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));

        let heading = if i == 0 {
            "(Benchmark Report) Tj".to_string()
        } else {
            format!("({}. Chapter {}) Tj", i, i)
        };
        let mut text = format!("BT /F2 20 Tf 14 TL 72 720 Td {} /F1 10 Tf", heading);
        for _ in 0..20 {
            text.push_str(" T* (Body text used to measure the outline pipeline throughput.) Tj");
        }
        text.push_str(" ET");

        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    // Offsets are placeholders; lopdf rebuilds the table when they do not match
    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = pdf_document(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfoutline::detect_format_from_bytes(black_box(&pdf_data)).is_ok());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfoutline::detect_format_from_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Heading inference alone, on pre-extracted spans.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = OutlinePipeline::new();

    for page_count in [1, 10, 50, 200] {
        let doc = span_document(page_count);
        group.bench_with_input(BenchmarkId::from_parameter(page_count), &doc, |b, doc| {
            b.iter(|| pipeline.run(black_box(doc)));
        });
    }

    group.finish();
}

/// Extraction and inference from PDF bytes.
fn bench_outline_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_bytes");

    for page_count in [1, 5, 20] {
        let data = pdf_document(page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                let _ = Outliner::new().lenient().bytes(black_box(&data));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_pipeline,
    bench_outline_bytes,
);
criterion_main!(benches);
