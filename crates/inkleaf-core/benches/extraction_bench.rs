use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use inkleaf_core::{Document, ExtractMode};

/// A page of short justified lines, enough to exercise column detection,
/// line grouping, and span coalescing without needing a fixture file on
/// disk.
fn sample_pdf(lines: usize) -> Vec<u8> {
    let mut body = String::new();
    body.push_str("BT /F1 11 Tf 14 TL 72 740 Td\n");
    for i in 0..lines {
        body.push_str(&format!("(Line number {i} of the sample document.) Tj T*\n"));
    }
    body.push_str("ET");

    let length = body.len();
    let mut pdf = String::new();
    pdf.push_str("%PDF-1.7\n");
    pdf.push_str("1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    pdf.push_str("2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    pdf.push_str(
        "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >> endobj\n",
    );
    pdf.push_str(&format!("4 0 obj << /Length {length} >>\nstream\n{body}\nendstream endobj\n"));
    pdf.push_str(
        "5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
         /Encoding /WinAnsiEncoding >> endobj\n",
    );
    pdf.push_str("%%EOF");
    pdf.into_bytes()
}

fn bench_extract_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_page");
    for &lines in &[10usize, 100, 400] {
        let pdf = sample_pdf(lines);
        group.bench_with_input(BenchmarkId::new("stream", lines), &pdf, |b, pdf| {
            b.iter(|| {
                let doc = Document::open_memory(pdf.clone()).unwrap();
                black_box(doc.extract_page(0, ExtractMode::Stream).unwrap());
            });
        });
        group.bench_with_input(BenchmarkId::new("reading", lines), &pdf, |b, pdf| {
            b.iter(|| {
                let doc = Document::open_memory(pdf.clone()).unwrap();
                black_box(doc.extract_page(0, ExtractMode::Reading).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract_page);
criterion_main!(benches);
