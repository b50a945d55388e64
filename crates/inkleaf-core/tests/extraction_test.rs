//! End-to-end tests over the public [`inkleaf_core::Document`] API,
//! covering spec.md §8's testable properties: stream/reading-order
//! extraction, bounds, Markdown, multi-page assembly, and error paths.
//!
//! Test PDFs are assembled by hand, in the spirit of the teacher's
//! `build_minimal_pdf_with_pages` helper, but deliberately omit an xref
//! table and trailer: the document has to fall back to the full-file
//! object scan and catalog auto-detection (spec.md §3) to even open,
//! which exercises that path on every test here.

use inkleaf_core::{Document, ExtractMode};

fn content_stream(body: &str) -> String {
    format!("<< /Length {} >>\nstream\n{}\nendstream", body.len() + 1, body)
}

fn one_page_pdf(body: &str) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("%PDF-1.7\n");
    out.push_str("1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    out.push_str("2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    out.push_str(
        "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >> endobj\n",
    );
    out.push_str(&format!("4 0 obj {} endobj\n", content_stream(body)));
    out.push_str(
        "5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
         /Encoding /WinAnsiEncoding >> endobj\n",
    );
    out.push_str("%%EOF");
    out.into_bytes()
}

fn two_page_pdf(body_a: &str, body_b: &str) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("%PDF-1.7\n");
    out.push_str("1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    out.push_str("2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n");
    out.push_str(
        "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 7 0 R >> >> /Contents 5 0 R >> endobj\n",
    );
    out.push_str(
        "4 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Rotate 90 \
         /Resources << /Font << /F1 7 0 R >> >> /Contents 6 0 R >> endobj\n",
    );
    out.push_str(&format!("5 0 obj {} endobj\n", content_stream(body_a)));
    out.push_str(&format!("6 0 obj {} endobj\n", content_stream(body_b)));
    out.push_str(
        "7 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
         /Encoding /WinAnsiEncoding >> endobj\n",
    );
    out.push_str("%%EOF");
    out.into_bytes()
}

#[test]
fn opens_without_an_xref_table_via_reconstruction() {
    let pdf = one_page_pdf("BT /F1 24 Tf 72 700 Td (Hello World) Tj ET");
    let doc = Document::open_memory(pdf).expect("reconstruction should locate the catalog");
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn page_info_reports_mediabox_and_rotation() {
    let pdf = two_page_pdf(
        "BT /F1 12 Tf 72 700 Td (first page) Tj ET",
        "BT /F1 12 Tf 72 700 Td (second page) Tj ET",
    );
    let doc = Document::open_memory(pdf).unwrap();
    assert_eq!(doc.page_count(), 2);

    let info0 = doc.page_info(0).unwrap();
    assert_eq!(info0.rotation, 0);
    assert!((info0.width - 612.0).abs() < 1e-6);
    assert!((info0.height - 792.0).abs() < 1e-6);

    // A 90-degree rotation swaps the reported width and height (spec.md §4.5).
    let info1 = doc.page_info(1).unwrap();
    assert_eq!(info1.rotation, 90);
    assert!((info1.width - 792.0).abs() < 1e-6);
    assert!((info1.height - 612.0).abs() < 1e-6);
}

#[test]
fn extract_page_recovers_the_shown_text_in_both_modes() {
    let pdf = one_page_pdf("BT /F1 24 Tf 72 700 Td (Hello World) Tj ET");
    let doc = Document::open_memory(pdf).unwrap();

    let stream_text = doc.extract_page(0, ExtractMode::Stream).unwrap();
    assert!(stream_text.contains("Hello World"), "got: {stream_text:?}");

    let reading_text = doc.extract_page(0, ExtractMode::Reading).unwrap();
    assert!(reading_text.contains("Hello World"), "got: {reading_text:?}");
}

#[test]
fn extract_page_out_of_range_is_page_not_found() {
    let pdf = one_page_pdf("BT /F1 12 Tf 72 700 Td (x) Tj ET");
    let doc = Document::open_memory(pdf).unwrap();
    let err = doc.extract_page(5, ExtractMode::Stream).unwrap_err();
    assert!(matches!(err, inkleaf_core::PdfError::PageNotFound));
}

#[test]
fn extract_bounds_reports_positioned_spans() {
    let pdf = one_page_pdf("BT /F1 24 Tf 72 700 Td (Hi) Tj ET");
    let doc = Document::open_memory(pdf).unwrap();
    let spans = doc.extract_bounds(0).unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "Hi");
    assert!((spans[0].font_size - 24.0).abs() < 1e-6);
    assert!((spans[0].x0 - 72.0).abs() < 1e-6);
    assert!((spans[0].y0 - 700.0).abs() < 1e-6);
}

#[test]
fn extract_all_separates_pages_with_a_form_feed() {
    let pdf = two_page_pdf(
        "BT /F1 12 Tf 72 700 Td (first page) Tj ET",
        "BT /F1 12 Tf 72 700 Td (second page) Tj ET",
    );
    let doc = Document::open_memory(pdf).unwrap();
    let text = doc.extract_all(ExtractMode::Reading, false).unwrap();
    let pages: Vec<&str> = text.split('\u{000C}').collect();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("first page"));
    assert!(pages[1].contains("second page"));
}

#[test]
fn extract_all_parallel_matches_sequential_order() {
    let pdf = two_page_pdf(
        "BT /F1 12 Tf 72 700 Td (first page) Tj ET",
        "BT /F1 12 Tf 72 700 Td (second page) Tj ET",
    );
    let doc = Document::open_memory(pdf).unwrap();
    let sequential = doc.extract_all(ExtractMode::Reading, false).unwrap();
    let parallel = doc.extract_all(ExtractMode::Reading, true).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn extract_markdown_promotes_a_large_line_to_a_heading() {
    let body = "BT /F1 28 Tf 72 720 Td (Big Heading) Tj ET \
                BT /F1 10 Tf 72 680 Td (A normal paragraph line.) Tj ET";
    let pdf = one_page_pdf(body);
    let doc = Document::open_memory(pdf).unwrap();
    let md = doc.extract_markdown(Some(0)).unwrap();
    assert!(md.contains("# Big Heading"), "got: {md:?}");
    assert!(md.contains("A normal paragraph line."));
}

#[test]
fn cancelling_before_extract_all_aborts_with_cancelled() {
    let pdf = two_page_pdf(
        "BT /F1 12 Tf 72 700 Td (first page) Tj ET",
        "BT /F1 12 Tf 72 700 Td (second page) Tj ET",
    );
    let doc = Document::open_memory(pdf).unwrap();
    doc.cancel();
    let err = doc.extract_all(ExtractMode::Reading, false).unwrap_err();
    assert!(matches!(err, inkleaf_core::PdfError::Cancelled));
}

#[test]
fn operations_on_a_closed_document_fail() {
    let pdf = one_page_pdf("BT /F1 12 Tf 72 700 Td (x) Tj ET");
    let doc = Document::open_memory(pdf).unwrap();
    doc.close();
    let err = doc.extract_page(0, ExtractMode::Stream).unwrap_err();
    assert!(matches!(err, inkleaf_core::PdfError::Closed));
}
