//! The public extraction surface (spec.md §4.5 "Public operations"):
//! `open`/`close`, page geometry, and the four extraction calls that sit on
//! top of the interpreter (E), reading-order reconstruction (H/I), and the
//! parallel driver (J).
//!
//! Grounded in the teacher's `api::high_level` entry points
//! (`extract_text`, `extract_pages`), generalized from the single
//! "LTPage"-per-page model to this engine's stream/reading mode split.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::driver::run_pages;
use crate::document::Document as Inner;
use crate::error::{PdfError, Result};
use crate::interp::run_content_stream;
use crate::layout::span::TextSpan;
use crate::layout::{artifact_mcids, blocks_to_text, reading_order};
use crate::markdown::to_markdown;

/// Which linearisation an `extract_*` call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Raw operator-emission order: fast, no column/structure analysis.
    Stream,
    /// Reading order: structure-tree walk with geometric fallback.
    Reading,
}

/// A page's geometry as reported by `page_info` (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    pub width: f64,
    pub height: f64,
    pub rotation: i64,
}

/// An opened PDF document and the public operations over it.
///
/// Wraps [`crate::document::Document`], adding the cancellation flag and
/// the stream/reading-order/Markdown extraction calls spec.md §4.5
/// describes. Internal errors are folded into the five caller-facing
/// [`PdfError`] variants its methods return.
pub struct Document {
    inner: Inner,
    cancel: AtomicBool,
}

impl Document {
    /// Opens a document from a filesystem path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self { inner: Inner::open_path(path)?, cancel: AtomicBool::new(false) })
    }

    /// Opens a document from an in-memory buffer (spec.md §4.5: the caller
    /// keeps the buffer alive for the document's lifetime).
    pub fn open_memory(data: Vec<u8>) -> Result<Self> {
        Ok(Self { inner: Inner::open_memory(data)?, cancel: AtomicBool::new(false) })
    }

    /// Idempotent; further calls on a closed document return
    /// [`PdfError::Closed`].
    pub fn close(&self) {
        self.inner.close();
    }

    /// Requests cancellation of any extraction in progress or started
    /// after this call (spec.md §5).
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    /// Width, height (post-rotation, default user space), and rotation in
    /// degrees (a multiple of 90), per spec.md §4.5.
    pub fn page_info(&self, index: usize) -> Result<PageInfo> {
        self.inner.check_open()?;
        let page = self.inner.page(index)?;
        let (width, height) = page.rotated_size();
        Ok(PageInfo { width, height, rotation: page.rotation.rem_euclid(360) })
    }

    /// Extracts page `index` in `mode`. Interpreter failures surface as
    /// [`PdfError::Extraction`] for this single-page call, per spec.md
    /// §4.5.
    pub fn extract_page(&self, index: usize, mode: ExtractMode) -> Result<String> {
        self.inner.check_open()?;
        let spans = self.page_spans(index)?;
        Ok(self.render_spans(&spans, mode))
    }

    /// Extracts every page in `mode`. When `parallel`, pages run on
    /// rayon's pool; output is assembled in ascending page index either
    /// way and pages are separated by a single form feed (spec.md §4.5). A
    /// page that fails to interpret contributes empty output rather than
    /// aborting the call.
    pub fn extract_all(&self, mode: ExtractMode, parallel: bool) -> Result<String> {
        self.inner.check_open()?;
        let n = self.inner.page_count();
        let texts = run_pages(n, parallel, &self.cancel, |i| {
            self.page_spans(i).map(|spans| self.render_spans(&spans, mode)).unwrap_or_default()
        })?;
        Ok(texts.join("\u{000C}"))
    }

    /// Returns the stream-order span list (coordinates and font size) for
    /// page `index`, per spec.md §4.5 `extract_bounds`, excluding any span
    /// tagged `/Artifact` in the structure tree (spec.md §3).
    pub fn extract_bounds(&self, index: usize) -> Result<Vec<TextSpan>> {
        self.inner.check_open()?;
        let spans = self.page_spans(index)?;
        let artifacts = artifact_mcids(&self.inner);
        if artifacts.is_empty() {
            return Ok(spans);
        }
        Ok(spans
            .into_iter()
            .filter(|s| !s.mcid.is_some_and(|m| artifacts.contains(&m)))
            .collect())
    }

    /// Applies the Markdown formatter (K) over the reading-order output of
    /// page `index`, or of every page when `index` is `None`, joining pages
    /// with a `---` page-break line (spec.md §4.6).
    pub fn extract_markdown(&self, index: Option<usize>) -> Result<String> {
        self.inner.check_open()?;
        match index {
            Some(i) => {
                let spans = self.page_spans(i)?;
                let blocks = reading_order(&self.inner, &spans);
                Ok(to_markdown(&blocks))
            }
            None => {
                let n = self.inner.page_count();
                let texts = run_pages(n, false, &self.cancel, |i| {
                    self.page_spans(i)
                        .map(|spans| to_markdown(&reading_order(&self.inner, &spans)))
                        .unwrap_or_default()
                })?;
                Ok(texts.join("\n\n---\n\n"))
            }
        }
    }

    fn page_spans(&self, index: usize) -> Result<Vec<TextSpan>> {
        let page = self.inner.page(index)?;
        run_content_stream(&self.inner, page, &self.cancel)
            .map_err(|e| PdfError::Extraction(e.to_string()))
    }

    fn render_spans(&self, spans: &[TextSpan], mode: ExtractMode) -> String {
        match mode {
            ExtractMode::Stream => stream_order_text(spans),
            ExtractMode::Reading => blocks_to_text(&reading_order(&self.inner, spans)),
        }
    }
}

/// Stream-order rendering: spans already arrive in the order the
/// interpreter emitted them. Adjacent spans on the same baseline join with
/// a space when there's a visible gap; a baseline change starts a new
/// line, per spec.md §4.5's "fast, raw operator sequence" contract.
fn stream_order_text(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextSpan> = None;
    for span in spans {
        if let Some(p) = prev {
            if (span.y0 - p.y0).abs() > span.font_size.max(p.font_size) * 0.5 {
                out.push('\n');
            } else if span.x0 - p.x1 > span.font_size.max(p.font_size) * 0.25 {
                out.push(' ');
            }
        }
        out.push_str(&span.text);
        prev = Some(span);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f64, x1: f64, y0: f64, font_size: f64) -> TextSpan {
        TextSpan { x0, y0, x1, y1: y0 + font_size, text: text.to_string(), font_size, mcid: None }
    }

    #[test]
    fn stream_order_joins_same_line_with_space() {
        let spans = vec![span("Hello", 0.0, 30.0, 100.0, 10.0), span("world", 33.0, 60.0, 100.0, 10.0)];
        assert_eq!(stream_order_text(&spans), "Hello world");
    }

    #[test]
    fn stream_order_breaks_line_on_baseline_change() {
        let spans = vec![span("Hello", 0.0, 30.0, 100.0, 10.0), span("world", 0.0, 30.0, 80.0, 10.0)];
        assert_eq!(stream_order_text(&spans), "Hello\nworld");
    }
}
