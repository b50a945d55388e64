//! Content-stream interpreter (component E): executes a page's operator
//! stream and emits coalesced [`TextSpan`]s (spec.md §4.3).

use super::ops;
use crate::document::page::Page;
use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::font::Font;
use crate::layout::span::TextSpan;
use crate::model::geometry::{apply_matrix_pt, mult_matrix, Matrix, IDENTITY};
use crate::model::objects::{Dict, Object};
use crate::parser::lexer::{Lexer, Token};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per content-stream-execution text parameters (spec.md §3 "Text state").
#[derive(Clone)]
pub struct TextState {
    pub tm: Matrix,
    pub tlm: Matrix,
    pub font: Option<Arc<Font>>,
    pub font_size: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// `Tz`, stored as the raw percentage (100 = no scaling).
    pub h_scale: f64,
    pub leading: f64,
    pub rise: f64,
    pub render_mode: i64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 100.0,
            leading: 0.0,
            rise: 0.0,
            render_mode: 0,
        }
    }
}

/// The subset of state `q`/`Q` save and restore: the CTM plus the text
/// parameters that PDF classifies as graphics state (everything except
/// `Tm`/`Tlm`, which belong to the text object, not the graphics state).
pub(crate) struct SavedState {
    pub ctm: Matrix,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub h_scale: f64,
    pub leading: f64,
    pub font: Option<Arc<Font>>,
    pub font_size: f64,
    pub rise: f64,
    pub render_mode: i64,
}

/// Glyphs accumulating into the span currently being built.
struct PendingSpan {
    font: Arc<Font>,
    font_size: f64,
    baseline_y: f64,
    last_origin_x: f64,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    text: String,
    mcid: Option<u32>,
}

pub struct Interpreter<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) ctm: Matrix,
    pub(crate) gstack: Vec<SavedState>,
    pub(crate) text: TextState,
    pub(crate) fontmap: FxHashMap<String, Arc<Font>>,
    pub(crate) mc_stack: Vec<Option<u32>>,
    pub(crate) current_mcid: Option<u32>,
    pending: Option<PendingSpan>,
    spans: Vec<TextSpan>,
    cancel: &'a AtomicBool,
}

/// Executes `page`'s content stream against `doc`'s resources and returns
/// the spans produced in stream order (spec.md §3 "Ordering among spans as
/// produced: stream order").
pub fn run_content_stream(doc: &Document, page: &Page, cancel: &AtomicBool) -> Result<Vec<TextSpan>> {
    let content = page.content_bytes(doc)?;
    let fontmap = build_fontmap(doc, page);

    let mut interp = Interpreter {
        doc,
        ctm: IDENTITY,
        gstack: Vec::new(),
        text: TextState::default(),
        fontmap,
        mc_stack: Vec::new(),
        current_mcid: None,
        pending: None,
        spans: Vec::new(),
        cancel,
    };
    interp.execute(&content)?;
    Ok(interp.spans)
}

/// Builds the page's font name-to-resource map, resolving each entry
/// through [`Document::cached_font`] so a font shared across many pages
/// (the common case) is only ever parsed once (spec.md §9).
fn build_fontmap(doc: &Document, page: &Page) -> FxHashMap<String, Arc<Font>> {
    let mut map = FxHashMap::default();
    let Some(fonts) = page.font_dict(doc) else {
        return map;
    };
    for (name, obj) in &fonts {
        let font = match obj {
            Object::Reference(id) => doc.cached_font(*id),
            other => doc
                .resolve_object(other)
                .as_dict()
                .ok()
                .map(|dict| Arc::new(Font::from_dict(doc, dict))),
        };
        if let Some(font) = font {
            map.insert(name.clone(), font);
        }
    }
    map
}

impl<'a> Interpreter<'a> {
    fn execute(&mut self, data: &[u8]) -> Result<()> {
        let mut lexer = Lexer::new(data);
        let mut operands: Vec<Object> = Vec::new();

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(PdfError::Cancelled);
            }
            let tok = match lexer.next_token() {
                Ok(Token::Eof) => break,
                Ok(t) => t,
                Err(_) => continue,
            };
            match tok {
                Token::Keyword(kw) if kw == "true" => operands.push(Object::Bool(true)),
                Token::Keyword(kw) if kw == "false" => operands.push(Object::Bool(false)),
                Token::Keyword(kw) if kw == "null" => operands.push(Object::Null),
                Token::Keyword(kw) if kw == "BI" => skip_inline_image(data, &mut lexer),
                Token::Keyword(op) => {
                    ops::dispatch(self, &op, &operands)?;
                    operands.clear();
                }
                other => {
                    if let Some(v) = read_operand(other, &mut lexer) {
                        operands.push(v);
                    }
                }
            }
        }
        self.flush_pending();
        Ok(())
    }

    pub(crate) fn font_by_name(&self, name: &str) -> Option<Arc<Font>> {
        self.fontmap.get(name).cloned()
    }

    pub(crate) fn push_span(&mut self, s: TextSpan) {
        self.spans.push(s);
    }

    /// Shows `bytes` under the current font, coalescing glyphs into spans
    /// per spec.md §4.3's lazy-emission rule.
    pub(crate) fn show_text(&mut self, bytes: &[u8]) {
        let Some(font) = self.text.font.clone() else { return };
        for code in font.decode_codes(bytes) {
            self.show_one_code(&font, code);
        }
    }

    fn show_one_code(&mut self, font: &Arc<Font>, code: u32) {
        let fs = self.text.font_size;
        let w0 = font.width(code) / 1000.0;
        let is_space = matches!(font.kind, crate::font::FontKind::Simple) && code == 0x20;
        let ws = if is_space { self.text.word_spacing } else { 0.0 };
        let tz = self.text.h_scale / 100.0;

        let combined = mult_matrix(self.ctm, self.text.tm);
        let origin = apply_matrix_pt(combined, (0.0, self.text.rise));
        let top = apply_matrix_pt(combined, (0.0, self.text.rise + fs));
        // The glyph's own advance (excluding inter-glyph spacing), so the
        // span's bbox includes the last glyph's width rather than stopping
        // at its origin.
        let end = apply_matrix_pt(combined, (w0 * fs * tz, self.text.rise));

        let unicode = font.decode_unicode(code);
        self.accumulate(font.clone(), fs, origin, top, end, &unicode);

        let tx = (w0 * fs + self.text.char_spacing + ws) * tz;
        self.text.tm = mult_matrix(self.text.tm, (1.0, 0.0, 0.0, 1.0, tx, 0.0));
    }

    /// Applies a `TJ` numeric adjustment: moves `Tm` without emitting a
    /// glyph (spec.md §4.3 step 5).
    pub(crate) fn adjust_tj(&mut self, n: f64) {
        let tz = self.text.h_scale / 100.0;
        let tx = -(n / 1000.0) * self.text.font_size * tz;
        self.text.tm = mult_matrix(self.text.tm, (1.0, 0.0, 0.0, 1.0, tx, 0.0));
    }

    fn accumulate(
        &mut self,
        font: Arc<Font>,
        font_size: f64,
        origin: (f64, f64),
        top: (f64, f64),
        end: (f64, f64),
        text: &str,
    ) {
        let (ox, oy) = origin;
        let (_, ty) = top;
        let (ex, ey) = end;
        let mcid = self.current_mcid;

        let should_extend = self.pending.as_ref().is_some_and(|p| {
            let same_font = Arc::ptr_eq(&p.font, &font) && (p.font_size - font_size).abs() < 1e-6;
            let same_mcid = p.mcid == mcid;
            let baseline_diff = (oy - p.baseline_y).abs();
            let advance = ox - p.last_origin_x;
            let one_em = font_size.max(p.font_size).max(1.0);
            same_font && same_mcid && baseline_diff <= font_size.max(1.0) * 0.5 && advance >= -1e-6 && advance <= one_em
        });

        if !should_extend {
            self.flush_pending();
            self.pending = Some(PendingSpan {
                font,
                font_size,
                baseline_y: oy,
                last_origin_x: ox,
                x0: ox,
                y0: oy.min(ty),
                x1: ox,
                y1: oy.max(ty),
                text: String::new(),
                mcid,
            });
        }

        let pending = self.pending.as_mut().expect("just populated above");
        pending.text.push_str(text);
        pending.last_origin_x = ox;
        pending.x1 = pending.x1.max(ox).max(ex);
        pending.y0 = pending.y0.min(oy.min(ty)).min(ey);
        pending.y1 = pending.y1.max(oy.max(ty)).max(ey);
    }

    pub(crate) fn flush_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            let x1 = p.x1.max(p.x0);
            // Zero-area spans (e.g. render mode 3 invisible text collapsed to
            // a point) are dropped rather than emitted (spec.md §3 invariant).
            if !p.text.is_empty() && x1 > p.x0 && p.y1 > p.y0 {
                self.spans.push(TextSpan {
                    x0: p.x0,
                    y0: p.y0,
                    x1,
                    y1: p.y1,
                    text: p.text,
                    font_size: p.font_size,
                    mcid: p.mcid,
                });
            }
        }
    }

    pub(crate) fn enter_marked_content(&mut self, mcid: Option<u32>) {
        if mcid != self.current_mcid {
            self.flush_pending();
        }
        self.mc_stack.push(self.current_mcid);
        self.current_mcid = mcid;
    }

    pub(crate) fn exit_marked_content(&mut self) {
        let restored = self.mc_stack.pop().flatten();
        if restored != self.current_mcid {
            self.flush_pending();
        }
        self.current_mcid = restored;
    }
}

fn read_operand(tok: Token, lexer: &mut Lexer<'_>) -> Option<Object> {
    match tok {
        Token::Int(n) => Some(Object::Int(n)),
        Token::Real(n) => Some(Object::Real(n)),
        Token::Name(n) => Some(Object::Name(n)),
        Token::LiteralString(s) | Token::HexString(s) => Some(Object::String(s)),
        Token::ArrayStart => {
            let mut items = Vec::new();
            loop {
                match lexer.next_token() {
                    Ok(Token::ArrayEnd) | Ok(Token::Eof) | Err(_) => break,
                    Ok(t) => {
                        if let Some(v) = read_operand(t, lexer) {
                            items.push(v);
                        }
                    }
                }
            }
            Some(Object::Array(items))
        }
        Token::DictStart => {
            let mut dict = Dict::new();
            loop {
                match lexer.next_token() {
                    Ok(Token::DictEnd) | Ok(Token::Eof) | Err(_) => break,
                    Ok(Token::Name(key)) => match lexer.next_token() {
                        Ok(t) => {
                            if let Some(v) = read_operand(t, lexer) {
                                dict.insert(key, v);
                            }
                        }
                        Err(_) => break,
                    },
                    _ => {}
                }
            }
            Some(Object::Dict(dict))
        }
        Token::Keyword(kw) if kw == "true" => Some(Object::Bool(true)),
        Token::Keyword(kw) if kw == "false" => Some(Object::Bool(false)),
        Token::Keyword(kw) if kw == "null" => Some(Object::Null),
        _ => None,
    }
}

/// Skips a `BI ... ID <data> EI` inline image: its binary payload can
/// contain bytes that look like operators, so the lexer is bypassed and the
/// raw buffer is scanned directly. Image extraction is out of scope (spec.md
/// §1 non-goal); this exists only so a page's text after an inline image is
/// still reached.
fn skip_inline_image(data: &[u8], lexer: &mut Lexer<'_>) {
    loop {
        match lexer.next_token() {
            Ok(Token::Keyword(kw)) if kw == "ID" => break,
            Ok(Token::Eof) | Err(_) => return,
            _ => {}
        }
    }
    let mut pos = lexer.pos();
    if data.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    let end = data[pos..]
        .windows(2)
        .position(|w| w == b"EI")
        .map(|i| pos + i + 2)
        .unwrap_or(data.len());
    lexer.seek(end);
}
