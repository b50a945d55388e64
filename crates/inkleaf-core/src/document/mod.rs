//! The document handle: byte source, xref index, page list, resource cache.

pub mod catalog;
pub mod page;
pub mod source;
pub mod xref;

use crate::error::{PdfError, Result};
use crate::font::Font;
use crate::model::objects::{Dict, ObjId, Object};
use crate::parser::parse_object;
use page::Page;
use rustc_hash::FxHashMap;
use source::ByteSource;
use std::sync::{Arc, RwLock};
use xref::{XrefEntry, XrefTable};

/// An opened, read-only PDF document.
///
/// Owns the byte source, the merged xref index, and the page list in
/// document order (walked once at open time, per spec.md §3). A
/// write-once resource cache keyed by object identifier backs shared font
/// lookups across pages; per spec.md §5 two threads racing to resolve the
/// same entry may do redundant work but never corrupt it.
pub struct Document {
    source: ByteSource,
    xref: XrefTable,
    pages: Vec<Page>,
    object_stream_cache: RwLock<FxHashMap<u32, Vec<(ObjId, Object)>>>,
    font_cache: RwLock<FxHashMap<u32, Arc<Font>>>,
    closed: std::sync::atomic::AtomicBool,
}

impl Document {
    /// Opens a document from a filesystem path.
    pub fn open_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let source = ByteSource::from_path(path.as_ref())?;
        Self::open_source(source)
    }

    /// Opens a document from an in-memory buffer. The caller must keep the
    /// buffer alive for the document's lifetime (spec.md §4.5).
    pub fn open_memory(data: Vec<u8>) -> Result<Self> {
        Self::open_source(ByteSource::from_owned(data))
    }

    fn open_source(source: ByteSource) -> Result<Self> {
        let data = source.as_slice();
        if !looks_like_pdf(data) {
            // Permissive per spec.md E2: not a PDF is tolerated as an
            // empty-pages document rather than an error, as long as it
            // doesn't look truncated mid-header.
            if data.len() < 5 {
                return Err(PdfError::InvalidPdf("input too short to be a PDF".into()));
            }
        }

        let xref = xref::build_xref_table(data).map_err(|e| {
            PdfError::InvalidPdf(format!("xref resolution failed after reconstruction: {e}"))
        })?;

        if xref.trailer.get("Encrypt").is_some() {
            return Err(PdfError::InvalidPdf(
                "encrypted PDFs are detected and rejected".into(),
            ));
        }

        let mut doc = Self {
            source,
            xref,
            pages: Vec::new(),
            object_stream_cache: RwLock::new(FxHashMap::default()),
            font_cache: RwLock::new(FxHashMap::default()),
            closed: std::sync::atomic::AtomicBool::new(false),
        };
        doc.pages = catalog::collect_pages(&doc)?;
        tracing::debug!(pages = doc.pages.len(), "document opened");
        Ok(doc)
    }

    pub fn check_open(&self) -> Result<()> {
        if self.closed.load(std::sync::atomic::Ordering::Acquire) {
            Err(PdfError::Closed)
        } else {
            Ok(())
        }
    }

    /// Idempotent: repeated calls are no-ops, matching spec.md §8 property 7.
    pub fn close(&self) {
        self.closed.store(true, std::sync::atomic::Ordering::Release);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or(PdfError::PageNotFound)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn bytes(&self) -> &[u8] {
        self.source.as_slice()
    }

    pub fn trailer(&self) -> &Dict {
        &self.xref.trailer
    }

    /// Resolves an object identifier to a fully decoded [`Object`], chasing
    /// at most one level of indirection. Nested references inside
    /// composite values remain [`Object::Reference`] for the caller to
    /// resolve lazily, per spec.md §4.1. Unresolved/dangling references
    /// decode to [`Object::Null`] rather than erroring (spec.md §3
    /// invariant).
    pub fn resolve(&self, id: ObjId) -> Object {
        self.resolve_bounded(id, &mut std::collections::HashSet::new())
    }

    /// Resolves `obj`, following one reference if it is one, otherwise
    /// returning it unchanged.
    pub fn resolve_object<'a>(&self, obj: &'a Object) -> std::borrow::Cow<'a, Object> {
        match obj {
            Object::Reference(id) => std::borrow::Cow::Owned(self.resolve(*id)),
            other => std::borrow::Cow::Borrowed(other),
        }
    }

    /// Resolves and parses the font resource at `id`, reusing a previously
    /// built [`Font`] when the same object number was already seen (spec.md
    /// §9: fonts shared across many pages are parsed once, not once per
    /// page). Returns `None` if `id` doesn't resolve to a font dictionary.
    pub fn cached_font(&self, id: ObjId) -> Option<Arc<Font>> {
        if let Some(font) = self.font_cache.read().unwrap().get(&id.num) {
            return Some(font.clone());
        }
        let resolved = self.resolve(id);
        let dict = resolved.as_dict().ok()?;
        let font = Arc::new(Font::from_dict(self, dict));
        self.font_cache.write().unwrap().insert(id.num, font.clone());
        Some(font)
    }

    fn resolve_bounded(&self, id: ObjId, visited: &mut std::collections::HashSet<u32>) -> Object {
        if !visited.insert(id.num) {
            // Cycle through indirect refs: legal in PDF, must not recurse
            // forever (spec.md §3).
            return Object::Null;
        }
        match self.xref.get(id.num) {
            Some(XrefEntry::Offset { offset, .. }) => crate::parser::parse_indirect_object_at(
                self.source.as_slice(),
                offset,
            )
            .map(|(obj, _)| obj)
            .unwrap_or(Object::Null),
            Some(XrefEntry::InStream { stream_num, index }) => {
                self.object_from_stream(stream_num, index, visited)
            }
            None => Object::Null,
        }
    }

    fn object_from_stream(
        &self,
        stream_num: u32,
        index: usize,
        visited: &mut std::collections::HashSet<u32>,
    ) -> Object {
        if let Some(cached) = self.object_stream_cache.read().unwrap().get(&stream_num) {
            return cached.get(index).map(|(_, o)| o.clone()).unwrap_or(Object::Null);
        }
        let Some(XrefEntry::Offset { offset, .. }) = self.xref.get(stream_num) else {
            return Object::Null;
        };
        let Ok((stream_obj, _)) = parse_object(self.source.as_slice(), offset) else {
            return Object::Null;
        };
        let Ok(stream) = stream_obj.as_stream() else {
            return Object::Null;
        };
        let Ok(decoded) = crate::codec::decode_stream(&stream.dict, &stream.raw) else {
            return Object::Null;
        };
        let n = stream.dict.get("N").and_then(|o| o.as_int().ok()).unwrap_or(0) as usize;
        let first = stream.dict.get("First").and_then(|o| o.as_int().ok()).unwrap_or(0) as usize;

        // Header: N pairs of (object number, relative offset).
        let mut header_pos = 0;
        let mut entries = Vec::with_capacity(n);
        for _ in 0..n {
            let mut lexer = crate::parser::lexer::Lexer::at(&decoded, header_pos);
            let num = match lexer.next_token() {
                Ok(crate::parser::lexer::Token::Int(v)) => v as u32,
                _ => break,
            };
            let rel_offset = match lexer.next_token() {
                Ok(crate::parser::lexer::Token::Int(v)) => v as usize,
                _ => break,
            };
            header_pos = lexer.pos();
            entries.push((num, rel_offset));
        }

        let mut objs = Vec::with_capacity(entries.len());
        for (num, rel_offset) in entries {
            let body_pos = first + rel_offset;
            let obj = parse_object(&decoded, body_pos)
                .map(|(o, _)| o)
                .unwrap_or(Object::Null);
            objs.push((ObjId::new(num, 0), obj));
        }

        let result = objs.get(index).map(|(_, o)| o.clone()).unwrap_or(Object::Null);
        let _ = visited; // object-stream members never recurse further here.
        self.object_stream_cache.write().unwrap().insert(stream_num, objs);
        result
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        // Dropping without an explicit `close()` still releases everything:
        // there is no separate teardown path beyond the state bit, and the
        // owned buffers drop normally (spec.md §8 property 7).
        self.close();
    }
}

fn looks_like_pdf(data: &[u8]) -> bool {
    data.len() >= 5 && &data[..4] == b"%PDF" || data.windows(5).take(1024).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_like_pdf_accepts_standard_header() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
    }

    #[test]
    fn looks_like_pdf_rejects_plain_text() {
        assert!(!looks_like_pdf(b"not a pdf at all, just text"));
    }
}
