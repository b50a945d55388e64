//! A single page: inherited resources, geometry, and its content stream.

use super::Document;
use crate::error::Result;
use crate::model::objects::{Dict, Object};

/// A page dictionary with ancestor-inherited attributes already resolved
/// (spec.md §3: "A dictionary inheriting resources ... from ancestors in
/// the page tree").
#[derive(Debug, Clone)]
pub struct Page {
    pub dict: Dict,
    pub resources: Dict,
    pub media_box: (f64, f64, f64, f64),
    pub rotation: i64,
}

impl Page {
    pub fn width(&self) -> f64 {
        (self.media_box.2 - self.media_box.0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.media_box.3 - self.media_box.1).abs()
    }

    /// Logical dimensions after applying `/Rotate`: a 90/270 rotation
    /// swaps width and height (spec.md §4.5 `page_info`).
    pub fn rotated_size(&self) -> (f64, f64) {
        if self.rotation.rem_euclid(360) == 90 || self.rotation.rem_euclid(360) == 270 {
            (self.height(), self.width())
        } else {
            (self.width(), self.height())
        }
    }

    /// The page's content stream bytes, logically concatenated when
    /// `/Contents` is an array of streams (spec.md §3), separated by a
    /// newline so adjacent operators from different streams never fuse.
    pub fn content_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let Some(contents) = self.dict.get("Contents") else {
            return Ok(Vec::new());
        };
        let resolved = doc.resolve_object(contents);
        let mut out = Vec::new();
        match &*resolved {
            Object::Stream(s) => {
                out.extend_from_slice(&crate::codec::decode_stream(&s.dict, &s.raw)?);
            }
            Object::Array(arr) => {
                for item in arr {
                    let resolved_item = doc.resolve_object(item);
                    if let Object::Stream(s) = &*resolved_item {
                        out.extend_from_slice(&crate::codec::decode_stream(&s.dict, &s.raw)?);
                        out.push(b'\n');
                    }
                }
            }
            _ => {}
        }
        Ok(out)
    }

    /// Resolves `/Resources/Font`, following an indirect reference if the
    /// page stores one there.
    pub fn font_dict(&self, doc: &Document) -> Option<Dict> {
        let obj = self.resources.get("Font")?;
        doc.resolve_object(obj).as_dict().ok().cloned()
    }
}
