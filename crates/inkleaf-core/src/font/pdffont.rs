//! Resolved font resource: encoding, widths, and the byte-stream decoder
//! contract a content-stream interpreter needs (spec.md §3 "Font").

use super::cmap::{parse_tounicode_cmap, ToUnicodeCMap};
use super::encoding::{BaseEncoding, EncodingTable};
use crate::document::Document;
use crate::model::objects::{Dict, Object};
use rustc_hash::FxHashMap;
use unicode_normalization::UnicodeNormalization;

/// Distinguishes how many bytes make up one character code and how glyph
/// widths are keyed, per ISO 32000-1 §9.6-9.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Simple font (Type1, TrueType, MMType1): one byte per code.
    Simple,
    /// Composite font (Type0) with an Identity-H/V or other CMap: two
    /// bytes per code, widths keyed by CID via `/W`.
    Type0,
}

/// A page-resident font resource: everything needed to turn the bytes of a
/// `Tj`/`TJ` string operand into Unicode text and glyph advances.
#[derive(Debug, Clone)]
pub struct Font {
    pub kind: FontKind,
    encoding: Option<EncodingTable>,
    to_unicode: Option<ToUnicodeCMap>,
    widths: FxHashMap<u32, f64>,
    default_width: f64,
    pub base_font: String,
}

impl Font {
    /// Builds a [`Font`] from a resolved `/Font` resource dictionary.
    pub fn from_dict(doc: &Document, dict: &Dict) -> Self {
        let subtype = dict.get("Subtype").and_then(|o| o.as_name().ok()).unwrap_or("");
        let base_font = dict
            .get("BaseFont")
            .and_then(|o| o.as_name().ok())
            .unwrap_or("unknown")
            .to_string();

        if subtype == "Type0" {
            return Self::from_type0_dict(doc, dict, base_font);
        }

        let mut encoding = resolve_base_encoding(doc, dict).map(EncodingTable::new);
        if let Some(enc_obj) = dict.get("Encoding") {
            let resolved = doc.resolve_object(enc_obj);
            if let Ok(enc_dict) = resolved.as_dict() {
                if encoding.is_none() {
                    encoding = Some(EncodingTable::new(BaseEncoding::Standard));
                }
                if let Some(diffs) = enc_dict.get("Differences").and_then(|o| o.as_array().ok()) {
                    if let Some(table) = encoding.as_mut() {
                        table.apply_differences(diffs);
                    }
                }
            }
        }
        if encoding.is_none() {
            encoding = Some(EncodingTable::new(BaseEncoding::Standard));
        }

        let to_unicode = dict
            .get("ToUnicode")
            .map(|o| doc.resolve_object(o))
            .and_then(|obj| obj.as_stream().ok().cloned())
            .and_then(|s| crate::codec::decode_stream(&s.dict, &s.raw).ok())
            .map(|bytes| parse_tounicode_cmap(&bytes));

        let default_width = dict
            .get("MissingWidth")
            .and_then(|o| o.as_num().ok())
            .unwrap_or(0.0);
        let widths = simple_widths(doc, dict);

        Self {
            kind: FontKind::Simple,
            encoding,
            to_unicode,
            widths,
            default_width,
            base_font,
        }
    }

    fn from_type0_dict(doc: &Document, dict: &Dict, base_font: String) -> Self {
        let to_unicode = dict
            .get("ToUnicode")
            .map(|o| doc.resolve_object(o))
            .and_then(|obj| obj.as_stream().ok().cloned())
            .and_then(|s| crate::codec::decode_stream(&s.dict, &s.raw).ok())
            .map(|bytes| parse_tounicode_cmap(&bytes));

        let descendant = dict
            .get("DescendantFonts")
            .map(|o| doc.resolve_object(o))
            .and_then(|arr| arr.as_array().ok().and_then(|a| a.first().cloned()))
            .map(|first| doc.resolve_object(&first))
            .and_then(|obj| obj.as_dict().ok().cloned());

        let default_width = descendant
            .as_ref()
            .and_then(|d| d.get("DW"))
            .and_then(|o| o.as_num().ok())
            .unwrap_or(1000.0);
        let widths = descendant
            .as_ref()
            .map(|d| cid_widths(doc, d))
            .unwrap_or_default();

        Self {
            kind: FontKind::Type0,
            encoding: None,
            to_unicode,
            widths,
            default_width,
            base_font,
        }
    }

    /// Iterates the codes a content-stream string encodes: one byte per
    /// code for simple fonts, two bytes (big-endian) for Type0 fonts
    /// (spec.md §4.3 step 1: "Type0 fonts consume 2 bytes per code").
    pub fn decode_codes(&self, bytes: &[u8]) -> Vec<u32> {
        match self.kind {
            FontKind::Simple => bytes.iter().map(|&b| b as u32).collect(),
            FontKind::Type0 => bytes
                .chunks(2)
                .map(|c| {
                    if c.len() == 2 {
                        u32::from_be_bytes([0, 0, c[0], c[1]])
                    } else {
                        c[0] as u32
                    }
                })
                .collect(),
        }
    }

    /// Resolves a code to Unicode text: ToUnicode CMap first, then
    /// Differences/base encoding, falling back to U+FFFD (spec.md §3
    /// invariant: "missing mappings yield U+FFFD rather than aborting").
    pub fn decode_unicode(&self, code: u32) -> String {
        if let Some(cmap) = &self.to_unicode {
            if let Some(s) = cmap.lookup(code) {
                // ToUnicode bfchar/bfrange entries are free to spell a glyph
                // as a decomposed sequence (base + combining marks); fold to
                // NFC so spans built from adjacent codes compare and
                // concatenate as the single grapheme a reader expects.
                return s.nfc().collect();
            }
        }
        if let Some(table) = &self.encoding {
            if code <= 0xFF {
                return table.decode_byte(code as u8).to_string();
            }
        }
        '\u{FFFD}'.to_string()
    }

    /// Glyph width in 1/1000 text-space units (ISO 32000-1 §9.2.4).
    pub fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }
}

fn resolve_base_encoding(doc: &Document, dict: &Dict) -> Option<BaseEncoding> {
    let enc_obj = dict.get("Encoding")?;
    let resolved = doc.resolve_object(enc_obj);
    let name = match &*resolved {
        Object::Name(n) => n.as_str(),
        Object::Dict(d) => d.get("BaseEncoding").and_then(|o| o.as_name().ok())?,
        _ => return None,
    };
    Some(match name {
        "WinAnsiEncoding" => BaseEncoding::WinAnsi,
        "MacRomanEncoding" => BaseEncoding::MacRoman,
        "PDFDocEncoding" => BaseEncoding::PdfDoc,
        _ => BaseEncoding::Standard,
    })
}

fn simple_widths(doc: &Document, dict: &Dict) -> FxHashMap<u32, f64> {
    let mut map = FxHashMap::default();
    let first_char = dict.get("FirstChar").and_then(|o| o.as_int().ok()).unwrap_or(0);
    let Some(widths) = dict
        .get("Widths")
        .map(|o| doc.resolve_object(o))
        .and_then(|w| w.as_array().ok().map(|a| a.to_vec()))
    else {
        return map;
    };
    for (i, w) in widths.iter().enumerate() {
        if let Ok(v) = doc.resolve_object(w).as_num() {
            map.insert(first_char as u32 + i as u32, v);
        }
    }
    map
}

/// Parses a descendant font's `/W` array: `c [w1 w2 ...]` or `cFirst cLast w`
/// entries (ISO 32000-1 §9.7.4.3).
fn cid_widths(doc: &Document, descendant: &Dict) -> FxHashMap<u32, f64> {
    let mut map = FxHashMap::default();
    let Some(w) = descendant
        .get("W")
        .map(|o| doc.resolve_object(o))
        .and_then(|w| w.as_array().ok().map(|a| a.to_vec()))
    else {
        return map;
    };
    let mut i = 0;
    while i < w.len() {
        let Ok(c_first) = doc.resolve_object(&w[i]).as_int() else { break };
        i += 1;
        if i >= w.len() {
            break;
        }
        let next = doc.resolve_object(&w[i]);
        if let Ok(arr) = next.as_array() {
            for (j, width) in arr.iter().enumerate() {
                if let Ok(v) = doc.resolve_object(width).as_num() {
                    map.insert(c_first as u32 + j as u32, v);
                }
            }
            i += 1;
        } else if let Ok(c_last) = next.as_int() {
            i += 1;
            if i >= w.len() {
                break;
            }
            if let Ok(v) = doc.resolve_object(&w[i]).as_num() {
                for code in c_first..=c_last {
                    map.insert(code as u32, v);
                }
            }
            i += 1;
        } else {
            break;
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_font(widths: &[(u32, f64)], default_width: f64) -> Font {
        Font {
            kind: FontKind::Simple,
            encoding: Some(EncodingTable::new(BaseEncoding::WinAnsi)),
            to_unicode: None,
            widths: widths.iter().copied().collect(),
            default_width,
            base_font: "Test".to_string(),
        }
    }

    #[test]
    fn simple_font_decodes_one_byte_per_code() {
        let font = simple_font(&[], 0.0);
        assert_eq!(font.decode_codes(b"Hi"), vec![b'H' as u32, b'i' as u32]);
    }

    #[test]
    fn type0_font_decodes_two_bytes_per_code() {
        let font = Font {
            kind: FontKind::Type0,
            encoding: None,
            to_unicode: None,
            widths: FxHashMap::default(),
            default_width: 1000.0,
            base_font: "Test".to_string(),
        };
        assert_eq!(font.decode_codes(&[0x00, 0x41, 0x00, 0x42]), vec![0x41, 0x42]);
    }

    #[test]
    fn width_falls_back_to_default_when_unmapped() {
        let font = simple_font(&[(65, 600.0)], 250.0);
        assert_eq!(font.width(65), 600.0);
        assert_eq!(font.width(66), 250.0);
    }

    #[test]
    fn decode_unicode_falls_back_to_encoding_then_replacement() {
        let font = simple_font(&[], 0.0);
        assert_eq!(font.decode_unicode(b'A' as u32), "A");
        assert_eq!(font.decode_unicode(0x1_0000), "\u{FFFD}");
    }
}
