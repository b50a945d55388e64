//! Byte-to-glyph-name encodings: StandardEncoding, WinAnsiEncoding, and
//! `/Differences` overrides (ISO 32000-1 Annex D).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A 256-entry map from byte code to Unicode scalar, with `/Differences`
/// overrides layered on top of a base encoding.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    base: [Option<char>; 256],
    overrides: HashMap<u8, char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
    PdfDoc,
}

impl EncodingTable {
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base: base_table(base),
            overrides: HashMap::new(),
        }
    }

    /// Applies a `/Differences` array: alternating code/name entries where a
    /// bare integer resets the "current code" and each following name
    /// assigns the next sequential code, per ISO 32000-1 §9.6.6.2.
    pub fn apply_differences(&mut self, entries: &[crate::model::objects::Object]) {
        let mut code: i64 = 0;
        for entry in entries {
            match entry {
                crate::model::objects::Object::Int(n) => code = *n,
                crate::model::objects::Object::Real(n) => code = *n as i64,
                crate::model::objects::Object::Name(name) => {
                    if (0..256).contains(&code) {
                        if let Some(ch) = glyph_name_to_unicode(name) {
                            self.overrides.insert(code as u8, ch);
                        }
                    }
                    code += 1;
                }
                _ => {}
            }
        }
    }

    pub fn decode_byte(&self, byte: u8) -> char {
        self.overrides
            .get(&byte)
            .copied()
            .or(self.base[byte as usize])
            .unwrap_or('\u{FFFD}')
    }
}

/// Resolves a subset of Adobe Glyph List naming conventions: literal names
/// for common Latin punctuation/letters, `uniXXXX` hex codepoints, and
/// `uXXXX`/`uXXXXXX` short forms. Unrecognised names yield `None`, which
/// the caller folds to U+FFFD rather than aborting (spec.md §3 invariant).
pub fn glyph_name_to_unicode(name: &str) -> Option<char> {
    if let Some(ch) = ADOBE_GLYPH_NAMES.get(name) {
        return Some(*ch);
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() >= 4 {
            return u32::from_str_radix(&hex[..4], 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    None
}

static ADOBE_GLYPH_NAMES: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (name, ch) in COMMON_GLYPH_NAMES {
        m.insert(*name, *ch);
    }
    m
});

/// A hand-picked subset of the Adobe Glyph List covering the names that
/// actually appear in `/Differences` arrays for Latin-script text; this is
/// deliberately not the full ~4,000-entry AGL table.
const COMMON_GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '), ("exclam", '!'), ("quotedbl", '"'), ("numbersign", '#'),
    ("dollar", '$'), ("percent", '%'), ("ampersand", '&'), ("quotesingle", '\''),
    ("parenleft", '('), ("parenright", ')'), ("asterisk", '*'), ("plus", '+'),
    ("comma", ','), ("hyphen", '-'), ("period", '.'), ("slash", '/'),
    ("colon", ':'), ("semicolon", ';'), ("less", '<'), ("equal", '='),
    ("greater", '>'), ("question", '?'), ("at", '@'), ("bracketleft", '['),
    ("backslash", '\\'), ("bracketright", ']'), ("asciicircum", '^'),
    ("underscore", '_'), ("grave", '`'), ("braceleft", '{'), ("bar", '|'),
    ("braceright", '}'), ("asciitilde", '~'), ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'), ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'), ("endash", '\u{2013}'), ("emdash", '\u{2014}'),
    ("bullet", '\u{2022}'), ("ellipsis", '\u{2026}'), ("fi", '\u{FB01}'),
    ("fl", '\u{FB02}'), ("dagger", '\u{2020}'), ("daggerdbl", '\u{2021}'),
    ("florin", '\u{0192}'), ("trademark", '\u{2122}'), ("copyright", '\u{00A9}'),
    ("registered", '\u{00AE}'), ("degree", '\u{00B0}'), ("eacute", '\u{00E9}'),
    ("egrave", '\u{00E8}'), ("agrave", '\u{00E0}'), ("ccedilla", '\u{00E7}'),
    ("ntilde", '\u{00F1}'), ("adieresis", '\u{00E4}'), ("odieresis", '\u{00F6}'),
    ("udieresis", '\u{00FC}'),
];

fn ascii_identity_table() -> [Option<char>; 256] {
    let mut t = [None; 256];
    for (i, slot) in t.iter_mut().enumerate().take(127).skip(32) {
        *slot = char::from_u32(i as u32);
    }
    t
}

fn base_table(encoding: BaseEncoding) -> [Option<char>; 256] {
    let mut t = ascii_identity_table();
    match encoding {
        // WinAnsiEncoding matches Windows-1252 (a superset of Latin-1 for
        // 0xA0..=0xFF, with printable punctuation in 0x80..=0x9F).
        BaseEncoding::WinAnsi | BaseEncoding::PdfDoc => {
            for i in 0xA0u32..=0xFF {
                t[i as usize] = char::from_u32(i);
            }
            for &(code, ch) in WIN_ANSI_HIGH {
                t[code as usize] = Some(ch);
            }
        }
        // A close approximation of Adobe StandardEncoding: ASCII plus a
        // handful of the most common high-byte glyphs (quotes, dashes).
        BaseEncoding::Standard | BaseEncoding::MacRoman => {
            for &(code, name) in STANDARD_HIGH {
                if let Some(ch) = glyph_name_to_unicode(name) {
                    t[code as usize] = Some(ch);
                }
            }
        }
    }
    t
}

const WIN_ANSI_HIGH: &[(u8, char)] = &[
    (0x80, '\u{20AC}'), (0x82, '\u{201A}'), (0x83, '\u{0192}'), (0x84, '\u{201E}'),
    (0x85, '\u{2026}'), (0x86, '\u{2020}'), (0x87, '\u{2021}'), (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'), (0x8A, '\u{0160}'), (0x8B, '\u{2039}'), (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'), (0x91, '\u{2018}'), (0x92, '\u{2019}'), (0x93, '\u{201C}'),
    (0x94, '\u{201D}'), (0x95, '\u{2022}'), (0x96, '\u{2013}'), (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'), (0x99, '\u{2122}'), (0x9A, '\u{0161}'), (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'), (0x9E, '\u{017E}'), (0x9F, '\u{0178}'),
];

const STANDARD_HIGH: &[(u8, &str)] = &[
    (0x91, "quoteleft"), (0x92, "quoteright"), (0x93, "quotedblleft"),
    (0x94, "quotedblright"), (0x96, "endash"), (0x97, "emdash"),
    (0xA5, "bullet"), (0xA1, "exclamdown"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_identity_is_preserved() {
        let table = EncodingTable::new(BaseEncoding::WinAnsi);
        assert_eq!(table.decode_byte(b'A'), 'A');
    }

    #[test]
    fn winansi_maps_euro_sign() {
        let table = EncodingTable::new(BaseEncoding::WinAnsi);
        assert_eq!(table.decode_byte(0x80), '\u{20AC}');
    }

    #[test]
    fn differences_override_base_encoding() {
        let mut table = EncodingTable::new(BaseEncoding::WinAnsi);
        table.apply_differences(&[
            crate::model::objects::Object::Int(65),
            crate::model::objects::Object::Name("bullet".into()),
        ]);
        assert_eq!(table.decode_byte(65), '\u{2022}');
    }

    #[test]
    fn unmapped_byte_yields_replacement_char() {
        let table = EncodingTable::new(BaseEncoding::Standard);
        assert_eq!(table.decode_byte(0x01), '\u{FFFD}');
    }

    #[test]
    fn glyph_name_resolves_uni_hex_form() {
        assert_eq!(glyph_name_to_unicode("uni00E9"), Some('\u{00E9}'));
    }
}
