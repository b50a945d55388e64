//! ToUnicode CMap parsing: `begincodespacerange`/`bfchar`/`bfrange` blocks.

use crate::parser::lexer::{Lexer, Token};
use rustc_hash::FxHashMap;

/// A parsed `/ToUnicode` CMap mapping one or more input bytes to a Unicode
/// string (spec.md §3: "Font ... optional ToUnicode CMap").
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    single: FxHashMap<u32, String>,
    ranges: Vec<(u32, u32, RangeDst)>,
    pub code_bytes: usize,
}

#[derive(Debug, Clone)]
enum RangeDst {
    /// Base Unicode scalar; the actual destination is `base + (code - lo)`
    /// per ISO 32000-1 §9.10.3's bfrange semantics for a single-value dst.
    Base(u32),
    Array(Vec<String>),
}

impl ToUnicodeCMap {
    /// Returns the decoded Unicode string for `code`, if mapped. Ranges
    /// with a single base destination compute their result on the fly, so
    /// this returns an owned `String` rather than a borrow.
    pub fn lookup(&self, code: u32) -> Option<String> {
        if let Some(s) = self.single.get(&code) {
            return Some(s.clone());
        }
        for (lo, hi, dst) in &self.ranges {
            if code >= *lo && code <= *hi {
                return match dst {
                    RangeDst::Base(base) => {
                        char::from_u32(base + (code - lo)).map(|c| c.to_string())
                    }
                    RangeDst::Array(arr) => arr.get((code - lo) as usize).cloned(),
                };
            }
        }
        None
    }
}

fn utf16_string_to_base_scalar(s: &str) -> u32 {
    s.chars().next().map(|c| c as u32).unwrap_or(0xFFFD)
}

/// Parses the decoded bytes of a `/ToUnicode` stream (a restricted
/// PostScript CMap program, ISO 32000-1 §9.10.3).
pub fn parse_tounicode_cmap(data: &[u8]) -> ToUnicodeCMap {
    let mut cmap = ToUnicodeCMap { code_bytes: 2, ..Default::default() };
    let mut lexer = Lexer::new(data);

    loop {
        let tok = match lexer.next_token() {
            Ok(Token::Eof) => break,
            Ok(t) => t,
            Err(_) => break,
        };
        match &tok {
            Token::Keyword(kw) if kw == "begincodespacerange" => {
                if let Ok(Token::HexString(lo)) = lexer.next_token() {
                    cmap.code_bytes = lo.len().max(1);
                }
                skip_block(&mut lexer, "endcodespacerange");
            }
            Token::Keyword(kw) if kw == "beginbfchar" => {
                parse_bfchar(&mut lexer, &mut cmap);
            }
            Token::Keyword(kw) if kw == "beginbfrange" => {
                parse_bfrange(&mut lexer, &mut cmap);
            }
            _ => {}
        }
    }
    cmap
}

fn skip_block(lexer: &mut Lexer<'_>, end_kw: &str) {
    loop {
        match lexer.next_token() {
            Ok(Token::Keyword(kw)) if kw == end_kw => break,
            Ok(Token::Eof) | Err(_) => break,
            _ => {}
        }
    }
}

fn hex_to_u32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn hex_to_utf16_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .filter(|c| c.len() == 2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn parse_bfchar(lexer: &mut Lexer<'_>, cmap: &mut ToUnicodeCMap) {
    loop {
        let src = match lexer.next_token() {
            Ok(Token::HexString(s)) => s,
            Ok(Token::Keyword(kw)) if kw == "endbfchar" => break,
            Ok(Token::Eof) | Err(_) => break,
            _ => continue,
        };
        let dst = match lexer.next_token() {
            Ok(Token::HexString(s)) => s,
            _ => break,
        };
        cmap.code_bytes = cmap.code_bytes.max(src.len().max(1));
        cmap.single.insert(hex_to_u32(&src), hex_to_utf16_string(&dst));
    }
}

fn parse_bfrange(lexer: &mut Lexer<'_>, cmap: &mut ToUnicodeCMap) {
    loop {
        let lo = match lexer.next_token() {
            Ok(Token::HexString(s)) => s,
            Ok(Token::Keyword(kw)) if kw == "endbfrange" => break,
            Ok(Token::Eof) | Err(_) => break,
            _ => continue,
        };
        let hi = match lexer.next_token() {
            Ok(Token::HexString(s)) => s,
            _ => break,
        };
        let lo_code = hex_to_u32(&lo);
        let hi_code = hex_to_u32(&hi);
        cmap.code_bytes = cmap.code_bytes.max(lo.len().max(1));

        match lexer.next_token() {
            Ok(Token::HexString(dst)) => {
                let base = utf16_string_to_base_scalar(&hex_to_utf16_string(&dst));
                cmap.ranges.push((lo_code, hi_code, RangeDst::Base(base)));
            }
            Ok(Token::ArrayStart) => {
                let mut items = Vec::new();
                loop {
                    match lexer.next_token() {
                        Ok(Token::HexString(s)) => items.push(hex_to_utf16_string(&s)),
                        Ok(Token::ArrayEnd) | Ok(Token::Eof) | Err(_) => break,
                        _ => {}
                    }
                }
                cmap.ranges.push((lo_code, hi_code, RangeDst::Array(items)));
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bfchar_entries() {
        let data = b"1 beginbfchar\n<20> <0041>\n<21> <0042>\nendbfchar";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.lookup(0x20), Some("A".to_string()));
        assert_eq!(cmap.lookup(0x21), Some("B".to_string()));
    }

    #[test]
    fn parses_bfrange_with_base_offset() {
        let data = b"1 beginbfrange\n<0041> <0043> <0061>\nendbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.lookup(0x42), Some("b".to_string()));
    }

    #[test]
    fn parses_bfrange_with_array_destination() {
        let data = b"1 beginbfrange\n<01> <03> [<0041> <0042> <0043>]\nendbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.lookup(2), Some("B".to_string()));
    }
}
