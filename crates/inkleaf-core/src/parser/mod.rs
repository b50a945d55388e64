//! Object decoder: turns a token stream into [`Object`] values.

pub mod lexer;

use crate::error::{PdfError, Result};
use crate::model::objects::{Dict, Object, ObjId};
use lexer::{Lexer, Token};

/// Parses a single PDF object starting at `pos` in `data`.
///
/// Returns the object and the position just past it. Indirect references
/// (`12 0 R`) and inline stream bodies (`dict` immediately followed by
/// `stream`/`endstream`) are recognised; nested references inside composite
/// values are left as [`Object::Reference`] for lazy resolution, per
/// spec.md §4.1.
pub fn parse_object(data: &[u8], pos: usize) -> Result<(Object, usize)> {
    let mut lexer = Lexer::at(data, pos);
    let obj = parse_value(&mut lexer, data)?;
    Ok((obj, lexer.pos()))
}

/// Parses an indirect object body at `offset`, skipping its `N G obj`
/// header first. Used by the xref resolver and reconstruction scan, which
/// only have a byte offset to the header, not to the value itself.
pub fn parse_indirect_object_at(data: &[u8], offset: usize) -> Result<(Object, usize)> {
    let mut lexer = Lexer::at(data, offset);
    for _ in 0..3 {
        match lexer.next_token()? {
            Token::Keyword(kw) if kw == "obj" => break,
            Token::Int(_) => continue,
            _ => break,
        }
    }
    let value = parse_value(&mut lexer, data)?;
    Ok((value, lexer.pos()))
}

fn parse_value(lexer: &mut Lexer<'_>, data: &[u8]) -> Result<Object> {
    let save = lexer.pos();
    let tok = lexer.next_token()?;
    match tok {
        Token::Int(n) => {
            // Could be the start of "12 0 R" (indirect reference).
            let after_int = lexer.pos();
            if let Ok(Token::Int(gen)) = lexer.next_token() {
                let after_gen = lexer.pos();
                if let Ok(Token::Keyword(kw)) = lexer.next_token() {
                    if kw == "R" {
                        return Ok(Object::Reference(ObjId::new(n as u32, gen as u16)));
                    }
                }
                lexer.seek(after_gen);
            }
            lexer.seek(after_int);
            Ok(Object::Int(n))
        }
        Token::Real(n) => Ok(Object::Real(n)),
        Token::Name(n) => Ok(Object::Name(n)),
        Token::LiteralString(s) | Token::HexString(s) => Ok(Object::String(s)),
        Token::ArrayStart => {
            let mut items = Vec::new();
            loop {
                let before = lexer.pos();
                match lexer.next_token()? {
                    Token::ArrayEnd => break,
                    Token::Eof => return Err(PdfError::UnexpectedEof),
                    _ => {
                        lexer.seek(before);
                        items.push(parse_value(lexer, data)?);
                    }
                }
            }
            Ok(Object::Array(items))
        }
        Token::DictStart => {
            let dict = parse_dict_body(lexer, data)?;
            // A dict immediately followed by `stream` is a stream object.
            let before_kw = lexer.pos();
            if let Ok(Token::Keyword(kw)) = lexer.next_token() {
                if kw == "stream" {
                    return parse_stream_body(lexer, data, dict);
                }
            }
            lexer.seek(before_kw);
            Ok(Object::Dict(dict))
        }
        Token::Keyword(kw) => match kw.as_str() {
            "true" => Ok(Object::Bool(true)),
            "false" => Ok(Object::Bool(false)),
            "null" => Ok(Object::Null),
            _ => Err(PdfError::Syntax(format!("unexpected keyword '{kw}'"))),
        },
        Token::Eof => Err(PdfError::UnexpectedEof),
        Token::ArrayEnd | Token::DictEnd => {
            lexer.seek(save);
            Err(PdfError::Syntax("unexpected closing delimiter".into()))
        }
    }
}

fn parse_dict_body(lexer: &mut Lexer<'_>, data: &[u8]) -> Result<Dict> {
    let mut dict = Dict::new();
    loop {
        match lexer.next_token()? {
            Token::DictEnd => break,
            Token::Name(key) => {
                let value = parse_value(lexer, data)?;
                dict.insert(key, value);
            }
            Token::Eof => return Err(PdfError::UnexpectedEof),
            other => {
                return Err(PdfError::Syntax(format!(
                    "expected dict key, got {other:?}"
                )));
            }
        }
    }
    Ok(dict)
}

fn parse_stream_body(lexer: &mut Lexer<'_>, data: &[u8], dict: Dict) -> Result<Object> {
    // Per spec, `stream` is followed by CRLF or LF (never a lone CR), then
    // exactly /Length raw bytes, then `endstream`.
    let mut pos = lexer.pos();
    if data.get(pos) == Some(&b'\r') {
        pos += 1;
    }
    if data.get(pos) == Some(&b'\n') {
        pos += 1;
    }
    let length = dict
        .get("Length")
        .and_then(|o| o.as_int().ok())
        .filter(|&n| n >= 0)
        .map(|n| n as usize);

    let body_start = pos;
    let body_end = match length {
        Some(len) if body_start + len <= data.len() => {
            let candidate = body_start + len;
            // Trust /Length only if `endstream` actually follows (within a
            // small whitespace tolerance); otherwise scan for it, since
            // producers sometimes write a stale /Length after hand-editing.
            if find_endstream_near(data, candidate).is_some() {
                candidate
            } else {
                scan_for_endstream(data, body_start)
            }
        }
        _ => scan_for_endstream(data, body_start),
    };

    let raw = data[body_start..body_end.min(data.len())].to_vec();
    let mut new_pos = body_end;
    // Skip to and past `endstream`.
    if let Some(kw_pos) = find_keyword(data, new_pos, b"endstream") {
        new_pos = kw_pos + b"endstream".len();
    }
    lexer.seek(new_pos);
    Ok(Object::Stream(Box::new(crate::model::objects::Stream {
        dict,
        raw,
    })))
}

fn find_endstream_near(data: &[u8], pos: usize) -> Option<usize> {
    let window_end = (pos + 32).min(data.len());
    find_keyword(data, pos, b"endstream").filter(|&p| p < window_end)
}

fn scan_for_endstream(data: &[u8], from: usize) -> usize {
    find_keyword(data, from, b"endstream").unwrap_or(data.len())
}

fn find_keyword(data: &[u8], from: usize, kw: &[u8]) -> Option<usize> {
    data[from.min(data.len())..]
        .windows(kw.len())
        .position(|w| w == kw)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indirect_reference() {
        let (obj, _) = parse_object(b"12 0 R", 0).unwrap();
        assert_eq!(obj, Object::Reference(ObjId::new(12, 0)));
    }

    #[test]
    fn parses_plain_integer_not_followed_by_r() {
        let (obj, _) = parse_object(b"12 0 obj", 0).unwrap();
        assert_eq!(obj, Object::Int(12));
    }

    #[test]
    fn parses_nested_dict_and_array() {
        let (obj, _) =
            parse_object(b"<< /Kids [1 0 R 2 0 R] /Count 2 >>", 0).unwrap();
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict["Count"], Object::Int(2));
        assert_eq!(dict["Kids"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn parses_stream_with_correct_length() {
        let data = b"<< /Length 5 >>\nstream\nhello\nendstream";
        let (obj, _) = parse_object(data, 0).unwrap();
        let stream = obj.as_stream().unwrap();
        assert_eq!(stream.raw, b"hello");
    }

    #[test]
    fn recovers_stream_with_wrong_length_by_scanning() {
        let data = b"<< /Length 999 >>\nstream\nhello\nendstream";
        let (obj, _) = parse_object(data, 0).unwrap();
        let stream = obj.as_stream().unwrap();
        assert_eq!(stream.raw, b"hello");
    }
}
