//! ASCII85 and ASCIIHex stream decoders (ISO 32000-1 §7.4.2/7.4.3).

use crate::error::Result;

/// Decodes ASCII85-encoded data, handling the PDF variant: optional `<~`
/// prefix, `~>` terminator, `z`-run shorthand, and interspersed whitespace.
pub fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut filtered = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0c | 0x00 => continue,
            b'z' => filtered.extend_from_slice(b"!!!!!"),
            b'!'..=b'u' => filtered.push(byte),
            _ => continue,
        }
    }

    let mut out = Vec::with_capacity(filtered.len() * 4 / 5 + 4);
    for chunk in filtered.chunks(5) {
        if chunk.len() == 5 {
            let mut value: u32 = 0;
            for &b in chunk {
                value = value.wrapping_mul(85).wrapping_add((b - b'!') as u32);
            }
            out.extend_from_slice(&value.to_be_bytes());
        } else if !chunk.is_empty() {
            let mut padded = [b'u'; 5];
            padded[..chunk.len()].copy_from_slice(chunk);
            let mut value: u32 = 0;
            for &b in &padded {
                value = value.wrapping_mul(85).wrapping_add((b - b'!') as u32);
            }
            out.extend_from_slice(&value.to_be_bytes()[..chunk.len() - 1]);
        }
    }
    Ok(out)
}

/// Decodes ASCIIHex-encoded data, ignoring whitespace and stopping at `>`.
pub fn asciihex_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut digits = Vec::with_capacity(data.len());
    for &b in data {
        if b == b'>' {
            break;
        }
        if b.is_ascii_hexdigit() {
            digits.push(b);
        }
    }
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    let hex_val = |b: u8| -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => 0,
        }
    };
    Ok(digits
        .chunks(2)
        .map(|c| hex_val(c[0]) * 16 + hex_val(c[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_vector() {
        // "Man " encodes to "9jqo^" in Adobe's ASCII85 variant.
        let decoded = ascii85_decode(b"9jqo^~>").unwrap();
        assert_eq!(decoded, b"Man ");
    }

    #[test]
    fn expands_z_shorthand() {
        let decoded = ascii85_decode(b"z~>").unwrap();
        assert_eq!(decoded, [0u8; 4]);
    }

    #[test]
    fn asciihex_ignores_whitespace_and_stops_at_marker() {
        let decoded = asciihex_decode(b"48 65 6C 6C 6F>ignored").unwrap();
        assert_eq!(decoded, b"Hello");
    }
}
