//! LZWDecode filter (ISO 32000-1 §7.4.4.2), PDF's early-change variant.

use crate::error::{PdfError, Result};
use weezl::{decode::Decoder, BitOrder};

/// Decodes LZW data as PDF emits it: MSB bit order, 8-bit initial code size,
/// and the "early change" convention (code width bumps one code early).
pub fn lzw_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(BitOrder::Msb, 8);
    let mut out = Vec::with_capacity(data.len() * 3);
    let result = decoder.into_stream(&mut out).decode_all(data);
    result
        .status
        .map_err(|e| PdfError::Decode(format!("lzw: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_empty_input() {
        assert_eq!(lzw_decode(&[]).unwrap(), Vec::<u8>::new());
    }
}
