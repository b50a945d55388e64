//! FlateDecode filter plus PNG/TIFF predictor reversal (ISO 32000-1 §7.4.4).

use crate::error::{PdfError, Result};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Parameters from `/DecodeParms` that govern predictor reversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictorParams {
    pub predictor: i64,
    pub columns: usize,
    pub colors: usize,
    pub bits_per_component: usize,
}

impl PredictorParams {
    pub fn none() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

/// Inflates zlib-wrapped data. Real-world producers sometimes truncate or
/// corrupt the tail of a stream; rather than discarding the whole page we
/// return whatever the decoder managed to produce before it errored, mirroring
/// the recovery policy in spec.md §7 ("filter failures fail the stream, not
/// the document" — a partial result is preferable to none when the caller is
/// only after as much text as can be salvaged).
pub fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 3);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) if !out.is_empty() => Ok(out),
        Err(e) => Err(PdfError::Decode(format!("flate: {e}"))),
    }
}

/// Reverses a PNG (predictor >= 10) or TIFF (predictor == 2) predictor,
/// applied by the producer after FlateDecode compression per `/DecodeParms`.
pub fn apply_predictor(data: &[u8], params: PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 | 0 => Ok(data.to_vec()),
        2 => Ok(apply_tiff_predictor(
            data,
            params.columns,
            params.colors,
            params.bits_per_component,
        )),
        p if p >= 10 => apply_png_predictor(data, params.columns, params.colors, params.bits_per_component),
        p => Err(PdfError::Decode(format!("unsupported predictor {p}"))),
    }
}

fn apply_tiff_predictor(data: &[u8], columns: usize, colors: usize, bits: usize) -> Vec<u8> {
    if bits != 8 {
        // Sub-byte TIFF prediction is rare in text-bearing PDFs; pass the
        // bytes through unmodified rather than producing garbage.
        return data.to_vec();
    }
    let row_bytes = colors * columns;
    let mut out = data.to_vec();
    for row in out.chunks_mut(row_bytes) {
        for i in colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - colors]);
        }
    }
    out
}

fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (a as i32, b as i32, c as i32);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

fn apply_png_predictor(data: &[u8], columns: usize, colors: usize, bits: usize) -> Result<Vec<u8>> {
    let row_bytes = (colors * columns * bits).div_ceil(8);
    let bpp = ((colors * bits) / 8).max(1);
    let row_size = row_bytes + 1;
    if row_size == 0 {
        return Err(PdfError::Decode("predictor row size is zero".into()));
    }

    let mut result = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];

    for row_start in (0..data.len()).step_by(row_size) {
        if row_start + row_size > data.len() {
            break;
        }
        let filter_type = data[row_start];
        let in_row = &data[row_start + 1..row_start + row_size];
        let mut cur_row = vec![0u8; row_bytes];

        match filter_type {
            0 => cur_row.copy_from_slice(in_row),
            1 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { cur_row[i - bpp] } else { 0 };
                    cur_row[i] = in_row[i].wrapping_add(left);
                }
            }
            2 => {
                for i in 0..row_bytes {
                    cur_row[i] = in_row[i].wrapping_add(prev_row[i]);
                }
            }
            3 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { cur_row[i - bpp] } else { 0 };
                    let avg = (left as u16 + prev_row[i] as u16) / 2;
                    cur_row[i] = in_row[i].wrapping_add(avg as u8);
                }
            }
            4 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { cur_row[i - bpp] } else { 0 };
                    let up = prev_row[i];
                    let up_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
                    cur_row[i] = in_row[i].wrapping_add(paeth_predictor(left, up, up_left));
                }
            }
            other => {
                return Err(PdfError::Decode(format!("unknown PNG filter type {other}")));
            }
        }

        result.extend_from_slice(&cur_row);
        prev_row = cur_row;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn round_trips_plain_zlib() {
        let compressed = zlib(b"hello reading order");
        let decoded = flate_decode(&compressed).unwrap();
        assert_eq!(decoded, b"hello reading order");
    }

    #[test]
    fn none_predictor_is_identity() {
        let data = b"abcxyz";
        let out = apply_predictor(data, PredictorParams::none()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn png_sub_filter_reverses_delta() {
        // One row, 1 color, 8 bits, 2 columns: filter=1 (Sub), deltas [10, 5].
        let row = [1u8, 10, 5];
        let out = apply_png_predictor(&row, 2, 1, 8).unwrap();
        assert_eq!(out, vec![10, 15]);
    }

    #[test]
    fn tiff_predictor_accumulates_across_row() {
        let row = [10u8, 5, 5];
        let out = apply_tiff_predictor(&row, 3, 1, 8);
        assert_eq!(out, vec![10, 15, 20]);
    }
}
