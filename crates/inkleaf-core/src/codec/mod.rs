//! Filter pipeline: decodes a stream's raw bytes through its `/Filter` chain.

pub mod ascii85;
pub mod flate;
pub mod lzw;
pub mod runlength;

use crate::error::{PdfError, Result};
use crate::model::objects::{Dict, Object};
use flate::PredictorParams;

/// Decodes `raw` through the filter(s) and `/DecodeParms` named in `dict`.
///
/// `/Filter` may be a single name or an array applied left to right;
/// `/DecodeParms` supplies parameters per position (ISO 32000-1 §7.4). An
/// unknown filter name fails only this stream — callers treat that as an
/// empty decoded payload and continue with the next object, per spec.md
/// §4.2/§7.
pub fn decode_stream(dict: &Dict, raw: &[u8]) -> Result<Vec<u8>> {
    let filters = filter_names(dict);
    let parms = decode_parms(dict, filters.len());

    let mut data = raw.to_vec();
    for (name, parm) in filters.iter().zip(parms.iter()) {
        data = apply_filter(name, &data, parm)?;
    }
    Ok(data)
}

fn filter_names(dict: &Dict) -> Vec<String> {
    match dict.get("Filter") {
        Some(Object::Name(n)) => vec![n.clone()],
        Some(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_parms(dict: &Dict, count: usize) -> Vec<Option<Dict>> {
    let raw = dict.get("DecodeParms").or_else(|| dict.get("DP"));
    let single = |o: &Object| o.as_dict().ok().cloned();
    match raw {
        Some(Object::Array(arr)) => {
            let mut out: Vec<Option<Dict>> = arr.iter().map(|o| single(o)).collect();
            out.resize(count, None);
            out
        }
        Some(obj) => {
            let mut out = vec![single(obj)];
            out.resize(count, None);
            out
        }
        None => vec![None; count],
    }
}

fn apply_filter(name: &str, data: &[u8], parm: &Option<Dict>) -> Result<Vec<u8>> {
    match name {
        "FlateDecode" | "Fl" => {
            let decoded = flate::flate_decode(data)?;
            apply_predictor_if_any(decoded, parm)
        }
        "LZWDecode" | "LZW" => {
            let decoded = lzw::lzw_decode(data)?;
            apply_predictor_if_any(decoded, parm)
        }
        "ASCII85Decode" | "A85" => ascii85::ascii85_decode(data),
        "ASCIIHexDecode" | "AHx" => ascii85::asciihex_decode(data),
        "RunLengthDecode" | "RL" => runlength::runlength_decode(data),
        other => Err(PdfError::Decode(format!("unsupported filter {other}"))),
    }
}

fn apply_predictor_if_any(decoded: Vec<u8>, parm: &Option<Dict>) -> Result<Vec<u8>> {
    let Some(parm) = parm else {
        return Ok(decoded);
    };
    let predictor = parm
        .get("Predictor")
        .and_then(|o| o.as_int().ok())
        .unwrap_or(1);
    if predictor <= 1 {
        return Ok(decoded);
    }
    let params = PredictorParams {
        predictor,
        columns: parm.get("Columns").and_then(|o| o.as_int().ok()).unwrap_or(1) as usize,
        colors: parm.get("Colors").and_then(|o| o.as_int().ok()).unwrap_or(1) as usize,
        bits_per_component: parm
            .get("BitsPerComponent")
            .and_then(|o| o.as_int().ok())
            .unwrap_or(8) as usize,
    };
    flate::apply_predictor(&decoded, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objects::Dict;

    #[test]
    fn single_name_filter_resolves_to_one_entry() {
        let mut dict = Dict::new();
        dict.insert("Filter".into(), Object::Name("ASCII85Decode".into()));
        assert_eq!(filter_names(&dict), vec!["ASCII85Decode".to_string()]);
    }

    #[test]
    fn array_filter_chain_preserves_order() {
        let mut dict = Dict::new();
        dict.insert(
            "Filter".into(),
            Object::Array(vec![
                Object::Name("ASCII85Decode".into()),
                Object::Name("FlateDecode".into()),
            ]),
        );
        assert_eq!(
            filter_names(&dict),
            vec!["ASCII85Decode".to_string(), "FlateDecode".to_string()]
        );
    }

    #[test]
    fn unknown_filter_fails_the_stream_not_the_caller_type() {
        let mut dict = Dict::new();
        dict.insert("Filter".into(), Object::Name("JPXDecode".into()));
        let err = decode_stream(&dict, b"whatever").unwrap_err();
        assert!(matches!(err, PdfError::Decode(_)));
    }
}
