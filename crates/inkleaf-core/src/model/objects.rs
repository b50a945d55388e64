//! PDF object model: the fundamental value type and indirect references.

use crate::error::{PdfError, Result};
use indexmap::IndexMap;

/// An indirect object identifier: (object number, generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId {
    pub num: u32,
    pub gen: u16,
}

impl ObjId {
    pub const fn new(num: u32, gen: u16) -> Self {
        Self { num, gen }
    }
}

/// A PDF dictionary preserves insertion order, matching how most producers
/// emit them; lookups are still O(1) via the underlying hash index.
pub type Dict = IndexMap<String, Object>;

/// A decoded stream object: its dictionary plus the still-filtered payload.
/// Filters are applied lazily by [`crate::codec::decode_stream`] so a caller
/// that only wants `/Length` never pays for decompression.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dict,
    pub raw: Vec<u8>,
}

/// The fundamental PDF value type (ISO 32000-1 §7.3).
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(String),
    String(Vec<u8>),
    Array(Vec<Object>),
    Dict(Dict),
    Stream(Box<Stream>),
    Reference(ObjId),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Stream(_) => "stream",
            Self::Reference(_) => "reference",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Real(n) => Ok(*n as i64),
            _ => Err(type_err("int", self)),
        }
    }

    pub fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(type_err("number", self)),
        }
    }

    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(type_err("name", self)),
        }
    }

    pub fn as_string_bytes(&self) -> Result<&[u8]> {
        match self {
            Self::String(b) => Ok(b),
            _ => Err(type_err("string", self)),
        }
    }

    pub fn as_array(&self) -> Result<&[Object]> {
        match self {
            Self::Array(a) => Ok(a),
            _ => Err(type_err("array", self)),
        }
    }

    pub fn as_dict(&self) -> Result<&Dict> {
        match self {
            Self::Dict(d) => Ok(d),
            Self::Stream(s) => Ok(&s.dict),
            _ => Err(type_err("dict", self)),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(type_err("stream", self)),
        }
    }

    pub const fn as_reference(&self) -> Option<ObjId> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Array of 4 numbers, used for rectangles (MediaBox, CropBox, ...).
    pub fn as_rect(&self) -> Result<(f64, f64, f64, f64)> {
        let arr = self.as_array()?;
        if arr.len() != 4 {
            return Err(PdfError::Syntax(format!(
                "expected 4-element rectangle array, got {}",
                arr.len()
            )));
        }
        Ok((
            arr[0].as_num()?,
            arr[1].as_num()?,
            arr[2].as_num()?,
            arr[3].as_num()?,
        ))
    }
}

fn type_err(expected: &'static str, got: &Object) -> PdfError {
    PdfError::Syntax(format!("type error: expected {expected}, got {}", got.type_name()))
}
