//! Public extraction surface (spec.md §4.5): opening documents and running
//! the stream/reading/bounds/Markdown extraction calls over them.

pub mod document;
pub(crate) mod driver;

pub use document::{Document, ExtractMode, PageInfo};
