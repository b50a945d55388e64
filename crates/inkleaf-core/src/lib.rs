//! inkleaf-core: PDF text extraction.
//!
//! Stream-order and reading-order extraction over arbitrary real-world
//! PDFs, including PDF/UA-tagged documents: cross-reference resolution,
//! filter decoding, content-stream interpretation, font/encoding
//! resolution, structure-tree and geometric reading-order reconstruction,
//! and a Markdown formatter over the result.
//!
//! The public surface is [`api::Document`]; the rest of the crate is the
//! machinery it's built from.

pub mod api;
pub mod codec;
pub mod document;
pub mod error;
pub mod font;
pub mod interp;
pub mod layout;
pub mod markdown;
pub mod model;
pub mod parser;

pub use api::{Document, ExtractMode, PageInfo};
pub use error::{PdfError, Result};
