//! Font and encoding resolution (component F): mapping glyph codes to
//! Unicode via `/Encoding`, `/ToUnicode` CMaps, and `/Differences` arrays.

pub mod cmap;
pub mod encoding;
pub mod pdffont;

pub use encoding::{BaseEncoding, EncodingTable};
pub use pdffont::{Font, FontKind};
