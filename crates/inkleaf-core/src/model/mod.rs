//! PDF data model: objects, identifiers, and geometric primitives.

pub mod geometry;
pub mod objects;

pub use geometry::{apply_matrix_pt, apply_matrix_rect, mult_matrix, Matrix, Point, Rect, IDENTITY};
pub use objects::{Dict, ObjId, Object, Stream};
