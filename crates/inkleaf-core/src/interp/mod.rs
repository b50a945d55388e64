//! Content-stream interpretation (component E): operator execution, text
//! state tracking, and span emission.

pub mod interpreter;
pub mod ops;

pub use interpreter::{run_content_stream, TextState};
