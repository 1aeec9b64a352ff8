//! HTML export for slide documents.
//!
//! [`serialize`] turns a document into a compact HTML fragment with no
//! whitespace between siblings. [`render_slide`] is the caller-side step
//! that places those fragments into the indented slide wrapper markup.

mod serialize;
mod slide;

pub use crate::serialize::{serialize, serialize_node};
pub use crate::slide::{SlideAreas, render_slide};
