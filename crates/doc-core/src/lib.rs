mod apply;
mod config;
mod editor;
mod error;
mod node;
mod normalize;
mod ops;
mod query;
mod selection;
mod transforms;
mod value;

pub use crate::config::*;
pub use crate::editor::*;
pub use crate::error::*;
pub use crate::node::*;
pub use crate::normalize::*;
pub use crate::ops::*;
pub use crate::query::{
    active_list_kind, active_marks, is_block_active, is_mark_active, touched_text_nodes,
};
pub use crate::selection::*;
pub use crate::transforms::{
    Edit, Transforms, apply_transaction, insert_void_element, toggle_block, toggle_mark,
};
pub use crate::value::*;
