use thiserror::Error;

use crate::node::ElementKind;
use crate::ops::Path;

/// A primitive op could not be applied to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: Path, reason: String },

    #[error("expected a text node at {path:?}")]
    NotAText { path: Path },

    #[error("expected an element at {path:?}")]
    NotAnElement { path: Path },
}

impl ApplyError {
    pub(crate) fn invalid_path(path: &[usize], reason: impl Into<String>) -> Self {
        ApplyError::InvalidPath {
            path: path.to_vec(),
            reason: reason.into(),
        }
    }
}

/// A mutation was rejected. The tree it was given is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("selection does not resolve to text in the document")]
    MalformedSelection,

    #[error("`{0}` is not a void element")]
    NotVoid(ElementKind),

    #[error("`{0}` is a void element and cannot be toggled as a block type")]
    VoidBlockType(ElementKind),

    #[error("`{0}` is only set by toggling a list type")]
    ListItemBlockType(ElementKind),

    #[error("expanded selection touches no text")]
    NoTextInRange,

    #[error("normalization did not converge after {0} iterations")]
    NormalizeDidNotConverge(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mark `{0}` (expected bold, italic or underline)")]
pub struct ParseMarkError(pub String);

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported document schema `{schema}` version {version}")]
    UnsupportedSchema { schema: String, version: u32 },
}
