use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::error::EditError;
use crate::node::{Document, ElementKind, ElementNode, Mark, Marks};
use crate::normalize::Normalizer;
use crate::ops::{Op, Transaction};
use crate::query;
use crate::selection::{Selection, normalize_selection};
use crate::transforms::{Edit, Transforms};

/// A user-level editing action, as a toolbar or key handler would issue it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ToggleMark {
        mark: Mark,
    },
    ToggleBlock {
        block: ElementKind,
    },
    InsertImage {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl Command {
    /// Ctrl/Cmd + B, I or U.
    pub fn from_hotkey(key: char, ctrl_or_cmd: bool) -> Option<Self> {
        if !ctrl_or_cmd {
            return None;
        }
        Mark::from_hotkey(key).map(|mark| Command::ToggleMark { mark })
    }
}

/// One editing area: a document, the selection inside it, and the
/// transforms that mutate both. Every mutation either applies completely or
/// leaves the editor as it was.
pub struct Editor {
    doc: Document,
    selection: Selection,
    transforms: Transforms,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection) -> Self {
        Self::with_config(doc, selection, EditorConfig::default())
    }

    pub fn with_config(doc: Document, selection: Selection, config: EditorConfig) -> Self {
        let transforms = Transforms::new(config, Normalizer::core());
        let (doc, selection) =
            match transforms.apply_transaction(&doc, &selection, &Transaction::default()) {
                Ok(edit) => (edit.document, edit.selection),
                Err(err) => {
                    tracing::warn!(%err, "initial document could not be normalized");
                    let selection = normalize_selection(&doc, &selection);
                    (doc, selection)
                }
            };
        Self {
            doc,
            selection,
            transforms,
        }
    }

    /// A single empty paragraph with the caret in it.
    pub fn empty() -> Self {
        Self::new(Document::empty(), Selection::caret(vec![0, 0], 0))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = normalize_selection(&self.doc, &selection);
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        query::is_mark_active(&self.doc, &self.selection, mark)
    }

    pub fn is_block_active(&self, kind: &ElementKind) -> bool {
        query::is_block_active(&self.doc, &self.selection, kind)
    }

    pub fn active_marks(&self) -> Marks {
        query::active_marks(&self.doc, &self.selection)
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> Result<(), EditError> {
        let edit = self
            .transforms
            .toggle_mark(&self.doc, &self.selection, mark)?;
        self.commit(edit);
        Ok(())
    }

    pub fn toggle_block(&mut self, kind: &ElementKind) -> Result<(), EditError> {
        let edit = self
            .transforms
            .toggle_block(&self.doc, &self.selection, kind)?;
        self.commit(edit);
        Ok(())
    }

    pub fn insert_void_element(&mut self, element: ElementNode) -> Result<(), EditError> {
        let edit = self
            .transforms
            .insert_void_element(&self.doc, &self.selection, element)?;
        self.commit(edit);
        Ok(())
    }

    pub fn insert_image(
        &mut self,
        url: impl Into<String>,
        alt: Option<String>,
    ) -> Result<(), EditError> {
        self.insert_void_element(ElementNode::image(url, alt))
    }

    /// Apply a raw transaction and return the ops that revert it.
    pub fn apply(&mut self, tx: &Transaction) -> Result<Vec<Op>, EditError> {
        let mut edit = self
            .transforms
            .apply_transaction(&self.doc, &self.selection, tx)?;
        let inverse = std::mem::take(&mut edit.inverse);
        self.commit(edit);
        Ok(inverse)
    }

    pub fn run(&mut self, command: Command) -> Result<(), EditError> {
        match command {
            Command::ToggleMark { mark } => self.toggle_mark(mark),
            Command::ToggleBlock { block } => self.toggle_block(&block),
            Command::InsertImage { url, alt } => self.insert_image(url, alt),
        }
    }

    fn commit(&mut self, edit: Edit) {
        self.doc = edit.document;
        self.selection = edit.selection;
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::empty()
    }
}
