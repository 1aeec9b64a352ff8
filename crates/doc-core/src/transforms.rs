//! Mutation API.
//!
//! Every mutation is compiled into primitive [`Op`]s and applied to a clone
//! of the caller's tree, followed by normalization. The result is either a
//! complete [`Edit`] or an error with the input left untouched.

use std::collections::BTreeMap;

use crate::apply::{apply_op_to, clamp_to_char_boundary};
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::node::{Document, ElementKind, ElementNode, Mark, Marks, Node};
use crate::normalize::Normalizer;
use crate::ops::{Op, Path, Transaction, child_path};
use crate::query::{
    SelectedBlock, is_block_active, is_mark_active, nearest_list_ancestor,
    outermost_list_ancestor, point_for_global_offset, point_global_offset, selected_blocks,
    total_text_len, touched_text_nodes,
};
use crate::selection::{Point, Selection, normalize_selection};

/// Outcome of a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub document: Document,
    pub selection: Selection,
    /// Ops that take `document` back to the input tree, in application order.
    pub inverse: Vec<Op>,
}

pub fn toggle_mark(doc: &Document, selection: &Selection, mark: Mark) -> Result<Edit, EditError> {
    Transforms::default().toggle_mark(doc, selection, mark)
}

pub fn toggle_block(
    doc: &Document,
    selection: &Selection,
    kind: &ElementKind,
) -> Result<Edit, EditError> {
    Transforms::default().toggle_block(doc, selection, kind)
}

pub fn insert_void_element(
    doc: &Document,
    selection: &Selection,
    element: ElementNode,
) -> Result<Edit, EditError> {
    Transforms::default().insert_void_element(doc, selection, element)
}

pub fn apply_transaction(
    doc: &Document,
    selection: &Selection,
    tx: &Transaction,
) -> Result<Edit, EditError> {
    Transforms::default().apply_transaction(doc, selection, tx)
}

/// Mutation entry points bound to one config and normalizer.
pub struct Transforms {
    config: EditorConfig,
    normalizer: Normalizer,
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Normalizer::core())
    }
}

impl Transforms {
    pub fn new(config: EditorConfig, normalizer: Normalizer) -> Self {
        Self {
            config: config.with_defaults(),
            normalizer,
        }
    }

    pub fn apply_transaction(
        &self,
        doc: &Document,
        selection: &Selection,
        tx: &Transaction,
    ) -> Result<Edit, EditError> {
        let mut draft = self.draft(doc, selection);
        draft.apply(tx.ops.iter().cloned())?;
        if let Some(sel) = &tx.selection_after {
            draft.selection = sel.clone();
        }
        let edit = draft.finish()?;
        tracing::debug!(
            source = tx.meta.source.as_deref().unwrap_or("transaction"),
            ops = tx.ops.len(),
            "commit"
        );
        Ok(edit)
    }

    /// Clear `mark` on every touched leaf if all of them carry it, set it
    /// everywhere otherwise. At a collapsed caret the caret's leaf is split
    /// and an empty leaf with the flipped marks receives the caret. An
    /// expanded selection that covers no text is rejected.
    pub fn toggle_mark(
        &self,
        doc: &Document,
        selection: &Selection,
        mark: Mark,
    ) -> Result<Edit, EditError> {
        let Some(blocks) = selected_blocks(doc, selection) else {
            tracing::warn!(?selection, %mark, "toggle_mark: selection does not resolve");
            return Err(EditError::MalformedSelection);
        };

        let (ops, selection_after) = if selection.is_collapsed() {
            mark_at_caret(doc, &selection.focus, |mut marks| {
                marks.set(mark, !marks.get(mark));
                marks
            })?
        } else {
            if touched_text_nodes(doc, selection).is_empty() {
                tracing::warn!(?selection, %mark, "toggle_mark: range covers no text");
                return Err(EditError::NoTextInRange);
            }
            let target = !is_mark_active(doc, selection, mark);
            mark_range(selection, &blocks, &|mut marks: Marks| {
                marks.set(mark, target);
                marks
            })
        };

        let tx = Transaction::new(ops)
            .selection_after(selection_after)
            .source(format!("toggle_mark:{mark}"));
        self.apply_transaction(doc, selection, &tx)
    }

    /// Unwrap from list containers, retype, then wrap in a new list when a
    /// list type is being turned on. The order matters: retyping before the
    /// unwrap would strand list items inside the old container.
    pub fn toggle_block(
        &self,
        doc: &Document,
        selection: &Selection,
        kind: &ElementKind,
    ) -> Result<Edit, EditError> {
        if kind.is_void() {
            tracing::warn!(%kind, "toggle_block: void kinds are inserted, not toggled");
            return Err(EditError::VoidBlockType(kind.clone()));
        }
        if *kind == ElementKind::ListItem {
            tracing::warn!(%kind, "toggle_block: list items come from toggling a list type");
            return Err(EditError::ListItemBlockType(kind.clone()));
        }
        if selected_blocks(doc, selection).is_none() {
            tracing::warn!(?selection, %kind, "toggle_block: selection does not resolve");
            return Err(EditError::MalformedSelection);
        }

        let was_active = is_block_active(doc, selection, kind);
        let mut draft = self.draft(doc, selection);

        let ops = unwrap_list_ops(&draft.doc, &draft.selection);
        draft.apply(ops)?;

        let next_kind = if was_active {
            ElementKind::Paragraph
        } else if kind.is_list() {
            ElementKind::ListItem
        } else {
            kind.clone()
        };
        let ops = retype_ops(&draft.doc, &draft.selection, &next_kind);
        draft.apply(ops)?;

        if !was_active && kind.is_list() {
            let ops = wrap_ops(&draft.doc, &draft.selection, kind);
            draft.apply(ops)?;
        }

        let applied = draft.inverse.len();
        let edit = draft.finish()?;
        let source = format!("toggle_block:{kind}");
        tracing::debug!(%source, ops = applied, "commit");
        Ok(edit)
    }

    /// Insert a void element at the focus, followed by an empty paragraph
    /// that receives the caret. A caret at the start of a text block puts
    /// the element before it, one at the end puts it after, and one inside
    /// splits the block around the element. Lists hold list items only, so
    /// a caret inside a list lands the element after the outermost list.
    pub fn insert_void_element(
        &self,
        doc: &Document,
        selection: &Selection,
        element: ElementNode,
    ) -> Result<Edit, EditError> {
        if !element.is_void() {
            tracing::warn!(kind = %element.kind, "insert_void_element: not a void element");
            return Err(EditError::NotVoid(element.kind));
        }

        let mut ops = Vec::new();
        let (parent, at) = if doc.children.is_empty() {
            (Vec::new(), 0)
        } else {
            let focus = &selection.focus;
            if doc.text(&focus.path).is_none() {
                tracing::warn!(?selection, "insert_void_element: selection does not resolve");
                return Err(EditError::MalformedSelection);
            }
            let block_path = &focus.path[..focus.path.len() - 1];
            match (outermost_list_ancestor(doc, &focus.path), doc.element(block_path)) {
                (Some(list_path), _) => slot_after(doc, &list_path),
                (None, Some(block)) if block.is_text_block() => {
                    let offset = point_global_offset(&block.children, focus);
                    let len = total_text_len(&block.children);
                    if offset == 0 && len > 0 {
                        slot_before(block_path)
                    } else if offset < len {
                        ops.extend(split_block_ops(block_path, block, offset));
                        slot_after(doc, block_path)
                    } else {
                        slot_after(doc, block_path)
                    }
                }
                _ => slot_after(doc, block_path),
            }
        };

        let kind = element.kind.clone();
        let paragraph_path = child_path(&parent, at + 1);
        ops.push(Op::InsertNode {
            path: child_path(&parent, at),
            node: Node::Element(element),
        });
        ops.push(Op::InsertNode {
            path: paragraph_path.clone(),
            node: Node::paragraph(""),
        });
        let tx = Transaction::new(ops)
            .selection_after(Selection::caret(child_path(&paragraph_path, 0), 0))
            .source(format!("insert_void_element:{kind}"));

        self.apply_transaction(doc, selection, &tx)
    }

    fn draft(&self, doc: &Document, selection: &Selection) -> Draft<'_> {
        Draft {
            doc: doc.clone(),
            selection: selection.clone(),
            inverse: Vec::new(),
            transforms: self,
        }
    }
}

/// A working copy. Nothing reaches the caller unless `finish` succeeds.
struct Draft<'a> {
    doc: Document,
    selection: Selection,
    inverse: Vec<Op>,
    transforms: &'a Transforms,
}

impl Draft<'_> {
    fn apply(&mut self, ops: impl IntoIterator<Item = Op>) -> Result<(), EditError> {
        for op in ops {
            let inverse = apply_op_to(&mut self.doc, &mut self.selection, op)?;
            self.inverse.push(inverse);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Edit, EditError> {
        let max = self.transforms.config.max_normalize_iterations;
        let mut converged = false;
        for _ in 0..max {
            let ops = self.transforms.normalizer.run(&self.doc);
            if ops.is_empty() {
                converged = true;
                break;
            }
            self.apply(ops)?;
        }
        if !converged {
            tracing::warn!(max, "normalization did not converge");
            return Err(EditError::NormalizeDidNotConverge(max));
        }

        let selection = normalize_selection(&self.doc, &self.selection);
        self.inverse.reverse();
        Ok(Edit {
            document: self.doc,
            selection,
            inverse: self.inverse,
        })
    }
}

fn mark_at_caret(
    doc: &Document,
    caret: &Point,
    apply: impl Fn(Marks) -> Marks,
) -> Result<(Vec<Op>, Selection), EditError> {
    let Some((&child_ix, block_path)) = caret.path.split_last() else {
        return Err(EditError::MalformedSelection);
    };
    let Some(text) = doc.text(&caret.path) else {
        return Err(EditError::MalformedSelection);
    };

    let marks_before = text.marks;
    let marks_after = apply(marks_before);

    if text.text.is_empty() {
        return Ok((
            vec![Op::SetTextMarks {
                path: caret.path.clone(),
                marks: marks_after,
            }],
            Selection::caret(caret.path.clone(), 0),
        ));
    }

    let cursor = clamp_to_char_boundary(&text.text, caret.offset);
    let (left, right) = text.text.split_at(cursor);

    let mut replacement: Vec<Node> = Vec::new();
    let mut caret_ix = child_ix;
    if !left.is_empty() {
        replacement.push(Node::Text(text.with_text(left)));
        caret_ix += 1;
    }
    replacement.push(Node::Text(text.with_text("").with_marks(marks_after)));
    if !right.is_empty() {
        replacement.push(Node::Text(text.with_text(right)));
    }

    let mut ops = vec![Op::RemoveNode {
        path: caret.path.clone(),
    }];
    ops.extend(
        replacement
            .into_iter()
            .enumerate()
            .map(|(i, node)| Op::InsertNode {
                path: child_path(block_path, child_ix + i),
                node,
            }),
    );

    Ok((
        ops,
        Selection::caret(child_path(block_path, caret_ix), 0),
    ))
}

/// Rewrite the leaves of every selected block so the selected span carries
/// `apply`'d marks, splitting leaves at the range edges.
fn mark_range(
    selection: &Selection,
    blocks: &[SelectedBlock<'_>],
    apply: &dyn Fn(Marks) -> Marks,
) -> (Vec<Op>, Selection) {
    let mut ops: Vec<Op> = Vec::new();
    let mut anchor = selection.anchor.clone();
    let mut focus = selection.focus.clone();

    for selected in blocks {
        let range = &selected.range;
        if range.start >= range.end {
            continue;
        }
        let block_path = &selected.block.path;
        let children = selected.block.el.children.as_slice();
        let new_children = apply_marks_in_block(children, range.start, range.end, apply);

        for child_ix in (0..children.len()).rev() {
            ops.push(Op::RemoveNode {
                path: child_path(block_path, child_ix),
            });
        }
        for (child_ix, node) in new_children.iter().cloned().enumerate() {
            ops.push(Op::InsertNode {
                path: child_path(block_path, child_ix),
                node,
            });
        }

        for point in [&mut anchor, &mut focus] {
            if point.path.len() == block_path.len() + 1 && point.path.starts_with(block_path) {
                let global = point_global_offset(children, point);
                *point = point_for_global_offset(block_path, &new_children, global);
            }
        }
    }

    (ops, Selection { anchor, focus })
}

fn apply_marks_in_block(
    children: &[Node],
    start: usize,
    end: usize,
    apply: &dyn Fn(Marks) -> Marks,
) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let Node::Text(t) = node else {
            out.push(node.clone());
            continue;
        };
        let (node_start, node_end) = (cursor, cursor + t.text.len());
        cursor = node_end;

        if end <= node_start || start >= node_end {
            out.push(node.clone());
            continue;
        }

        let sel_start = clamp_to_char_boundary(&t.text, start.saturating_sub(node_start));
        let sel_end = clamp_to_char_boundary(&t.text, end.saturating_sub(node_start));

        if sel_start == 0 && sel_end == t.text.len() {
            out.push(Node::Text(t.with_marks(apply(t.marks))));
            continue;
        }

        let prefix = &t.text[..sel_start];
        let middle = &t.text[sel_start..sel_end];
        let suffix = &t.text[sel_end..];
        if !prefix.is_empty() {
            out.push(Node::Text(t.with_text(prefix)));
        }
        if !middle.is_empty() {
            out.push(Node::Text(t.with_text(middle).with_marks(apply(t.marks))));
        }
        if !suffix.is_empty() {
            out.push(Node::Text(t.with_text(suffix)));
        }
    }

    if out.is_empty() {
        out.push(Node::text(""));
    }
    out
}

/// Lift every selected block out of its nearest list container. Each list
/// is split around the lifted span: items before it stay in the original
/// container, items after it move to a fresh container of the same type.
fn unwrap_list_ops(doc: &Document, selection: &Selection) -> Vec<Op> {
    let Some(blocks) = selected_blocks(doc, selection) else {
        return Vec::new();
    };

    let mut spans: BTreeMap<Path, (usize, usize)> = BTreeMap::new();
    for selected in &blocks {
        let block_path = &selected.block.path;
        let Some(list_path) = nearest_list_ancestor(doc, block_path) else {
            continue;
        };
        let item_ix = block_path[list_path.len()];
        spans
            .entry(list_path)
            .and_modify(|(first, last)| {
                *first = (*first).min(item_ix);
                *last = (*last).max(item_ix);
            })
            .or_insert((item_ix, item_ix));
    }

    // Deepest and latest lists first, so earlier list paths stay valid.
    let mut ops = Vec::new();
    for (list_path, (first, last)) in spans.into_iter().rev() {
        let Some(list) = doc.element(&list_path) else {
            continue;
        };
        let Some((&list_ix, parent)) = list_path.split_last() else {
            continue;
        };
        let len = list.children.len();

        if last + 1 < len {
            ops.push(Op::InsertNode {
                path: child_path(parent, list_ix + 1),
                node: Node::Element(empty_like(list)),
            });
            for k in 0..len - last - 1 {
                ops.push(Op::MoveNode {
                    from: child_path(&list_path, last + 1),
                    to: child_path(&child_path(parent, list_ix + 1), k),
                });
            }
        }

        for t in 0..=last - first {
            ops.push(Op::MoveNode {
                from: child_path(&list_path, first),
                to: child_path(parent, list_ix + 1 + t),
            });
        }

        if first == 0 {
            ops.push(Op::RemoveNode { path: list_path });
        }
    }
    ops
}

fn retype_ops(doc: &Document, selection: &Selection, kind: &ElementKind) -> Vec<Op> {
    let Some(blocks) = selected_blocks(doc, selection) else {
        return Vec::new();
    };
    blocks
        .iter()
        .filter(|selected| selected.block.el.kind != *kind)
        .map(|selected| Op::SetKind {
            path: selected.block.path.clone(),
            kind: kind.clone(),
        })
        .collect()
}

/// Wrap each run of adjacent selected siblings in a new `kind` container.
fn wrap_ops(doc: &Document, selection: &Selection, kind: &ElementKind) -> Vec<Op> {
    let Some(blocks) = selected_blocks(doc, selection) else {
        return Vec::new();
    };

    let mut runs: Vec<(Path, usize, usize)> = Vec::new();
    for selected in &blocks {
        let Some((&ix, parent)) = selected.block.path.split_last() else {
            continue;
        };
        match runs.last_mut() {
            Some((run_parent, first, count)) if run_parent == parent && *first + *count == ix => {
                *count += 1;
            }
            _ => runs.push((parent.to_vec(), ix, 1)),
        }
    }

    let mut ops = Vec::new();
    for (parent, first, count) in runs.into_iter().rev() {
        let container = child_path(&parent, first);
        ops.push(Op::InsertNode {
            path: container.clone(),
            node: Node::element(kind.clone(), Vec::new()),
        });
        for k in 0..count {
            ops.push(Op::MoveNode {
                from: child_path(&parent, first + 1),
                to: child_path(&container, k),
            });
        }
    }
    ops
}

/// Insertion slot right after the node at `path`.
fn slot_after(doc: &Document, path: &[usize]) -> (Path, usize) {
    match path.split_last() {
        Some((&ix, parent)) => (parent.to_vec(), ix + 1),
        None => (Vec::new(), doc.children.len()),
    }
}

/// Insertion slot taking the place of the node at `path`.
fn slot_before(path: &[usize]) -> (Path, usize) {
    match path.split_last() {
        Some((&ix, parent)) => (parent.to_vec(), ix),
        None => (Vec::new(), 0),
    }
}

/// Split the text block at `block_path` at byte `offset`. The head keeps the
/// block's place and the tail becomes a sibling of the same type right after.
fn split_block_ops(block_path: &[usize], block: &ElementNode, offset: usize) -> Vec<Op> {
    let (head, tail) = split_children(&block.children, offset);
    let Some((&ix, parent)) = block_path.split_last() else {
        return Vec::new();
    };

    let mut ops: Vec<Op> = (0..block.children.len())
        .rev()
        .map(|child_ix| Op::RemoveNode {
            path: child_path(block_path, child_ix),
        })
        .collect();
    ops.extend(head.into_iter().enumerate().map(|(child_ix, node)| Op::InsertNode {
        path: child_path(block_path, child_ix),
        node,
    }));
    ops.push(Op::InsertNode {
        path: child_path(parent, ix + 1),
        node: Node::Element(ElementNode {
            children: tail,
            ..empty_like(block)
        }),
    });
    ops
}

fn split_children(children: &[Node], offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let Node::Text(t) = node else {
            if cursor < offset {
                head.push(node.clone());
            } else {
                tail.push(node.clone());
            }
            continue;
        };
        let (node_start, node_end) = (cursor, cursor + t.text.len());
        cursor = node_end;

        if node_end <= offset {
            head.push(node.clone());
        } else if node_start >= offset {
            tail.push(node.clone());
        } else {
            let at = clamp_to_char_boundary(&t.text, offset - node_start);
            let (left, right) = t.text.split_at(at);
            head.push(Node::Text(t.with_text(left)));
            tail.push(Node::Text(t.with_text(right)));
        }
    }

    if head.is_empty() {
        head.push(Node::text(""));
    }
    if tail.is_empty() {
        tail.push(Node::text(""));
    }
    (head, tail)
}

fn empty_like(el: &ElementNode) -> ElementNode {
    ElementNode {
        kind: el.kind.clone(),
        url: None,
        alt: None,
        children: Vec::new(),
        attrs: el.attrs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_splits_list_around_middle_item() {
        let doc = Document::new(vec![Node::bulleted_list(["a", "b", "c"])]);
        let sel = Selection::caret(vec![0, 1, 0], 0);
        let ops = unwrap_list_ops(&doc, &sel);
        assert_eq!(
            ops,
            vec![
                Op::InsertNode {
                    path: vec![1],
                    node: Node::element(ElementKind::BulletedList, Vec::new()),
                },
                Op::MoveNode {
                    from: vec![0, 2],
                    to: vec![1, 0],
                },
                Op::MoveNode {
                    from: vec![0, 1],
                    to: vec![1],
                },
            ]
        );
    }

    #[test]
    fn wrap_groups_adjacent_siblings() {
        let doc = Document::new(vec![
            Node::list_item("a"),
            Node::list_item("b"),
        ]);
        let sel = Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![1, 0], 1));
        let ops = wrap_ops(&doc, &sel, &ElementKind::NumberedList);
        assert_eq!(
            ops,
            vec![
                Op::InsertNode {
                    path: vec![0],
                    node: Node::element(ElementKind::NumberedList, Vec::new()),
                },
                Op::MoveNode {
                    from: vec![1],
                    to: vec![0, 0],
                },
                Op::MoveNode {
                    from: vec![1],
                    to: vec![0, 1],
                },
            ]
        );
    }

    #[test]
    fn marks_split_only_the_selected_span() {
        let children = vec![Node::text("abcde")];
        let out = apply_marks_in_block(&children, 1, 3, &|m: Marks| m.with(Mark::Italic));
        assert_eq!(
            out,
            vec![
                Node::text("a"),
                Node::marked("bc", Marks::default().with(Mark::Italic)),
                Node::text("de"),
            ]
        );
    }

    #[test]
    fn split_keeps_leaf_marks_on_both_sides() {
        let bold = Marks::default().with(Mark::Bold);
        let children = vec![Node::marked("ab", bold), Node::text("cd")];

        let (head, tail) = split_children(&children, 1);
        assert_eq!(head, vec![Node::marked("a", bold)]);
        assert_eq!(tail, vec![Node::marked("b", bold), Node::text("cd")]);

        let (head, tail) = split_children(&children, 2);
        assert_eq!(head, vec![Node::marked("ab", bold)]);
        assert_eq!(tail, vec![Node::text("cd")]);
    }
}
