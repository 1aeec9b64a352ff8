//! Read-only lookups scoped to a selection.
//!
//! Nothing here fails: a selection that no longer resolves, an empty tree,
//! or a range that touches no text all answer `false` (or the empty value).

use std::ops::Range;

use crate::apply::clamp_to_char_boundary;
use crate::node::{Document, ElementKind, ElementNode, Mark, Marks, Node, TextNode};
use crate::ops::Path;
use crate::selection::{Point, Selection};

/// True iff every text leaf the selection touches has `mark` set.
pub fn is_mark_active(doc: &Document, selection: &Selection, mark: Mark) -> bool {
    let touched = touched_text_nodes(doc, selection);
    !touched.is_empty() && touched.iter().all(|t| t.marks.get(mark))
}

/// True iff the anchor or one of its ancestors is an element of `kind`.
pub fn is_block_active(doc: &Document, selection: &Selection, kind: &ElementKind) -> bool {
    let path = &selection.anchor.path;
    if doc.node(path).is_none() {
        return false;
    }
    (1..=path.len()).any(|len| matches!(doc.element(&path[..len]), Some(el) if el.kind == *kind))
}

/// Marks of the leaf holding the focus, or none.
pub fn active_marks(doc: &Document, selection: &Selection) -> Marks {
    doc.text(&selection.focus.path)
        .map(|t| t.marks)
        .unwrap_or_default()
}

/// Kind of the nearest list container around the anchor.
pub fn active_list_kind(doc: &Document, selection: &Selection) -> Option<ElementKind> {
    let path = &selection.anchor.path;
    doc.node(path)?;
    nearest_list_ancestor(doc, path).and_then(|p| doc.element(&p).map(|el| el.kind.clone()))
}

/// Text leaves the selection touches. A collapsed selection touches the leaf
/// it sits in; an expanded one touches every leaf sharing at least one byte
/// with the range.
pub fn touched_text_nodes<'a>(doc: &'a Document, selection: &Selection) -> Vec<&'a TextNode> {
    let Some(blocks) = selected_blocks(doc, selection) else {
        return Vec::new();
    };

    if selection.is_collapsed() {
        return doc.text(&selection.focus.path).into_iter().collect();
    }

    let mut out = Vec::new();
    for selected in &blocks {
        let range = &selected.range;
        if range.start >= range.end {
            continue;
        }
        let mut cursor = 0usize;
        for node in &selected.block.el.children {
            let Node::Text(t) = node else {
                continue;
            };
            let (node_start, node_end) = (cursor, cursor + t.text.len());
            cursor = node_end;
            if range.end <= node_start || range.start >= node_end {
                continue;
            }
            out.push(t);
        }
    }
    out
}

pub(crate) struct TextBlock<'a> {
    pub path: Path,
    pub el: &'a ElementNode,
}

/// A text block intersecting a selection, with the selected span expressed
/// as byte offsets into the block's concatenated text.
pub(crate) struct SelectedBlock<'a> {
    pub block: TextBlock<'a>,
    pub range: Range<usize>,
}

pub(crate) fn text_blocks_in_order(doc: &Document) -> Vec<TextBlock<'_>> {
    fn walk<'a>(nodes: &'a [Node], path: &mut Path, out: &mut Vec<TextBlock<'a>>) {
        for (ix, node) in nodes.iter().enumerate() {
            let Node::Element(el) = node else {
                continue;
            };
            if el.is_void() {
                continue;
            }

            path.push(ix);
            if el.is_text_block() {
                out.push(TextBlock {
                    path: path.clone(),
                    el,
                });
            } else {
                walk(&el.children, path, out);
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut out);
    out
}

/// Text blocks from the selection's start to its end, or `None` when either
/// edge does not sit in a text leaf of a text block.
pub(crate) fn selected_blocks<'a>(
    doc: &'a Document,
    selection: &Selection,
) -> Option<Vec<SelectedBlock<'a>>> {
    let (start, end) = selection.edges();
    let blocks = text_blocks_in_order(doc);
    let start_index = block_index_of(doc, &blocks, &start)?;
    let end_index = block_index_of(doc, &blocks, &end)?;

    let last = end_index;
    Some(
        blocks
            .into_iter()
            .enumerate()
            .take(end_index + 1)
            .skip(start_index)
            .map(|(ix, block)| {
                let children = block.el.children.as_slice();
                let range_start = if ix == start_index {
                    point_global_offset(children, &start)
                } else {
                    0
                };
                let range_end = if ix == last {
                    point_global_offset(children, &end)
                } else {
                    total_text_len(children)
                };
                SelectedBlock {
                    block,
                    range: range_start..range_end,
                }
            })
            .collect(),
    )
}

fn block_index_of(doc: &Document, blocks: &[TextBlock<'_>], point: &Point) -> Option<usize> {
    doc.text(&point.path)?;
    let (_, block_path) = point.path.split_last()?;
    blocks.iter().position(|b| b.path == block_path)
}

pub(crate) fn nearest_list_ancestor(doc: &Document, path: &[usize]) -> Option<Path> {
    (1..path.len())
        .rev()
        .map(|len| &path[..len])
        .find(|p| matches!(doc.element(p), Some(el) if el.kind.is_list()))
        .map(|p| p.to_vec())
}

pub(crate) fn outermost_list_ancestor(doc: &Document, path: &[usize]) -> Option<Path> {
    (1..path.len())
        .map(|len| &path[..len])
        .find(|p| matches!(doc.element(p), Some(el) if el.kind.is_list()))
        .map(|p| p.to_vec())
}

pub(crate) fn total_text_len(children: &[Node]) -> usize {
    children
        .iter()
        .filter_map(Node::as_text)
        .map(|t| t.text.len())
        .sum()
}

/// Byte offset of `point` within its block's concatenated text.
pub(crate) fn point_global_offset(children: &[Node], point: &Point) -> usize {
    let child_ix = point.path.last().copied().unwrap_or(0);
    let mut global = 0usize;
    for (ix, node) in children.iter().enumerate() {
        let Node::Text(t) = node else {
            continue;
        };
        if ix < child_ix {
            global += t.text.len();
            continue;
        }
        if ix == child_ix {
            global += clamp_to_char_boundary(&t.text, point.offset);
        }
        break;
    }
    global
}

/// Inverse of [`point_global_offset`] against a block's new children.
/// A boundary between two leaves resolves to the start of the right one.
pub(crate) fn point_for_global_offset(
    block_path: &[usize],
    children: &[Node],
    global_offset: usize,
) -> Point {
    let mut remaining = global_offset;
    for (child_ix, node) in children.iter().enumerate() {
        let Node::Text(t) = node else {
            continue;
        };
        if remaining < t.text.len() {
            let mut path = block_path.to_vec();
            path.push(child_ix);
            return Point::new(path, clamp_to_char_boundary(&t.text, remaining));
        }
        if remaining == t.text.len() {
            let mut path = block_path.to_vec();
            if matches!(children.get(child_ix + 1), Some(Node::Text(_))) {
                path.push(child_ix + 1);
                return Point::new(path, 0);
            }
            path.push(child_ix);
            return Point::new(path, t.text.len());
        }
        remaining -= t.text.len();
    }

    for (child_ix, node) in children.iter().enumerate().rev() {
        if let Node::Text(t) = node {
            let mut path = block_path.to_vec();
            path.push(child_ix);
            return Point::new(path, t.text.len());
        }
    }

    let mut path = block_path.to_vec();
    path.push(0);
    Point::new(path, 0)
}
