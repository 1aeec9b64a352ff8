use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::node::{Document, Node};
use crate::ops::Path;

/// A position inside a text leaf: its path plus a byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Document order: paths compare lexicographically, then offsets.
    pub fn compare(&self, other: &Point) -> Ordering {
        self.path
            .cmp(&other.path)
            .then(self.offset.cmp(&other.offset))
    }
}

/// The context every query and mutation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Collapsed caret at `offset` in the text leaf at `path`.
    pub fn caret(path: Path, offset: usize) -> Self {
        Self::collapsed(Point::new(path, offset))
    }

    /// Covers the whole content of the top-level block at `index`.
    pub fn block(doc: &Document, index: usize) -> Option<Self> {
        let node = doc.children.get(index)?;
        let mut path = vec![index];
        let start = first_text_point_in(node, &mut path)?;
        let mut path = vec![index];
        let end = last_text_point_in(node, &mut path)?;
        Some(Self::new(start, end))
    }

    /// Covers every text leaf of the document.
    pub fn all(doc: &Document) -> Option<Self> {
        let start = first_text_point(doc)?;
        let end = last_text_point(doc)?;
        Some(Self::new(start, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order.
    pub fn edges(&self) -> (Point, Point) {
        if self.focus.compare(&self.anchor) == Ordering::Less {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    fn points_mut(&mut self) -> [&mut Point; 2] {
        [&mut self.anchor, &mut self.focus]
    }
}

/// A point exactly at `offset` stays in front of the inserted text, so
/// appending a merged neighbour never drags a boundary caret along.
pub(crate) fn transform_insert_text(
    selection: &mut Selection,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    for point in selection.points_mut() {
        if point.path == path && point.offset > offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

pub(crate) fn transform_remove_text(selection: &mut Selection, path: &[usize], range: Range<usize>) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in selection.points_mut() {
        if point.path != path || point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

pub(crate) fn transform_insert_node(selection: &mut Selection, path: &[usize]) {
    for point in selection.points_mut() {
        shift_for_insert(&mut point.path, path);
    }
}

/// `doc_after_remove` is consulted to keep a point that sat in a text leaf
/// which was just merged into its left sibling.
pub(crate) fn transform_remove_node(
    selection: &mut Selection,
    path: &[usize],
    removed: &Node,
    doc_after_remove: &Document,
) {
    let Some((&index, parent_path)) = path.split_last() else {
        return;
    };

    let merge_prefix_len = match (removed, index.checked_sub(1)) {
        (Node::Text(removed_text), Some(left_index)) => {
            let mut left_path = parent_path.to_vec();
            left_path.push(left_index);
            match doc_after_remove.node(&left_path) {
                Some(Node::Text(left_text))
                    if left_text.marks == removed_text.marks
                        && left_text.text.ends_with(&removed_text.text) =>
                {
                    Some(left_text.text.len().saturating_sub(removed_text.text.len()))
                }
                _ => None,
            }
        }
        _ => None,
    };

    for point in selection.points_mut() {
        if point.path.len() <= parent_path.len() || !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        let ix = point.path[depth];
        if ix > index {
            point.path[depth] = ix - 1;
            continue;
        }
        if ix < index {
            continue;
        }

        // The point was inside the removed subtree; park it nearby.
        match (merge_prefix_len, removed, index.checked_sub(1)) {
            (Some(prefix), Node::Text(removed_text), Some(left_index)) => {
                point.path.truncate(depth + 1);
                point.path[depth] = left_index;
                point.offset = (prefix + point.offset).min(prefix + removed_text.text.len());
            }
            _ => {
                point.path.truncate(depth + 1);
                point.path[depth] = index.saturating_sub(1);
                point.offset = 0;
            }
        }
    }
}

pub(crate) fn transform_move_node(selection: &mut Selection, from: &[usize], to: &[usize]) {
    for point in selection.points_mut() {
        if point.path.starts_with(from) {
            let mut moved = to.to_vec();
            moved.extend_from_slice(&point.path[from.len()..]);
            point.path = moved;
            continue;
        }
        shift_for_remove(&mut point.path, from);
        shift_for_insert(&mut point.path, to);
    }
}

fn shift_for_insert(path: &mut Path, inserted: &[usize]) {
    let Some((&index, parent)) = inserted.split_last() else {
        return;
    };
    let depth = parent.len();
    if path.len() > depth && path.starts_with(parent) && path[depth] >= index {
        path[depth] += 1;
    }
}

/// Only valid for paths outside the removed subtree.
fn shift_for_remove(path: &mut Path, removed: &[usize]) {
    let Some((&index, parent)) = removed.split_last() else {
        return;
    };
    let depth = parent.len();
    if path.len() > depth && path.starts_with(parent) && path[depth] > index {
        path[depth] -= 1;
    }
}

/// Clamp both points of `selection` onto text leaves that exist in `doc`.
pub fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = first_text_point(doc).unwrap_or(Point {
        path: vec![0],
        offset: 0,
    });

    let anchor = normalize_point(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus = normalize_point(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

pub(crate) fn first_text_point(doc: &Document) -> Option<Point> {
    doc.children.iter().enumerate().find_map(|(ix, node)| {
        let mut path = vec![ix];
        first_text_point_in(node, &mut path)
    })
}

pub(crate) fn last_text_point(doc: &Document) -> Option<Point> {
    doc.children.iter().enumerate().rev().find_map(|(ix, node)| {
        let mut path = vec![ix];
        last_text_point_in(node, &mut path)
    })
}

fn first_text_point_in(node: &Node, path: &mut Path) -> Option<Point> {
    match node {
        Node::Text(_) => Some(Point::new(path.clone(), 0)),
        Node::Element(el) if el.is_void() => None,
        Node::Element(el) => {
            for (ix, child) in el.children.iter().enumerate() {
                path.push(ix);
                let found = first_text_point_in(child, path);
                path.pop();
                if found.is_some() {
                    return found;
                }
            }
            None
        }
    }
}

fn last_text_point_in(node: &Node, path: &mut Path) -> Option<Point> {
    match node {
        Node::Text(t) => Some(Point::new(path.clone(), t.text.len())),
        Node::Element(el) if el.is_void() => None,
        Node::Element(el) => {
            for (ix, child) in el.children.iter().enumerate().rev() {
                path.push(ix);
                let found = last_text_point_in(child, path);
                path.pop();
                if found.is_some() {
                    return found;
                }
            }
            None
        }
    }
}

fn normalize_point(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved: Path = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved,
                    offset: point.offset.min(t.text.len()),
                });
            }
            Node::Element(el) if el.is_void() => break,
            Node::Element(el) => children = &el.children,
        }
    }

    let node = doc.node(&resolved)?;
    match node {
        Node::Text(t) => Some(Point {
            path: resolved,
            offset: point.offset.min(t.text.len()),
        }),
        Node::Element(el) if el.is_void() => {
            // Step to the nearest editable text after the void, else before.
            let (&ix, parent) = resolved.split_last()?;
            let siblings = doc.children_at(parent)?;
            siblings
                .iter()
                .enumerate()
                .skip(ix + 1)
                .find_map(|(i, n)| {
                    let mut path = parent.to_vec();
                    path.push(i);
                    first_text_point_in(n, &mut path)
                })
                .or_else(|| {
                    siblings.iter().enumerate().take(ix).rev().find_map(|(i, n)| {
                        let mut path = parent.to_vec();
                        path.push(i);
                        last_text_point_in(n, &mut path)
                    })
                })
        }
        Node::Element(_) => first_text_point_in(node, &mut resolved),
    }
}
