use crate::error::ApplyError;
use crate::node::{Document, Node, TextNode};
use crate::ops::Op;
use crate::selection::{
    Selection, transform_insert_node, transform_insert_text, transform_move_node,
    transform_remove_node, transform_remove_text,
};

/// Apply one op in place, carrying `selection` along, and return the op
/// that undoes it.
pub(crate) fn apply_op_to(
    doc: &mut Document,
    selection: &mut Selection,
    op: Op,
) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = node_text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            transform_insert_text(selection, &path, offset, text.len());
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = node_text_mut(doc, &path)?;
            let start = clamp_to_char_boundary(&text_node.text, range.start);
            let end = clamp_to_char_boundary(&text_node.text, range.end);
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            transform_remove_text(selection, &path, start..end);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_insert_node(selection, &path);
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_remove_node(selection, &path, &removed, doc);
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::MoveNode { from, to } => {
            let node = remove_node(doc, &from)?;
            if let Err(err) = insert_node(doc, &to, node.clone()) {
                // Put it back so a failed move leaves the tree as it was.
                insert_node(doc, &from, node)?;
                return Err(err);
            }
            transform_move_node(selection, &from, &to);
            Ok(Op::MoveNode { from: to, to: from })
        }
        Op::SetKind { path, kind } => match node_mut(doc, &path)? {
            Node::Element(el) => {
                let old = std::mem::replace(&mut el.kind, kind);
                Ok(Op::SetKind { path, kind: old })
            }
            Node::Text(_) => Err(ApplyError::NotAnElement { path }),
        },
        Op::SetTextMarks { path, marks } => {
            let text_node = node_text_mut(doc, &path)?;
            let old = std::mem::replace(&mut text_node.marks, marks);
            Ok(Op::SetTextMarks { path, marks: old })
        }
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, ApplyError> {
    let Some((&first, rest)) = path.split_first() else {
        return Err(ApplyError::invalid_path(path, "empty path"));
    };

    let len = doc.children.len();
    let mut node = doc.children.get_mut(first).ok_or_else(|| {
        ApplyError::invalid_path(path, format!("out of bounds at depth 0: {first} >= {len}"))
    })?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or_else(|| {
                    ApplyError::invalid_path(
                        path,
                        format!("out of bounds at depth {}: {ix} >= {len}", depth + 1),
                    )
                })?
            }
            Node::Text(_) => {
                return Err(ApplyError::invalid_path(
                    path,
                    format!("text leaf at depth {depth} has no children"),
                ));
            }
        };
    }

    Ok(node)
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, ApplyError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(ApplyError::NotAText {
            path: path.to_vec(),
        }),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, ApplyError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Text(_) => Err(ApplyError::NotAnElement {
            path: parent_path.to_vec(),
        }),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), ApplyError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(ApplyError::invalid_path(path, "empty insert path"));
    };

    let children = children_mut(doc, parent_path)?;
    if index > children.len() {
        return Err(ApplyError::invalid_path(
            path,
            format!("insert index out of bounds: {index} > {}", children.len()),
        ));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, ApplyError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(ApplyError::invalid_path(path, "empty remove path"));
    };

    let children = children_mut(doc, parent_path)?;
    if index >= children.len() {
        return Err(ApplyError::invalid_path(
            path,
            format!("remove index out of bounds: {index} >= {}", children.len()),
        ));
    }
    Ok(children.remove(index))
}
