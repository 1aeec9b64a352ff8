use crate::node::{Document, Node};
use crate::ops::{Op, Path, child_path};

/// One structural repair. A pass inspects the tree and returns the ops that
/// fix what it found; the ops must be valid when applied in order.
pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document) -> Vec<Op>;
}

/// Ordered set of passes run after every transaction until none of them
/// reports work.
pub struct Normalizer {
    passes: Vec<Box<dyn NormalizePass>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::core()
    }
}

impl Normalizer {
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn core() -> Self {
        Self {
            passes: vec![
                Box::new(EnsureNonEmptyDocument),
                Box::new(EnsureElementsHaveChildren),
                Box::new(MergeAdjacentTextLeaves),
            ],
        }
    }

    pub fn with_pass(mut self, pass: Box<dyn NormalizePass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn pass_ids(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.id()).collect()
    }

    /// Ops of the first pass that has work, or nothing when the tree is
    /// already normal.
    pub fn run(&self, doc: &Document) -> Vec<Op> {
        for pass in &self.passes {
            let ops = pass.run(doc);
            if !ops.is_empty() {
                tracing::trace!(pass = pass.id(), ops = ops.len(), "normalize");
                return ops;
            }
        }
        Vec::new()
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

/// Every element keeps at least one child: a childless list container is
/// dropped, anything else (void elements included) gets an empty text leaf.
struct EnsureElementsHaveChildren;

impl NormalizePass for EnsureElementsHaveChildren {
    fn id(&self) -> &'static str {
        "core.ensure_elements_have_children"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        // Walk back to front so removals never shift a path still to be
        // reported.
        fn walk(children: &[Node], path: &mut Path, ops: &mut Vec<Op>) {
            for (ix, node) in children.iter().enumerate().rev() {
                let Node::Element(el) = node else {
                    continue;
                };
                path.push(ix);
                if el.children.is_empty() {
                    if el.kind.is_list() {
                        ops.push(Op::RemoveNode { path: path.clone() });
                    } else {
                        ops.push(Op::InsertNode {
                            path: child_path(path, 0),
                            node: Node::text(""),
                        });
                    }
                } else if !el.is_void() {
                    walk(&el.children, path, ops);
                }
                path.pop();
            }
        }

        let mut ops = Vec::new();
        walk(&doc.children, &mut Vec::new(), &mut ops);
        ops
    }
}

struct MergeAdjacentTextLeaves;

impl NormalizePass for MergeAdjacentTextLeaves {
    fn id(&self) -> &'static str {
        "core.merge_adjacent_text_leaves"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        fn walk(children: &[Node], path: &mut Path, ops: &mut Vec<Op>) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };
                if el.is_void() {
                    continue;
                }

                path.push(ix);

                if el.is_text_block() {
                    merge_runs(&el.children, path, ops);
                } else {
                    walk(&el.children, path, ops);
                }

                path.pop();
            }
        }

        let mut ops = Vec::new();
        walk(&doc.children, &mut Vec::new(), &mut ops);
        ops
    }
}

/// Fold each run of equally marked leaves into the run's first leaf. Leaves
/// are merged pairwise from the right so a point in any of them can follow
/// its text into the left neighbour.
fn merge_runs(children: &[Node], block_path: &[usize], ops: &mut Vec<Op>) {
    if children.len() < 2 {
        return;
    }

    let mut ix = children.len();
    while ix > 0 {
        ix -= 1;
        let Node::Text(right) = &children[ix] else {
            continue;
        };

        let mut start = ix;
        while start > 0 {
            let Some(Node::Text(left)) = children.get(start - 1) else {
                break;
            };
            if left.marks != right.marks || left.attrs != right.attrs {
                break;
            }
            start -= 1;
        }

        let mut tail = String::new();
        for merge_ix in (start + 1..=ix).rev() {
            let (Some(Node::Text(left)), Some(Node::Text(current))) =
                (children.get(merge_ix - 1), children.get(merge_ix))
            else {
                break;
            };
            tail.insert_str(0, &current.text);
            if !tail.is_empty() {
                ops.push(Op::InsertText {
                    path: child_path(block_path, merge_ix - 1),
                    offset: left.text.len(),
                    text: tail.clone(),
                });
            }
            ops.push(Op::RemoveNode {
                path: child_path(block_path, merge_ix),
            });
        }

        ix = start;
    }
}
