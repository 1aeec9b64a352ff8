use pretty_assertions::assert_eq;
use rstest::rstest;
use slidedoc_core::{
    Document, EditError, ElementKind, Mark, Marks, Node, Point, Selection, is_mark_active,
    toggle_mark,
};

fn paragraph(children: Vec<Node>) -> Node {
    Node::element(ElementKind::Paragraph, children)
}

#[test]
fn range_toggle_splits_at_the_selection_edges() {
    let doc = Document::new(vec![Node::paragraph("abcde")]);
    let sel = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 3));

    let edit = toggle_mark(&doc, &sel, Mark::Bold).unwrap();

    assert_eq!(
        edit.document,
        Document::new(vec![paragraph(vec![
            Node::text("a"),
            Node::marked("bc", Marks::default().with(Mark::Bold)),
            Node::text("de"),
        ])])
    );
    assert!(is_mark_active(&edit.document, &edit.selection, Mark::Bold));
    assert!(!is_mark_active(&edit.document, &edit.selection, Mark::Italic));
}

#[test]
fn retoggle_needs_the_returned_selection() {
    let doc = Document::new(vec![Node::paragraph("abcde")]);
    let sel = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 3));
    let once = toggle_mark(&doc, &sel, Mark::Bold).unwrap();

    // The input selection now sits inside the one-byte leaf "a" and covers
    // no text, so it is rejected rather than silently ignored.
    assert_eq!(
        toggle_mark(&once.document, &sel, Mark::Bold),
        Err(EditError::NoTextInRange)
    );

    assert_eq!(
        once.selection,
        Selection::new(Point::new(vec![0, 1], 0), Point::new(vec![0, 2], 0))
    );
    let back = toggle_mark(&once.document, &once.selection, Mark::Bold).unwrap();
    assert_eq!(back.document, doc);
}

#[test]
fn split_leaves_keep_unknown_keys() {
    let doc: Document = serde_json::from_value(serde_json::json!([
        { "type": "paragraph", "children": [{ "text": "abc", "code": true }] },
    ]))
    .unwrap();
    let sel = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 2));

    let edit = toggle_mark(&doc, &sel, Mark::Italic).unwrap();
    assert_eq!(
        serde_json::to_value(&edit.document).unwrap(),
        serde_json::json!([
            { "type": "paragraph", "children": [
                { "text": "a", "code": true },
                { "text": "b", "italic": true, "code": true },
                { "text": "c", "code": true },
            ]},
        ])
    );

    let back = toggle_mark(&edit.document, &edit.selection, Mark::Italic).unwrap();
    assert_eq!(back.document, doc);
}

#[rstest]
#[case(Mark::Bold)]
#[case(Mark::Italic)]
#[case(Mark::Underline)]
fn toggling_twice_restores_the_tree(#[case] mark: Mark) {
    let doc = Document::new(vec![paragraph(vec![
        Node::text("hello "),
        Node::marked("world", Marks::default().with(Mark::Underline).with(Mark::Italic)),
    ])]);
    let sel = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 5));

    let once = toggle_mark(&doc, &sel, mark).unwrap();
    assert_ne!(once.document, doc);
    assert!(is_mark_active(&once.document, &once.selection, mark));

    let twice = toggle_mark(&once.document, &once.selection, mark).unwrap();
    assert_eq!(twice.document, doc);
    assert!(!is_mark_active(&twice.document, &twice.selection, mark));
}

#[test]
fn mixed_range_is_set_everywhere_first() {
    let doc = Document::new(vec![paragraph(vec![
        Node::marked("ab", Marks::default().with(Mark::Bold)),
        Node::text("cd"),
    ])]);
    let sel = Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 1], 2));
    assert!(!is_mark_active(&doc, &sel, Mark::Bold));

    let edit = toggle_mark(&doc, &sel, Mark::Bold).unwrap();
    assert_eq!(
        edit.document,
        Document::new(vec![paragraph(vec![Node::marked(
            "abcd",
            Marks::default().with(Mark::Bold)
        )])])
    );
    assert_eq!(edit.selection.anchor, Point::new(vec![0, 0], 0));
    assert_eq!(edit.selection.focus, Point::new(vec![0, 0], 4));
}

#[test]
fn range_across_blocks_touches_each_block() {
    let doc = Document::new(vec![Node::paragraph("one"), Node::heading_one("two")]);
    let sel = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![1, 0], 2));

    let edit = toggle_mark(&doc, &sel, Mark::Underline).unwrap();
    let u = Marks::default().with(Mark::Underline);
    assert_eq!(
        edit.document,
        Document::new(vec![
            paragraph(vec![Node::text("o"), Node::marked("ne", u)]),
            Node::element(
                ElementKind::HeadingOne,
                vec![Node::marked("tw", u), Node::text("o")]
            ),
        ])
    );

    let back = toggle_mark(&edit.document, &edit.selection, Mark::Underline).unwrap();
    assert_eq!(back.document, doc);
}

#[test]
fn collapsed_caret_gets_an_empty_marked_leaf() {
    let doc = Document::new(vec![Node::paragraph("hello")]);
    let caret = Selection::caret(vec![0, 0], 2);

    let edit = toggle_mark(&doc, &caret, Mark::Bold).unwrap();
    assert_eq!(
        edit.document,
        Document::new(vec![paragraph(vec![
            Node::text("he"),
            Node::marked("", Marks::default().with(Mark::Bold)),
            Node::text("llo"),
        ])])
    );
    assert_eq!(edit.selection, Selection::caret(vec![0, 1], 0));
    assert!(is_mark_active(&edit.document, &edit.selection, Mark::Bold));

    let back = toggle_mark(&edit.document, &edit.selection, Mark::Bold).unwrap();
    assert_eq!(back.document, doc);
    assert_eq!(back.selection, Selection::caret(vec![0, 0], 2));
}

#[test]
fn collapsed_caret_in_empty_leaf_sets_marks_in_place() {
    let doc = Document::empty();
    let edit = toggle_mark(&doc, &Selection::caret(vec![0, 0], 0), Mark::Italic).unwrap();
    assert_eq!(
        edit.document,
        Document::new(vec![paragraph(vec![Node::marked(
            "",
            Marks::default().with(Mark::Italic)
        )])])
    );
}

#[test]
fn malformed_selection_is_rejected() {
    let doc = Document::new(vec![Node::paragraph("x")]);
    let sel = Selection::caret(vec![4, 0], 0);
    assert_eq!(
        toggle_mark(&doc, &sel, Mark::Bold),
        Err(EditError::MalformedSelection)
    );
}

#[test]
fn mark_names_parse() {
    assert_eq!("underline".parse::<Mark>().unwrap(), Mark::Underline);
    assert!("strike".parse::<Mark>().is_err());
}
