use rstest::rstest;
use slidedoc_core::{
    Document, ElementKind, Mark, Marks, Node, Point, Selection, active_list_kind, active_marks,
    is_block_active, is_mark_active,
};

#[rstest]
#[case(Selection::caret(vec![0, 0], 0))]
#[case(Selection::caret(vec![], 0))]
#[case(Selection::caret(vec![9, 9, 9], 3))]
#[case(Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![7, 0], 1)))]
fn queries_fail_closed(#[case] sel: Selection) {
    for doc in [Document::default(), Document::new(vec![Node::image("a.png", None)])] {
        for mark in Mark::ALL {
            assert!(!is_mark_active(&doc, &sel, mark));
        }
        for kind in [
            ElementKind::Paragraph,
            ElementKind::BulletedList,
            ElementKind::ListItem,
        ] {
            assert!(!is_block_active(&doc, &sel, &kind));
        }
        assert_eq!(active_marks(&doc, &sel), Marks::default());
        assert_eq!(active_list_kind(&doc, &sel), None);
    }
}

#[test]
fn block_activity_looks_at_anchor_ancestors() {
    let doc = Document::new(vec![
        Node::numbered_list(["a"]),
        Node::heading_one("b"),
    ]);
    let sel = Selection::new(Point::new(vec![0, 0, 0], 0), Point::new(vec![1, 0], 1));

    assert!(is_block_active(&doc, &sel, &ElementKind::NumberedList));
    assert!(is_block_active(&doc, &sel, &ElementKind::ListItem));
    assert!(!is_block_active(&doc, &sel, &ElementKind::HeadingOne));
    assert_eq!(active_list_kind(&doc, &sel), Some(ElementKind::NumberedList));
}

#[test]
fn mark_activity_needs_every_touched_leaf() {
    let bold = Marks::default().with(Mark::Bold);
    let doc = Document::new(vec![Node::element(
        ElementKind::Paragraph,
        vec![
            Node::marked("ab", bold),
            Node::text("cd"),
            Node::marked("ef", bold.with(Mark::Italic)),
        ],
    )]);

    let first_only = Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 2));
    assert!(is_mark_active(&doc, &first_only, Mark::Bold));

    let spanning = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 2], 1));
    assert!(!is_mark_active(&doc, &spanning, Mark::Bold));

    let backwards = Selection::new(Point::new(vec![0, 2], 2), Point::new(vec![0, 2], 0));
    assert!(is_mark_active(&doc, &backwards, Mark::Italic));

    assert_eq!(
        active_marks(&doc, &Selection::caret(vec![0, 2], 1)),
        bold.with(Mark::Italic)
    );
}

#[test]
fn void_leaves_are_not_text_for_queries() {
    let doc = Document::new(vec![Node::image("a.png", None)]);
    assert!(!is_mark_active(&doc, &Selection::caret(vec![0, 0], 0), Mark::Bold));
    assert!(is_block_active(
        &doc,
        &Selection::caret(vec![0, 0], 0),
        &ElementKind::Image
    ));
}
