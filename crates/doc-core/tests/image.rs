use pretty_assertions::assert_eq;
use rstest::rstest;
use slidedoc_core::{
    Document, EditError, Editor, ElementKind, ElementNode, Mark, Marks, Node, Selection,
    insert_void_element,
};

fn cat() -> ElementNode {
    ElementNode::image("a.png", Some("cat".to_string()))
}

#[test]
fn image_is_followed_by_an_editable_paragraph() {
    let doc = Document::new(vec![Node::paragraph("hi"), Node::paragraph("there")]);
    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0], 2), cat()).unwrap();

    assert_eq!(
        edit.document,
        Document::new(vec![
            Node::paragraph("hi"),
            Node::Element(cat()),
            Node::paragraph(""),
            Node::paragraph("there"),
        ])
    );
    assert_eq!(edit.selection, Selection::caret(vec![2, 0], 0));
}

#[rstest]
#[case::at_start(0, vec![
    Node::Element(cat()),
    Node::paragraph(""),
    Node::paragraph("Hello world"),
], 1)]
#[case::mid_text(5, vec![
    Node::paragraph("Hello"),
    Node::Element(cat()),
    Node::paragraph(""),
    Node::paragraph(" world"),
], 2)]
#[case::at_end(11, vec![
    Node::paragraph("Hello world"),
    Node::Element(cat()),
    Node::paragraph(""),
], 2)]
fn image_lands_at_the_caret(
    #[case] offset: usize,
    #[case] expected: Vec<Node>,
    #[case] caret_block: usize,
) {
    let doc = Document::new(vec![Node::paragraph("Hello world")]);
    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0], offset), cat()).unwrap();

    assert_eq!(edit.document, Document::new(expected));
    assert_eq!(edit.selection, Selection::caret(vec![caret_block, 0], 0));
    assert_eq!(edit.document.plain_text(), doc.plain_text());
}

#[test]
fn mid_text_split_keeps_block_type_and_marks() {
    let bold = Marks::default().with(Mark::Bold);
    let doc = Document::new(vec![Node::element(
        ElementKind::HeadingOne,
        vec![Node::marked("ab", bold), Node::text("cd")],
    )]);

    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0], 1), cat()).unwrap();
    assert_eq!(
        edit.document,
        Document::new(vec![
            Node::element(ElementKind::HeadingOne, vec![Node::marked("a", bold)]),
            Node::Element(cat()),
            Node::paragraph(""),
            Node::element(
                ElementKind::HeadingOne,
                vec![Node::marked("b", bold), Node::text("cd")]
            ),
        ])
    );
    assert_eq!(edit.selection, Selection::caret(vec![2, 0], 0));
}

#[test]
fn image_in_a_list_lands_after_the_list() {
    let doc = Document::new(vec![Node::bulleted_list(["a", "b"])]);
    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0, 0], 0), cat()).unwrap();

    assert_eq!(
        edit.document,
        Document::new(vec![
            Node::bulleted_list(["a", "b"]),
            Node::Element(cat()),
            Node::paragraph(""),
        ])
    );
}

#[test]
fn empty_document_receives_the_image_first() {
    let doc = Document::default();
    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0], 0), cat()).unwrap();

    assert_eq!(
        edit.document,
        Document::new(vec![Node::Element(cat()), Node::paragraph("")])
    );
    assert_eq!(edit.selection, Selection::caret(vec![1, 0], 0));
}

#[test]
fn childless_image_gets_its_placeholder() {
    let mut image = cat();
    image.children.clear();
    let doc = Document::new(vec![Node::paragraph("x")]);

    let edit = insert_void_element(&doc, &Selection::caret(vec![0, 0], 1), image).unwrap();
    assert_eq!(edit.document.children[1], Node::Element(cat()));
}

#[test]
fn non_void_elements_are_rejected() {
    let doc = Document::new(vec![Node::paragraph("x")]);
    let paragraph = ElementNode::new(ElementKind::Paragraph, vec![Node::text("y")]);
    assert_eq!(
        insert_void_element(&doc, &Selection::caret(vec![0, 0], 0), paragraph),
        Err(EditError::NotVoid(ElementKind::Paragraph))
    );
}

#[test]
fn stale_selection_is_rejected() {
    let doc = Document::new(vec![Node::paragraph("x")]);
    assert_eq!(
        insert_void_element(&doc, &Selection::caret(vec![2, 0], 0), cat()),
        Err(EditError::MalformedSelection)
    );
}

#[test]
fn editor_insert_image_moves_the_caret_past_it() {
    let mut editor = Editor::new(
        Document::new(vec![Node::paragraph("title")]),
        Selection::caret(vec![0, 0], 5),
    );
    editor.insert_image("b.png", None).unwrap();

    assert_eq!(editor.doc().children.len(), 3);
    assert_eq!(editor.selection(), &Selection::caret(vec![2, 0], 0));
    assert_eq!(editor.doc().plain_text(), "title");
}
