use html_escape::encode_quoted_attribute_to_string;
use slidedoc_core::{Document, ElementKind, ElementNode, Marks, Node, TextNode};

/// Serialize every top-level block, in order, with no separator.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for node in &doc.children {
        write_node(node, &mut out);
    }
    out
}

pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => write_text(text, out),
        Node::Element(el) => write_element(el, out),
    }
}

/// Marks nest bold outermost, then italic, then underline. Text is escaped
/// like a quoted attribute value, so `'` comes out as `&#x27;` rather than
/// `&#39;`.
fn write_text(text: &TextNode, out: &mut String) {
    let Marks {
        bold,
        italic,
        underline,
    } = text.marks;

    if bold {
        out.push_str("<strong>");
    }
    if italic {
        out.push_str("<em>");
    }
    if underline {
        out.push_str("<u>");
    }
    encode_quoted_attribute_to_string(&text.text, out);
    if underline {
        out.push_str("</u>");
    }
    if italic {
        out.push_str("</em>");
    }
    if bold {
        out.push_str("</strong>");
    }
}

fn write_element(el: &ElementNode, out: &mut String) {
    let tag = match &el.kind {
        ElementKind::Image => {
            write_image(el, out);
            return;
        }
        ElementKind::HeadingOne => "h1",
        ElementKind::HeadingTwo => "h2",
        ElementKind::BulletedList => "ul",
        ElementKind::NumberedList => "ol",
        ElementKind::ListItem => "li",
        ElementKind::Paragraph => "p",
        kind @ (ElementKind::Quote | ElementKind::Other(_)) => {
            tracing::trace!(%kind, "no tag for element kind, writing a paragraph");
            "p"
        }
    };

    out.push('<');
    out.push_str(tag);
    out.push('>');
    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

// Children of a void element are a placeholder and never rendered.
fn write_image(el: &ElementNode, out: &mut String) {
    out.push_str("<img src=\"");
    encode_quoted_attribute_to_string(el.url.as_deref().unwrap_or_default(), out);
    out.push_str("\" alt=\"");
    encode_quoted_attribute_to_string(el.alt.as_deref().unwrap_or_default(), out);
    out.push_str("\" />");
}
