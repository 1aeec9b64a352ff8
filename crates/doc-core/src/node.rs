use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseMarkError;

/// Extra element properties that have no typed field. Kept so that JSON
/// produced elsewhere round-trips without loss.
pub type Attrs = BTreeMap<String, serde_json::Value>;

/// The tree: an ordered forest of top-level block elements.
///
/// Serializes as a bare JSON array, the same shape a Slate editor value has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// A single empty paragraph, the default content of an editing area.
    pub fn empty() -> Self {
        Self {
            children: vec![Node::paragraph("")],
        }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    pub fn element(&self, path: &[usize]) -> Option<&ElementNode> {
        match self.node(path)? {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn text(&self, path: &[usize]) -> Option<&TextNode> {
        match self.node(path)? {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Children of the root (empty path) or of the element at `path`.
    pub fn children_at(&self, path: &[usize]) -> Option<&[Node]> {
        if path.is_empty() {
            return Some(&self.children);
        }
        self.element(path).map(|el| el.children.as_slice())
    }

    /// Concatenated text of every leaf, in document order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.collect_text(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(TextNode),
    Element(ElementNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode::new(text))
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(TextNode {
            marks,
            ..TextNode::new(text)
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(ElementKind::Paragraph, vec![Node::text(text)])
    }

    pub fn heading_one(text: impl Into<String>) -> Self {
        Node::element(ElementKind::HeadingOne, vec![Node::text(text)])
    }

    pub fn heading_two(text: impl Into<String>) -> Self {
        Node::element(ElementKind::HeadingTwo, vec![Node::text(text)])
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Node::element(ElementKind::ListItem, vec![Node::text(text)])
    }

    pub fn bulleted_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::element(
            ElementKind::BulletedList,
            items.into_iter().map(Node::list_item).collect(),
        )
    }

    pub fn numbered_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::element(
            ElementKind::NumberedList,
            items.into_iter().map(Node::list_item).collect(),
        )
    }

    pub fn image(url: impl Into<String>, alt: Option<String>) -> Self {
        Node::Element(ElementNode::image(url, alt))
    }

    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(ElementNode::new(kind, children))
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) if el.kind.is_void() => {}
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub attrs: Attrs,
}

impl ElementNode {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            url: None,
            alt: None,
            children,
            attrs: Attrs::default(),
        }
    }

    /// An image carries its single placeholder text child so the element is
    /// never childless.
    pub fn image(url: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            kind: ElementKind::Image,
            url: Some(url.into()),
            alt,
            children: vec![Node::text("")],
            attrs: Attrs::default(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.kind.is_void()
    }

    /// A non-void element whose children are all text leaves.
    pub fn is_text_block(&self) -> bool {
        !self.is_void() && self.children.iter().all(|n| matches!(n, Node::Text(_)))
    }
}

/// Closed set of element types. Anything else read from JSON is kept
/// verbatim in `Other` and rendered as a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    BulletedList,
    NumberedList,
    ListItem,
    Image,
    Quote,
    Other(String),
}

impl ElementKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "paragraph" => ElementKind::Paragraph,
            "heading-one" => ElementKind::HeadingOne,
            "heading-two" => ElementKind::HeadingTwo,
            "bulleted-list" => ElementKind::BulletedList,
            "numbered-list" => ElementKind::NumberedList,
            "list-item" => ElementKind::ListItem,
            "image" => ElementKind::Image,
            "quote" => ElementKind::Quote,
            other => ElementKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::HeadingOne => "heading-one",
            ElementKind::HeadingTwo => "heading-two",
            ElementKind::BulletedList => "bulleted-list",
            ElementKind::NumberedList => "numbered-list",
            ElementKind::ListItem => "list-item",
            ElementKind::Image => "image",
            ElementKind::Quote => "quote",
            ElementKind::Other(s) => s,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementKind::BulletedList | ElementKind::NumberedList)
    }

    /// Void elements are atomic for editing: their children are opaque.
    pub fn is_void(&self) -> bool {
        matches!(self, ElementKind::Image)
    }
}

impl From<String> for ElementKind {
    fn from(value: String) -> Self {
        ElementKind::parse(&value)
    }
}

impl From<ElementKind> for String {
    fn from(value: ElementKind) -> Self {
        match value {
            ElementKind::Other(s) => s,
            kind => kind.as_str().to_string(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text leaf. Keys that are neither `text` nor a known mark are kept in
/// `attrs`, the same way element attrs are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
    #[serde(flatten)]
    pub attrs: Attrs,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
            attrs: Attrs::default(),
        }
    }

    /// A leaf with the same marks and attrs holding `text`.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: self.marks,
            attrs: self.attrs.clone(),
        }
    }

    pub fn with_marks(&self, marks: Marks) -> Self {
        Self {
            marks,
            ..self.clone()
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, value: bool) {
        match mark {
            Mark::Bold => self.bold = value,
            Mark::Italic => self.italic = value,
            Mark::Underline => self.underline = value,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Underline];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
        }
    }

    /// Ctrl/Cmd shortcut letter for the mark.
    pub fn from_hotkey(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'b' => Some(Mark::Bold),
            'i' => Some(Mark::Italic),
            'u' => Some(Mark::Underline),
            _ => None,
        }
    }
}

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Mark::Bold),
            "italic" => Ok(Mark::Italic),
            "underline" => Ok(Mark::Underline),
            other => Err(ParseMarkError(other.to_string())),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
