// In-memory DOM tree consumed by the converter.
//
// The engine never parses markup itself: hosts hand it a tree of `Node`s.
// `parse` adapts html5ever output into this shape for hosts (and tests) that
// start from a string; `prune` holds the hidden-subtree pre-pass.

mod parse;
mod prune;

pub use parse::{parse_document, parse_fragment};
pub use prune::{is_hidden, prune_hidden};

/// A node in a parsed HTML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
    Comment(String),
    DocumentType,
    Document(Document),
    Fragment(Vec<Node>),
}

/// An HTML element.
///
/// `tag` is stored lower-cased. Attributes keep their source order so the
/// HTML serializer can reproduce them faithfully.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A whole document. `head` is kept so `<base href>` there still applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub head: Option<Element>,
    pub body: Element,
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the element's tag name, if this node is an element.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    /// Whether this is an element with the given tag (case-insensitive).
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether this is a text node containing only whitespace.
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.chars().all(char::is_whitespace))
    }

    /// Returns a reference to this node's children, if it can have any.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element(el) => Some(&el.children),
            Node::Fragment(children) => Some(children),
            Node::Document(doc) => Some(&doc.body.children),
            _ => None,
        }
    }

    /// Returns a mutable reference to this node's children, if it can have any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(el) => Some(&mut el.children),
            Node::Fragment(children) => Some(children),
            Node::Document(doc) => Some(&mut doc.body.children),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Follow a child-index path from this node.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(t),
        Node::Element(el) => {
            for child in &el.children {
                collect_text(child, out);
            }
        }
        Node::Fragment(children) => {
            for child in children {
                collect_text(child, out);
            }
        }
        Node::Document(doc) => collect_text_element(&doc.body, out),
        Node::Comment(_) | Node::DocumentType => {}
    }
}

fn collect_text_element(el: &Element, out: &mut String) {
    for child in &el.children {
        collect_text(child, out);
    }
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// Get an attribute value (case-insensitive name).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Parse a non-negative integer attribute, ignoring surrounding whitespace.
    pub fn attr_u32(&self, name: &str) -> Option<u32> {
        self.attr(name)?.trim().parse().ok()
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Whether any descendant element satisfies `pred`.
    pub fn has_descendant(&self, pred: &dyn Fn(&Element) -> bool) -> bool {
        self.child_elements()
            .any(|child| pred(child) || child.has_descendant(pred))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text_element(self, &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}
