// html5ever adapter.
//
// Parses markup with html5ever into an RcDom, then copies it into the owned
// `Node` tree the converter walks.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{Document, Element, Node};

/// Parse a complete HTML document.
///
/// Missing `<head>`/`<body>` are synthesized by the HTML5 tree builder, so the
/// result always has a body.
pub fn parse_document(html: &str) -> Node {
    let dom = parse_html(html);
    let mut head = None;
    let mut body = None;

    for child in dom.document.children.borrow().iter() {
        if !is_element_named(child, "html") {
            continue;
        }
        for part in child.children.borrow().iter() {
            if is_element_named(part, "head") {
                head = convert_element(part);
            } else if is_element_named(part, "body") {
                body = convert_element(part);
            }
        }
    }

    Node::Document(Document {
        head,
        body: body.unwrap_or_else(|| Element::new("body")),
    })
}

/// Parse an HTML snippet into a fragment holding the body's children.
pub fn parse_fragment(html: &str) -> Node {
    match parse_document(html) {
        Node::Document(doc) => Node::Fragment(doc.body.children),
        other => other,
    }
}

/// Parse an HTML string into an html5ever RcDom.
fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    html5ever::parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

fn is_element_named(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
}

fn convert_element(handle: &Handle) -> Option<Element> {
    match convert(handle)? {
        Node::Element(el) => Some(el),
        _ => None,
    }
}

/// Copy an RcDom node (and its subtree) into a `Node`.
fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Doctype { .. } => Some(Node::DocumentType),
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let children = convert_children(handle);
            Some(Node::Element(Element {
                tag: name.local.as_ref().to_ascii_lowercase(),
                attrs,
                children,
            }))
        }
        NodeData::Document => Some(Node::Fragment(convert_children(handle))),
        NodeData::ProcessingInstruction { .. } => None,
    }
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keeps_head_and_body() {
        let node = parse_document(
            r#"<html><head><base href="https://example.com/"></head><body><p>Hi</p></body></html>"#,
        );
        let Node::Document(doc) = node else {
            panic!("expected a document");
        };
        let head = doc.head.expect("head");
        assert!(head.children[0].is_element("base"));
        assert!(doc.body.children[0].is_element("p"));
    }

    #[test]
    fn fragment_is_body_children() {
        let node = parse_fragment("<p>a</p><p>b</p>");
        let Node::Fragment(children) = node else {
            panic!("expected a fragment");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].text_content(), "b");
    }

    #[test]
    fn attributes_and_tags_are_copied() {
        let node = parse_fragment(r#"<TD COLSPAN="2">x</TD>"#);
        // A lone cell is dropped by the HTML5 tree builder outside a table.
        assert_eq!(node.text_content(), "x");
        let node = parse_fragment(r#"<A HREF="/x">y</A>"#);
        let a = node.children().unwrap()[0].as_element().unwrap();
        assert_eq!(a.tag, "a");
        assert_eq!(a.attr("href"), Some("/x"));
    }
}
