// Sanitized HTML output.
//
// Serves the `html` format and the raw-HTML islands of `markdown-with-html`.
// Active content is dropped, attributes go through an allow-list, script
// URLs are removed and links are made absolute.

use super::context::State;
use super::tag::Tag;
use crate::dom::{Element, Node};

/// Attributes that survive sanitization.
const ALLOWED_ATTRS: &[&str] = &[
    "abbr", "alt", "checked", "cite", "colspan", "controls", "datetime", "dir", "disabled", "headers",
    "height", "href", "id", "lang", "name", "open", "poster", "reversed", "rowspan", "scope",
    "selected", "span", "src", "start", "title", "type", "value", "width",
];

/// Attributes holding URLs.
const URL_ATTRS: &[&str] = &["href", "src", "poster", "cite"];

/// Serialize a tree as sanitized HTML.
pub(crate) fn serialize(state: &mut State, node: &Node) -> String {
    let mut out = String::new();
    write_node(state, node, &mut out);
    out.trim().to_string()
}

fn write_node(state: &mut State, node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => write_element(state, el, out),
        Node::Comment(_) | Node::DocumentType => {}
        Node::Document(doc) => {
            if let Some(head) = &doc.head {
                super::apply_head_bases(state, head);
            }
            write_children(state, &doc.body.children, out);
        }
        Node::Fragment(children) => write_children(state, children, out),
    }
}

fn write_children(state: &mut State, children: &[Node], out: &mut String) {
    for child in children {
        write_node(state, child, out);
    }
}

fn write_element(state: &mut State, el: &Element, out: &mut String) {
    let tag = Tag::from_name(&el.tag);
    match tag {
        Tag::Base => {
            if let Some(href) = el.attr("href") {
                state.set_base(href);
            }
            return;
        }
        Tag::Script
        | Tag::Style
        | Tag::Template
        | Tag::Noscript
        | Tag::Head
        | Tag::Meta
        | Tag::Link
        | Tag::Title
        | Tag::Iframe
        | Tag::Object
        | Tag::Embed
        | Tag::Applet
        | Tag::Frame
        | Tag::Frameset => return,
        // Wrappers that carry no content of their own.
        Tag::Html | Tag::Body => {
            write_children(state, &el.children, out);
            return;
        }
        _ => {}
    }
    if !is_safe_name(&el.tag) {
        write_children(state, &el.children, out);
        return;
    }

    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        let name = name.to_ascii_lowercase();
        if !ALLOWED_ATTRS.contains(&name.as_str()) {
            continue;
        }
        let value = if URL_ATTRS.contains(&name.as_str()) {
            if is_script_url(value) {
                continue;
            }
            state.resolve(value)
        } else {
            value.clone()
        };
        push_attr(out, &name, &value);
    }
    out.push('>');

    if tag.is_void() {
        return;
    }
    write_children(state, &el.children, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Build `<tag attr="v">inner</tag>`; empty values render as bare attributes.
pub(crate) fn element_with_attrs(tag: &str, attrs: &[(&str, &str)], inner: &str) -> String {
    let mut out = format!("<{tag}");
    for (name, value) in attrs {
        push_attr(&mut out, name, value);
    }
    out.push('>');
    if !Tag::from_name(tag).is_void() {
        out.push_str(inner);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

/// Serialize one element subtree, for hybrid output of constructs like `<ruby>`.
pub(crate) fn outer_html(state: &mut State, el: &Element) -> String {
    let mut out = String::new();
    write_element(state, el, &mut out);
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

fn is_safe_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub(crate) fn is_script_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take(11)
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:") || compact.starts_with("vbscript:")
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
