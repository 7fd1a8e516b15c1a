// Hidden-subtree removal.
//
// Runs once over an owned copy of the tree before conversion starts. Only
// inline styles are visible here; hosts with a live layout engine should
// resolve computed visibility into the `hidden` attribute before handing the
// tree over.

use super::{Element, Node};

/// Remove every hidden element from the tree. Returns how many were removed.
pub fn prune_hidden(node: &mut Node) -> usize {
    let mut removed = 0;
    if let Node::Document(doc) = node {
        if let Some(head) = doc.head.as_mut() {
            removed += prune_children(&mut head.children);
        }
    }
    if let Some(children) = node.children_mut() {
        removed += prune_children(children);
    }
    removed
}

fn prune_children(children: &mut Vec<Node>) -> usize {
    let before = children.len();
    children.retain(|child| !matches!(child, Node::Element(el) if is_hidden(el)));
    let mut removed = before - children.len();
    for child in children.iter_mut() {
        removed += prune_hidden(child);
    }
    removed
}

/// Whether an element is hidden by the `hidden` attribute or its inline style.
pub fn is_hidden(el: &Element) -> bool {
    if el.has_attr("hidden") {
        return true;
    }
    if el.tag == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return true;
    }
    let Some(style) = el.attr("style") else {
        return false;
    };
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        (prop == "display" && value == "none") || (prop == "visibility" && value == "hidden")
    })
}
