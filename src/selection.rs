// Selection extraction.
//
// Clones the content of a user selection out of a tree into an owned
// fragment, the way DOM `Range.cloneContents` does, with two repairs that
// make the fragment convert well:
//
// - a start boundary sitting inside a heading, a table, or code is moved to
//   just before that element, so the whole unit is captured;
// - selected list items are re-wrapped in a copy of their list, with the
//   ordered-list numbering continued from where the selection begins.
//
// Boundary points address nodes by child-index paths from the root handed to
// `extract_fragment`. Offsets count characters inside text nodes and children
// inside everything else.

use std::cmp::Ordering;

use crate::convert::tag::Tag;
use crate::dom::{Element, Node};

/// How many ancestor levels the start boundary may climb.
const MAX_EXPANSION_LEVELS: usize = 3;

/// A DOM-style boundary point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundaryPoint {
    /// Child-index path from the root to the container node.
    pub path: Vec<usize>,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(path: impl Into<Vec<usize>>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// A contiguous range between two boundary points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl SelectionRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A user selection. Some browsers report several ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn new(ranges: Vec<SelectionRange>) -> Self {
        Self { ranges }
    }

    pub fn single(range: SelectionRange) -> Self {
        Self { ranges: vec![range] }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Document order of two boundary points.
pub fn compare_points(a: &BoundaryPoint, b: &BoundaryPoint) -> Ordering {
    if a.path == b.path {
        return a.offset.cmp(&b.offset);
    }
    if b.path.starts_with(&a.path) {
        // `a` sits in an ancestor of `b`'s container.
        let child = b.path[a.path.len()];
        return if a.offset <= child {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    if a.path.starts_with(&b.path) {
        return compare_points(b, a).reverse();
    }
    let split = a
        .path
        .iter()
        .zip(&b.path)
        .position(|(x, y)| x != y)
        .unwrap_or(0);
    a.path[split].cmp(&b.path[split])
}

/// Merge ranges into one spanning range. Gaps between ranges are bridged.
pub fn merge_ranges(ranges: &[SelectionRange]) -> Option<SelectionRange> {
    let (first, rest) = ranges.split_first()?;
    let mut merged = first.clone();
    for range in rest {
        if compare_points(&range.start, &merged.start) == Ordering::Less {
            merged.start = range.start.clone();
        }
        if compare_points(&range.end, &merged.end) == Ordering::Greater {
            merged.end = range.end.clone();
        }
    }
    Some(merged)
}

/// Clone the selected content of `root` into a `Node::Fragment`.
///
/// Returns `None` when the selection has no range or points outside the tree.
pub fn extract_fragment(root: &Node, selection: &Selection) -> Option<Node> {
    let mut range = merge_ranges(&selection.ranges)?;
    root.node_at(&range.start.path)?;
    root.node_at(&range.end.path)?;
    if compare_points(&range.start, &range.end) == Ordering::Greater {
        std::mem::swap(&mut range.start, &mut range.end);
    }
    range.start = expand_start(root, &range.start);

    let common: Vec<usize> = range
        .start
        .path
        .iter()
        .zip(&range.end.path)
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| *a)
        .collect();
    let ancestor = root.node_at(&common)?;
    let start = Bound {
        path: &range.start.path[common.len()..],
        offset: range.start.offset,
    };
    let end = Bound {
        path: &range.end.path[common.len()..],
        offset: range.end.offset,
    };
    let mut children = clone_children(ancestor, Some(start), Some(end));

    let first_child = start.path.first().copied().unwrap_or(start.offset);
    if starts_with_list_item(&children) {
        if let Some(list) = rebuild_list(root, &common, first_child, children.as_slice()) {
            children = list;
        }
    }
    debug!("extracted {} top-level nodes from selection", children.len());
    Some(Node::Fragment(children))
}

/// Move the start before an enclosing heading, table part, or code element.
fn expand_start(root: &Node, start: &BoundaryPoint) -> BoundaryPoint {
    let mut path = start.path.clone();
    let mut target: Option<Vec<usize>> = None;
    let mut climbed = 0;
    loop {
        if let Some(el) = root.node_at(&path).and_then(Node::as_element) {
            let tag = Tag::from_name(&el.tag);
            if tag.heading_level().is_some() || tag.is_table_part() || matches!(tag, Tag::Code | Tag::Pre) {
                target = Some(path.clone());
            } else if tag != Tag::Span {
                break;
            }
        }
        if path.is_empty() || climbed == MAX_EXPANSION_LEVELS {
            break;
        }
        path.pop();
        climbed += 1;
    }
    match target {
        Some(mut target) => match target.pop() {
            Some(index) => BoundaryPoint::new(target, index),
            None => start.clone(),
        },
        None => start.clone(),
    }
}

/// A boundary relative to the node being cloned.
#[derive(Debug, Clone, Copy)]
struct Bound<'a> {
    path: &'a [usize],
    offset: usize,
}

/// Clone the part of `node`'s content between `start` and `end` (`None`
/// meaning the respective edge of the node).
fn clone_children(node: &Node, start: Option<Bound>, end: Option<Bound>) -> Vec<Node> {
    if let Node::Text(text) = node {
        let len = text.chars().count();
        let from = start.map_or(0, |b| b.offset).min(len);
        let to = end.map_or(len, |b| b.offset).min(len);
        if from >= to {
            return Vec::new();
        }
        return vec![Node::Text(text.chars().skip(from).take(to - from).collect())];
    }
    let Some(children) = node.children() else {
        return Vec::new();
    };

    let (first, first_bound) = match start {
        None => (0, None),
        Some(b) => match b.path.split_first() {
            None => (b.offset, None),
            Some((&index, rest)) => (index, Some(Bound { path: rest, offset: b.offset })),
        },
    };
    let (stop, last_bound) = match end {
        None => (children.len(), None),
        Some(b) => match b.path.split_first() {
            None => (b.offset, None),
            Some((&index, rest)) => (index + 1, Some(Bound { path: rest, offset: b.offset })),
        },
    };

    let mut out = Vec::new();
    for (i, child) in children
        .iter()
        .enumerate()
        .take(stop.min(children.len()))
        .skip(first)
    {
        let s = if i == first { first_bound } else { None };
        let e = if i + 1 == stop { last_bound } else { None };
        if s.is_none() && e.is_none() {
            out.push(child.clone());
            continue;
        }
        match child {
            Node::Element(el) => out.push(Node::Element(Element {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                children: clone_children(child, s, e),
            })),
            Node::Text(_) => out.extend(clone_children(child, s, e)),
            other => out.push(other.clone()),
        }
    }
    out
}

fn starts_with_list_item(children: &[Node]) -> bool {
    children
        .iter()
        .find(|n| !n.is_whitespace_text())
        .is_some_and(|n| n.is_element("li"))
}

/// Wrap the leading run of list items in a copy of their list.
fn rebuild_list(root: &Node, common: &[usize], first_child: usize, children: &[Node]) -> Option<Vec<Node>> {
    let (list_path, list) = nearest_list(root, common)?;

    // Index of the first selected item among the list's children.
    let first_item = if list_path.len() == common.len() {
        list.children
            .iter()
            .enumerate()
            .skip(first_child)
            .find(|(_, n)| n.is_element("li"))
            .map(|(i, _)| i)?
    } else {
        common[list_path.len()]
    };

    let run_len = children
        .iter()
        .take_while(|n| n.is_element("li") || n.is_whitespace_text())
        .count();
    let (items, rest) = children.split_at(run_len);

    let mut wrapper = Element::new(list.tag.clone());
    for name in ["type", "reversed"] {
        if let Some(value) = list.attr(name) {
            wrapper.set_attr(name, value);
        }
    }
    if list.tag == "ol" {
        wrapper.set_attr("start", item_number(list, first_item).to_string());
    }
    wrapper.children = items.to_vec();

    let mut out = vec![Node::Element(wrapper)];
    out.extend(rest.iter().cloned());
    Some(out)
}

/// The closest `ol`/`ul`/`menu` at or above `path`.
fn nearest_list<'a>(root: &'a Node, path: &[usize]) -> Option<(Vec<usize>, &'a Element)> {
    (0..=path.len()).rev().find_map(|len| {
        let el = root.node_at(&path[..len])?.as_element()?;
        Tag::from_name(&el.tag).is_list().then(|| (path[..len].to_vec(), el))
    })
}

/// The number an ordered list shows for the item at child index `index`.
fn item_number(list: &Element, index: usize) -> i64 {
    let count = list.child_elements().filter(|c| c.tag == "li").count();
    let reversed = list.has_attr("reversed");
    let mut counter: i64 = list
        .attr("start")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(if reversed { count as i64 } else { 1 });
    for (i, child) in list.children.iter().enumerate() {
        let Some(item) = child.as_element().filter(|el| el.tag == "li") else {
            continue;
        };
        if let Some(value) = item.attr("value").and_then(|v| v.trim().parse().ok()) {
            counter = value;
        }
        if i >= index {
            return counter;
        }
        counter = counter.saturating_add(if reversed { -1 } else { 1 });
    }
    counter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    fn point(path: &[usize], offset: usize) -> BoundaryPoint {
        BoundaryPoint::new(path.to_vec(), offset)
    }

    fn range(start: BoundaryPoint, end: BoundaryPoint) -> Selection {
        Selection::single(SelectionRange::new(start, end))
    }

    #[test]
    fn point_ordering() {
        assert_eq!(compare_points(&point(&[0, 1], 2), &point(&[0, 1], 5)), Ordering::Less);
        assert_eq!(compare_points(&point(&[0, 2], 0), &point(&[0, 1, 0], 3)), Ordering::Greater);
        // Ancestor containers compare by offset against the child index.
        assert_eq!(compare_points(&point(&[0], 1), &point(&[0, 1, 0], 3)), Ordering::Less);
        assert_eq!(compare_points(&point(&[0], 2), &point(&[0, 1, 0], 3)), Ordering::Greater);
        assert_eq!(compare_points(&point(&[0, 1, 0], 3), &point(&[0], 2)), Ordering::Less);
    }

    #[test]
    fn merging_bridges_gaps() {
        let a = SelectionRange::new(point(&[2], 0), point(&[2], 1));
        let b = SelectionRange::new(point(&[0], 0), point(&[0], 1));
        let merged = merge_ranges(&[a, b]).unwrap();
        assert_eq!(merged.start, point(&[0], 0));
        assert_eq!(merged.end, point(&[2], 1));
        assert_eq!(merge_ranges(&[]), None);
    }

    #[test]
    fn no_range_no_fragment() {
        let root = parse_fragment("<p>x</p>");
        assert_eq!(extract_fragment(&root, &Selection::default()), None);
    }

    #[test]
    fn partial_text_is_cut() {
        let root = parse_fragment("<p>hello <b>bold</b> world</p>");
        // From "llo" in the first text to "wo" in the last.
        let fragment = extract_fragment(&root, &range(point(&[0, 0], 2), point(&[0, 2], 3))).unwrap();
        let expected = Node::Fragment(vec![
            Node::text("llo "),
            Element::new("b").with_text("bold").into(),
            Node::text(" wo"),
        ]);
        assert_eq!(fragment, expected);
    }

    #[test]
    fn partially_selected_elements_are_cloned_shallowly() {
        let root = parse_fragment("<p>one</p><p>two <i>three</i></p>");
        let fragment = extract_fragment(&root, &range(point(&[0, 0], 1), point(&[1, 1, 0], 2))).unwrap();
        let expected = Node::Fragment(vec![
            Element::new("p").with_text("ne").into(),
            Element::new("p")
                .with_text("two ")
                .with_child(Element::new("i").with_text("th"))
                .into(),
        ]);
        assert_eq!(fragment, expected);
    }

    #[test]
    fn start_inside_heading_takes_the_whole_heading() {
        let root = parse_fragment("<h2><span>Title</span></h2><p>body</p>");
        let fragment = extract_fragment(&root, &range(point(&[0, 0, 0], 3), point(&[1, 0], 4))).unwrap();
        assert_eq!(fragment.children().unwrap()[0].text_content(), "Title");
        assert_eq!(fragment.text_content(), "Titlebody");
    }

    #[test]
    fn start_inside_paragraph_is_not_expanded() {
        let root = parse_fragment("<p>Title</p>");
        let fragment = extract_fragment(&root, &range(point(&[0, 0], 2), point(&[0, 0], 5))).unwrap();
        assert_eq!(fragment, Node::Fragment(vec![Node::text("tle")]));
    }

    #[test]
    fn middle_items_keep_their_numbering() {
        let root = parse_fragment(
            r#"<ol start="1"><li>a</li><li>b</li><li>c</li><li>d</li><li>e</li></ol>"#,
        );
        let fragment = extract_fragment(&root, &range(point(&[0, 1, 0], 0), point(&[0, 2, 0], 1))).unwrap();
        let expected = Node::Fragment(vec![Element::new("ol")
            .with_attr("start", "2")
            .with_child(Element::new("li").with_text("b"))
            .with_child(Element::new("li").with_text("c"))
            .into()]);
        assert_eq!(fragment, expected);
    }

    #[test]
    fn reversed_lists_count_down() {
        let root = parse_fragment("<ol reversed><li>a</li><li>b</li><li>c</li></ol>");
        let fragment = extract_fragment(&root, &range(point(&[0, 1, 0], 0), point(&[0, 2, 0], 1))).unwrap();
        let list = fragment.children().unwrap()[0].as_element().unwrap();
        assert_eq!(list.attr("reversed"), Some(""));
        assert_eq!(list.attr("start"), Some("2"));
    }

    #[test]
    fn item_numbers_saturate_at_the_ends() {
        let list = Element::new("ol")
            .with_attr("start", "9223372036854775807")
            .with_child(Element::new("li").with_text("a"))
            .with_child(Element::new("li").with_text("b"));
        assert_eq!(item_number(&list, 1), i64::MAX);

        let reversed = Element::new("ol")
            .with_attr("reversed", "")
            .with_attr("start", "-9223372036854775808")
            .with_child(Element::new("li").with_text("a"))
            .with_child(Element::new("li").with_text("b"));
        assert_eq!(item_number(&reversed, 1), i64::MIN);
    }

    #[test]
    fn unordered_lists_are_rewrapped() {
        let root = parse_fragment("<ul><li>a</li><li>b</li></ul>");
        let fragment = extract_fragment(&root, &range(point(&[0, 0, 0], 0), point(&[0, 1, 0], 1))).unwrap();
        let list = fragment.children().unwrap()[0].as_element().unwrap();
        assert_eq!(list.tag, "ul");
        assert!(list.attr("start").is_none());
        assert_eq!(list.children.len(), 2);
    }
}
