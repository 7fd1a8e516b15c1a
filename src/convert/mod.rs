// Tree → output conversion.
//
// Architecture:
//   Node tree → (hidden pruning on an owned copy) → per-tag handlers → post-pass → Markdown
//   Node tree → table grids → CSV / JSON writers
//   Node tree → sanitizing serializer → HTML

mod context;
mod handlers;
pub(crate) mod html;
pub(crate) mod media;
mod spacing;
pub(crate) mod tag;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::dom::{prune_hidden, Element, Node};
use crate::table::csv::CsvWriter;
use crate::table::json::JsonWriter;
use crate::table::build_grid;
use crate::{Error, Options};

use context::{Config, Context, State};

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Markdown,
    /// Markdown with raw HTML for constructs Markdown cannot express.
    MarkdownWithHtml,
    /// Sanitized HTML.
    Html,
    /// Every table, as CSV.
    Csv,
    /// Every table, as JSON row objects.
    Json,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Markdown => "markdown",
            Format::MarkdownWithHtml => "markdown-with-html",
            Format::Html => "html",
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Format::Markdown),
            "markdown-with-html" => Ok(Format::MarkdownWithHtml),
            "html" => Ok(Format::Html),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Convert a tree to the given format.
pub fn convert_format(node: &Node, format: Format, options: &Options) -> String {
    debug!("converting {} to {}", node_kind(node), format);
    let tree = prepare(node, options);
    match format {
        Format::Markdown => markdown(&tree, options, false),
        Format::MarkdownWithHtml => markdown(&tree, options, true),
        Format::Html => {
            let mut state = State::new(options.page_url.as_deref());
            html::serialize(&mut state, &tree)
        }
        Format::Csv => csv(&tree, options),
        Format::Json => json(&tree, options),
    }
}

/// Prune hidden elements from an owned copy; the caller's tree is never touched.
fn prepare<'a>(node: &'a Node, options: &Options) -> Cow<'a, Node> {
    if !options.remove_hidden {
        return Cow::Borrowed(node);
    }
    let mut owned = node.clone();
    let removed = prune_hidden(&mut owned);
    debug!("pruned {} hidden elements", removed);
    Cow::Owned(owned)
}

fn markdown(node: &Node, options: &Options, hybrid: bool) -> String {
    let config = Config::new(options, hybrid);
    let mut state = State::new(options.page_url.as_deref());
    let raw = handlers::one(&mut state, &Context::new(&config), node);
    spacing::finish(&raw)
}

fn csv(node: &Node, options: &Options) -> String {
    let writer = CsvWriter::new(
        options.csv.delimiter.as_str(),
        options.csv.line_terminator.as_str(),
    );
    let tables: Vec<String> = top_level_tables(node, options)
        .into_iter()
        .map(|table| writer.write_grid(&build_grid(table)))
        .filter(|text| !text.is_empty())
        .collect();
    tables.join(&options.csv.line_terminator)
}

fn json(node: &Node, options: &Options) -> String {
    let writer = JsonWriter::new(options.json_empty_cell.as_str());
    let rows: Vec<String> = top_level_tables(node, options)
        .into_iter()
        .flat_map(|table| writer.row_objects(&build_grid(table)))
        .collect();
    format!("[{}]", rows.join(", "))
}

/// Tables in document order, not descending into tables.
fn top_level_tables<'a>(node: &'a Node, options: &Options) -> Vec<&'a Element> {
    let mut tables = Vec::new();
    if let Node::Element(el) = node {
        if el.tag == "table" {
            tables.push(el);
            return tables;
        }
    }
    if let Some(children) = node.children() {
        collect_tables(children, options, &mut tables);
    }
    tables
}

fn collect_tables<'a>(nodes: &'a [Node], options: &Options, out: &mut Vec<&'a Element>) {
    for node in nodes {
        let Node::Element(el) = node else {
            if let Some(children) = node.children() {
                collect_tables(children, options, out);
            }
            continue;
        };
        match el.tag.as_str() {
            "table" => out.push(el),
            "nav" if options.omit_nav => {}
            "footer" if options.omit_footer => {}
            "script" | "style" | "template" => {}
            _ => collect_tables(&el.children, options, out),
        }
    }
}

/// `<base>` elements in a document head apply before the body is visited.
pub(crate) fn apply_head_bases(state: &mut State, head: &Element) {
    for base in head.child_elements().filter(|el| el.tag == "base") {
        if let Some(href) = base.attr("href") {
            state.set_base(href);
        }
    }
}

fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Document(_) => "document",
        Node::Fragment(_) => "fragment",
        Node::Element(_) => "element",
        Node::Text(_) => "text",
        Node::Comment(_) | Node::DocumentType => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_document, parse_fragment};

    #[test]
    fn format_names() {
        assert_eq!("markdown".parse::<Format>(), Ok(Format::Markdown));
        assert_eq!("MD".parse::<Format>(), Ok(Format::Markdown));
        assert_eq!("markdown-with-html".parse::<Format>(), Ok(Format::MarkdownWithHtml));
        assert_eq!(
            "pdf".parse::<Format>(),
            Err(Error::UnknownFormat("pdf".to_string()))
        );
        assert_eq!(Format::Csv.to_string(), "csv");
    }

    #[test]
    fn hidden_elements_are_pruned_from_a_copy() {
        let node = parse_fragment(r#"<p>shown</p><p hidden>secret</p>"#);
        let md = convert_format(&node, Format::Markdown, &Options::default());
        assert_eq!(md, "shown\n");
        assert!(node.text_content().contains("secret"));

        let keep = Options::default().with_remove_hidden(false);
        assert_eq!(convert_format(&node, Format::Markdown, &keep), "shown\n\nsecret\n");
    }

    #[test]
    fn head_base_applies_to_body() {
        let node = parse_document(
            r#"<html><head><base href="https://example.com/docs/"></head><body><a href="x">x</a></body></html>"#,
        );
        assert_eq!(
            convert_format(&node, Format::Markdown, &Options::default()),
            "[x](https://example.com/docs/x)\n"
        );
    }

    #[test]
    fn csv_joins_tables_with_a_blank_line() {
        let node = parse_fragment(
            "<table><tr><td>a</td></tr></table><p>x</p><div><table><tr><td>b</td></tr></table></div>",
        );
        assert_eq!(convert_format(&node, Format::Csv, &Options::default()), "a\r\n\r\nb\r\n");
        assert_eq!(
            convert_format(&node, Format::Json, &Options::default()),
            r#"[{"a": []}, {"b": []}]"#
        );
    }

    #[test]
    fn no_tables() {
        let node = parse_fragment("<p>x</p>");
        assert_eq!(convert_format(&node, Format::Csv, &Options::default()), "");
        assert_eq!(convert_format(&node, Format::Json, &Options::default()), "[]");
    }
}
