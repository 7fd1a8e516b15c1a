// End-to-end API tests for markclip.

use futures::executor::block_on;
use markclip::dom::{parse_document, parse_fragment};
use markclip::host::{extract_main_content, text_fragment_url, FragmentStatus, TextFragment};
use markclip::selection::{extract_fragment, BoundaryPoint, Selection, SelectionRange};
use markclip::settings::{keys, MemorySettings};
use markclip::{convert, convert_with, to_html, to_markdown, Error, Node, Options};
use pretty_assertions::assert_eq;

const SIMPLE_TABLE: &str = "<table><tr><th>a</th><th>b</th></tr><tr><td>c</td><td>d</td></tr></table>";
const ROWSPAN_TABLE: &str =
    r#"<table><tr><th rowspan="2">a</th><th>b</th></tr><tr><td>c</td></tr><tr><td>d</td><td>e</td></tr></table>"#;

#[test]
fn test_empty_input() {
    assert_eq!(convert(&parse_fragment(""), "markdown").unwrap(), "");
    assert_eq!(convert(&parse_fragment(""), "json").unwrap(), "[]");
}

#[test]
fn test_simple_table_in_every_table_format() {
    let node = parse_fragment(SIMPLE_TABLE);
    assert_eq!(
        convert(&node, "markdown").unwrap(),
        "| a | b |\n| --- | --- |\n| c | d |\n"
    );
    assert_eq!(convert(&node, "csv").unwrap(), "a,b\r\nc,d\r\n");
    assert_eq!(convert(&node, "json").unwrap(), r#"[{"a": ["b"]}, {"c": ["d"]}]"#);
}

#[test]
fn test_rowspan_table() {
    let node = parse_fragment(ROWSPAN_TABLE);
    assert_eq!(
        convert(&node, "markdown").unwrap(),
        "| a | b |\n| --- | --- |\n| a | c |\n| d | e |\n"
    );
    assert_eq!(convert(&node, "csv").unwrap(), "a,b\r\na,c\r\nd,e\r\n");
}

#[test]
fn test_csv_and_json_options() {
    let node = parse_fragment("<table><tr><td>k</td><td></td><td>1,000</td></tr></table>");
    let options = Options::new()
        .with_csv_delimiter(";")
        .with_json_empty_cell("\"\"");
    assert_eq!(convert_with(&node, "csv", &options).unwrap(), "k;;1,000\r\n");
    assert_eq!(convert_with(&node, "json", &options).unwrap(), r#"[{"k": ["", 1000]}]"#);
}

#[test]
fn test_unknown_format_is_an_error() {
    let err = convert(&parse_fragment("<p>x</p>"), "rtf").unwrap_err();
    assert_eq!(err, Error::UnknownFormat("rtf".to_string()));
    assert!(err.to_string().contains("rtf"));
}

#[test]
fn test_whole_document() {
    let node = parse_document(
        "<!DOCTYPE html><html><head><title>T</title></head><body><h1>Title</h1><p>Body <em>text</em>.</p></body></html>",
    );
    assert_eq!(convert(&node, "markdown").unwrap(), "# Title\n\nBody *text*.\n");
}

#[test]
fn test_html_format_is_sanitized() {
    let node = parse_fragment(
        r#"<p onclick="steal()">Hi <b>there</b><img src="/a.png" alt="a"></p><script>steal()</script>"#,
    );
    let options = Options::new().with_page_url("https://example.com/page");
    assert_eq!(
        to_html(&node, &options),
        r#"<p>Hi <b>there</b><img src="https://example.com/a.png" alt="a"></p>"#
    );
}

#[test]
fn test_markdown_with_html_keeps_inline_markup() {
    let node = parse_fragment("<p>E = mc<sup>2</sup></p>");
    assert_eq!(convert(&node, "markdown-with-html").unwrap(), "E = mc<sup>2</sup>\n");
    assert_eq!(convert(&node, "markdown").unwrap(), "E = mc2\n");
}

#[test]
fn test_selection_of_list_items() {
    let page = parse_fragment(
        r#"<ol start="1"><li>one</li><li>two</li><li>three</li><li>four</li><li>five</li></ol>"#,
    );
    let selection = Selection::single(SelectionRange::new(
        BoundaryPoint::new([0, 1, 0], 0),
        BoundaryPoint::new([0, 2, 0], 5),
    ));
    let fragment = extract_fragment(&page, &selection).unwrap();
    assert_eq!(to_markdown(&fragment, &Options::default()), "2. two\n3. three\n");
}

#[test]
fn test_selection_starting_in_heading() {
    let page = parse_fragment("<h2>Introduction</h2><p>First paragraph.</p><p>Second.</p>");
    let selection = Selection::single(SelectionRange::new(
        BoundaryPoint::new([0, 0], 5),
        BoundaryPoint::new([1, 0], 5),
    ));
    let fragment = extract_fragment(&page, &selection).unwrap();
    assert_eq!(to_markdown(&fragment, &Options::default()), "## Introduction\n\nFirst\n");
}

#[test]
fn test_multiple_ranges_are_merged() {
    let page = parse_fragment("<p>a</p><p>b</p><p>c</p>");
    let selection = Selection::new(vec![
        SelectionRange::new(BoundaryPoint::new([2], 0), BoundaryPoint::new([2], 1)),
        SelectionRange::new(BoundaryPoint::new([0], 0), BoundaryPoint::new([0], 1)),
    ]);
    let fragment = extract_fragment(&page, &selection).unwrap();
    assert_eq!(to_markdown(&fragment, &Options::default()), "a\n\nb\n\nc\n");
}

#[test]
fn test_selection_does_not_touch_the_page() {
    let page = parse_fragment(r#"<p>keep</p><p hidden>secret</p>"#);
    let before = page.clone();
    let selection = Selection::single(SelectionRange::new(
        BoundaryPoint::new(Vec::new(), 0),
        BoundaryPoint::new(Vec::new(), 2),
    ));
    let fragment = extract_fragment(&page, &selection).unwrap();
    assert_eq!(to_markdown(&fragment, &Options::default()), "keep\n");
    assert_eq!(page, before);
}

#[test]
fn test_text_fragment_link() {
    let generator = |_: &Selection| TextFragment {
        status: FragmentStatus::Success,
        text_start: "First paragraph".to_string(),
        text_end: None,
        prefix: None,
        suffix: None,
    };
    let url = text_fragment_url("https://example.com/post", Some(&generator), &Selection::default());
    assert_eq!(url.as_deref(), Some("https://example.com/post#:~:text=First%20paragraph"));
    assert_eq!(text_fragment_url("https://example.com/post", None, &Selection::default()), None);
}

#[test]
fn test_main_content_without_extractor() {
    let page = parse_fragment("<p>all of it</p>");
    let content = extract_main_content(&page, None);
    assert_eq!(to_markdown(&content, &Options::default()), "all of it\n");
}

#[test]
fn test_options_from_settings_drive_conversion() {
    let store = MemorySettings::new()
        .with(keys::BULLET_MARKER, "+")
        .with(keys::PAGE_URL, "https://example.com/dir/");
    let options = block_on(Options::from_settings(&store));
    let node = parse_fragment(r#"<ul><li><a href="x">x</a></li></ul>"#);
    assert_eq!(to_markdown(&node, &options), "+ [x](https://example.com/dir/x)\n");
}

#[test]
fn test_trees_built_by_hand() {
    let node = Node::Fragment(vec![
        markclip::Element::new("h3").with_text("Built").into(),
        markclip::Element::new("p")
            .with_text("by ")
            .with_child(markclip::Element::new("code").with_text("hand"))
            .into(),
    ]);
    assert_eq!(to_markdown(&node, &Options::default()), "### Built\n\nby `hand`\n");
}
