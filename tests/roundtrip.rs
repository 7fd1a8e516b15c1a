// Round-trip checks: Markdown produced by markclip, rendered back to HTML by
// a CommonMark/GFM parser, must keep the structure of the input.

use markclip::dom::parse_fragment;
use markclip::{to_markdown, Options};
use pulldown_cmark::{html, Options as ParseOptions, Parser};

fn render(md: &str) -> String {
    let options = ParseOptions::ENABLE_TABLES | ParseOptions::ENABLE_STRIKETHROUGH;
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(md, options));
    out
}

fn roundtrip(input: &str) -> String {
    let md = to_markdown(&parse_fragment(input), &Options::default());
    render(&md)
}

#[test]
fn tables_stay_tables() {
    let html = roundtrip(
        r#"<table><tr><th rowspan="2">a</th><th>b</th></tr><tr><td>c|x</td></tr><tr><td>d</td><td>e</td></tr></table>"#,
    );
    assert!(html.contains("<table>"));
    assert!(html.contains("<th>a</th>"));
    assert_eq!(html.matches("<tr>").count(), 3);
    assert!(html.contains("<td>c|x</td>"));
}

#[test]
fn ordered_lists_keep_their_start() {
    let html = roundtrip(r#"<ol start="4"><li>four</li><li>five</li></ol>"#);
    assert!(html.contains(r#"<ol start="4">"#));
    assert_eq!(html.matches("<li>").count(), 2);
}

#[test]
fn nested_lists_stay_nested() {
    let html = roundtrip("<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>");
    assert!(html.contains("<li>a\n<ol>\n<li>b</li>\n</ol>\n</li>"), "{html}");
    assert!(html.contains("<li>c</li>"));
}

#[test]
fn escaped_text_stays_text() {
    let html = roundtrip("<p>1. *not* a list &lt;b&gt; #tag</p>");
    assert_eq!(html, "<p>1. *not* a list &lt;b&gt; #tag</p>\n");
}

#[test]
fn intraword_emphasis_survives() {
    assert_eq!(roundtrip("<p>foo<em>bar</em>baz</p>"), "<p>foo<em>bar</em>baz</p>\n");
}

#[test]
fn inline_markup_survives() {
    let html = roundtrip(r#"<p><b>bold</b>, <i>italic</i>, <del>gone</del> and <a href="https://e.com/a b">link</a></p>"#);
    assert_eq!(
        html,
        "<p><strong>bold</strong>, <em>italic</em>, <del>gone</del> and <a href=\"https://e.com/a%20b\">link</a></p>\n"
    );
}

#[test]
fn code_blocks_survive() {
    let html = roundtrip("<pre><code class=\"language-sh\">echo ```\n</code></pre>");
    assert_eq!(html, "<pre><code class=\"language-sh\">echo ```\n</code></pre>\n");
}
