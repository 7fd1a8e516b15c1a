// Per-tag conversion handlers.
//
// Every handler returns the Markdown for its node. Block handlers pad their
// output with blank lines (or with single spaces in flat contexts such as
// table cells); the post-pass collapses the excess.

use super::context::{Context, State};
use super::spacing::{collapse_blank_lines, LINK_END, LINK_START};
use super::tag::Tag;
use super::{html, media};
use crate::dom::{Element, Node};
use crate::escape::{encode_destination, escape_title};
use crate::table;

/// Convert a single node.
pub(crate) fn one(state: &mut State, ctx: &Context, node: &Node) -> String {
    match node {
        Node::Text(text) => self::text(ctx, text),
        Node::Element(el) => element(state, ctx, el),
        Node::Comment(_) | Node::DocumentType => String::new(),
        Node::Document(doc) => {
            if let Some(head) = &doc.head {
                super::apply_head_bases(state, head);
            }
            all(state, ctx, &doc.body.children)
        }
        Node::Fragment(children) => all(state, ctx, children),
    }
}

/// Convert a sibling list, in a block formatting context when any of the
/// siblings is a block element.
pub(crate) fn all(state: &mut State, ctx: &Context, nodes: &[Node]) -> String {
    if !ctx.flat() && !ctx.preformatted && nodes.iter().any(is_block) {
        block(state, ctx, nodes)
    } else {
        inline(state, ctx, nodes)
    }
}

fn is_block(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| Tag::from_name(&el.tag).is_block())
}

fn block(state: &mut State, ctx: &Context, nodes: &[Node]) -> String {
    let mut out = String::new();
    let mut run_start = 0;
    for (i, node) in nodes.iter().enumerate() {
        if is_block(node) {
            out.push_str(&anonymous_paragraph(state, ctx, &nodes[run_start..i]));
            out.push_str(&one(state, ctx, node));
            run_start = i + 1;
        }
    }
    out.push_str(&anonymous_paragraph(state, ctx, &nodes[run_start..]));
    out
}

/// Inline siblings between blocks become a paragraph of their own.
fn anonymous_paragraph(state: &mut State, ctx: &Context, nodes: &[Node]) -> String {
    if nodes
        .iter()
        .all(|n| n.is_whitespace_text() || matches!(n, Node::Comment(_)))
    {
        return String::new();
    }
    padded_block(ctx, &inline(state, ctx, nodes))
}

fn inline(state: &mut State, ctx: &Context, nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        let part = one(state, ctx, node);
        if ctx.preformatted {
            out.push_str(&part);
        } else {
            join_inline(&mut out, &part);
        }
    }
    out
}

/// Append an inline part, collapsing whitespace across the seam.
fn join_inline(out: &mut String, part: &str) {
    let part = if out.ends_with([' ', '\n']) {
        part.trim_start_matches(' ')
    } else {
        part
    };
    if part.starts_with('\n') {
        let kept = out.trim_end_matches(' ').len();
        out.truncate(kept);
    }
    out.push_str(part);
}

fn text(ctx: &Context, raw: &str) -> String {
    if ctx.preformatted {
        return ctx.config.escaper.escape(raw);
    }
    ctx.config.escaper.escape(&collapse_spaces(raw))
}

fn element(state: &mut State, ctx: &Context, el: &Element) -> String {
    let tag = Tag::from_name(&el.tag);
    let hybrid = ctx.config.hybrid;
    match tag {
        Tag::Heading(_) => heading(state, ctx, el, tag),
        Tag::P => container(state, ctx, el),
        Tag::Br => line_break(ctx),
        Tag::Hr => {
            if ctx.flat() {
                " ".to_string()
            } else {
                "\n\n---\n\n".to_string()
            }
        }
        Tag::Blockquote => blockquote(state, ctx, el),
        Tag::Ul | Tag::Menu => list(state, ctx, el, false),
        Tag::Ol => list(state, ctx, el, true),
        // Lists render their own items.
        Tag::Li => String::new(),
        Tag::Pre | Tag::Listing | Tag::Xmp | Tag::Plaintext => pre(state, ctx, el),
        Tag::Code | Tag::Tt | Tag::Samp | Tag::Var => inline_code(state, ctx, el),
        Tag::Kbd if hybrid => {
            let text = collapse_spaces(&el.text_content());
            wrap_html("kbd", &[], &html::escape_text(&text))
        }
        Tag::Kbd => inline_code(state, ctx, el),
        Tag::Em | Tag::I | Tag::Cite | Tag::Dfn => {
            if ctx.in_em {
                all(state, ctx, &el.children)
            } else {
                wrap_inline(&all(state, &ctx.em(), &el.children), "*")
            }
        }
        Tag::Strong | Tag::B => {
            if ctx.in_strong {
                all(state, ctx, &el.children)
            } else {
                wrap_inline(&all(state, &ctx.strong(), &el.children), "**")
            }
        }
        Tag::S | Tag::Del | Tag::Strike => {
            if ctx.in_s {
                all(state, ctx, &el.children)
            } else {
                wrap_inline(&all(state, &ctx.strikethrough(), &el.children), "~~")
            }
        }
        Tag::A => link(state, ctx, el),
        Tag::Img => media::image(state, el),
        Tag::Video => media::video(state, ctx, el),
        Tag::Audio => media::audio(state, ctx, el),
        Tag::Iframe => media::iframe(state, ctx, el),
        Tag::Object => media::object(state, el, "data"),
        Tag::Embed => media::object(state, el, "src"),
        Tag::Table | Tag::Thead | Tag::Tbody | Tag::Tfoot | Tag::Tr => table(state, ctx, el),
        Tag::Dt => definition_term(state, ctx, el),
        Tag::Dd => definition(state, ctx, el),
        Tag::Nav if ctx.config.omit_nav => String::new(),
        Tag::Footer if ctx.config.omit_footer && !ctx.in_blockquote => String::new(),
        Tag::Base => {
            if let Some(href) = el.attr("href") {
                state.set_base(href);
            }
            String::new()
        }
        Tag::Input => input(el),
        Tag::Select => select(ctx, el),
        Tag::Textarea => ctx
            .config
            .escaper
            .escape(&collapse_spaces(&el.text_content())),
        Tag::Q => format!("\"{}\"", all(state, ctx, &el.children).trim()),
        Tag::Details if hybrid => details(state, ctx, el),
        Tag::Summary if hybrid => {
            let text = collapse_spaces(&el.text_content());
            let text = text.trim();
            if text.is_empty() || ctx.flat() {
                format!(" {text} ")
            } else {
                format!("\n\n{}\n\n", wrap_html("summary", &[], &html::escape_text(text)))
            }
        }
        Tag::Sub | Tag::Sup | Tag::U | Tag::Ins | Tag::Mark | Tag::Small | Tag::Big => {
            let content = all(state, ctx, &el.children);
            if hybrid {
                wrap_inline_html(&el.tag, &[], &content)
            } else {
                content
            }
        }
        Tag::Abbr | Tag::Acronym => {
            let content = all(state, ctx, &el.children);
            match el.attr("title").map(str::trim).filter(|t| !t.is_empty()) {
                Some(title) if hybrid => wrap_inline_html("abbr", &[("title", title)], &content),
                _ => content,
            }
        }
        Tag::Ruby if hybrid => html::outer_html(state, el),
        Tag::Script
        | Tag::Style
        | Tag::Template
        | Tag::Noscript
        | Tag::Head
        | Tag::Title
        | Tag::Meta
        | Tag::Link
        | Tag::Datalist
        | Tag::Option
        | Tag::Optgroup
        | Tag::Source
        | Tag::Track
        | Tag::Param
        | Tag::Area
        | Tag::Col
        | Tag::Colgroup
        | Tag::Canvas
        | Tag::Svg
        | Tag::Button
        | Tag::Wbr
        | Tag::Applet
        | Tag::Frame
        | Tag::Frameset
        | Tag::Meter
        | Tag::Progress => String::new(),
        tag if tag.is_block() => container(state, ctx, el),
        _ => all(state, ctx, &el.children),
    }
}

/// A generic block: its children, padded.
fn container(state: &mut State, ctx: &Context, el: &Element) -> String {
    padded_block(ctx, &all(state, ctx, &el.children))
}

fn padded_block(ctx: &Context, content: &str) -> String {
    let content = trim_block(content);
    if content.is_empty() {
        String::new()
    } else if ctx.flat() {
        format!(" {content} ")
    } else {
        format!("\n\n{content}\n\n")
    }
}

/// Trim whitespace and any hard breaks left dangling at either end.
fn trim_block(content: &str) -> &str {
    let mut s = content.trim_matches(is_ascii_ws);
    loop {
        if let Some(rest) = s.strip_prefix("\\\n") {
            s = rest.trim_start_matches(is_ascii_ws);
        } else if trailing_backslashes(s) % 2 == 1 {
            s = s[..s.len() - 1].trim_end_matches(is_ascii_ws);
        } else {
            return s;
        }
    }
}

fn trailing_backslashes(s: &str) -> usize {
    s.chars().rev().take_while(|c| *c == '\\').count()
}

fn is_ascii_ws(c: char) -> bool {
    c.is_ascii_whitespace()
}

fn line_break(ctx: &Context) -> String {
    if ctx.flat() {
        " ".to_string()
    } else if ctx.preformatted {
        "\n".to_string()
    } else {
        "\\\n".to_string()
    }
}

fn heading(state: &mut State, ctx: &Context, el: &Element, tag: Tag) -> String {
    let level = tag.heading_level().unwrap_or(1);
    let content = single_line(&all(state, &ctx.inline_only(), &el.children));
    if content.is_empty() {
        String::new()
    } else if ctx.flat() {
        format!(" {content} ")
    } else {
        format!("\n\n{} {content}\n\n", "#".repeat(level))
    }
}

fn blockquote(state: &mut State, ctx: &Context, el: &Element) -> String {
    let content = all(state, &ctx.blockquote(), &el.children);
    let content = collapse_blank_lines(trim_block(&content));
    if content.is_empty() {
        return String::new();
    }
    if ctx.flat() {
        return format!(" {} ", single_line(&content));
    }
    let quoted: Vec<String> = content
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn list(state: &mut State, ctx: &Context, el: &Element, ordered: bool) -> String {
    let count = el.child_elements().filter(|c| c.tag == "li").count();
    let reversed = ordered && el.has_attr("reversed");
    let mut counter: i64 = el
        .attr("start")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(if reversed { count as i64 } else { 1 });

    let mut items: Vec<String> = Vec::new();
    let mut last_indent = ctx.indent.clone();
    for child in &el.children {
        let Node::Element(item) = child else {
            continue;
        };
        let tag = Tag::from_name(&item.tag);
        if tag == Tag::Li {
            if ordered {
                if let Some(value) = item.attr("value").and_then(|v| v.trim().parse().ok()) {
                    counter = value;
                }
            }
            let marker = if ordered {
                format!("{counter}.")
            } else {
                ctx.config.bullet.to_string()
            };
            let (rendered, indent) = list_item(state, ctx, item, &marker);
            items.push(rendered);
            last_indent = indent;
            if ordered {
                counter = counter.saturating_add(if reversed { -1 } else { 1 });
            }
        } else if tag.is_list() && !ctx.flat() {
            // A list directly inside a list belongs to the preceding item.
            let nested = element(state, &ctx.nested_list(last_indent.clone()), item);
            let nested = nested.trim_matches('\n');
            if nested.is_empty() {
                continue;
            }
            match items.last_mut() {
                Some(last) => {
                    last.push('\n');
                    last.push_str(nested);
                }
                None => items.push(nested.to_string()),
            }
        } else {
            let content = collapse_blank_lines(trim_block(&one(state, &ctx.list_item(), child)));
            if content.is_empty() {
                continue;
            }
            let indented = indent_lines(&content, &last_indent);
            match items.last_mut() {
                Some(last) => {
                    last.push('\n');
                    last.push_str(&indented);
                }
                None => items.push(indented),
            }
        }
    }

    if ctx.flat() {
        let flat: Vec<String> = items.iter().map(|item| single_line(item)).collect();
        return format!(" {} ", flat.join(" "));
    }
    let body = items.join("\n");
    if body.trim().is_empty() {
        String::new()
    } else if ctx.in_list {
        body
    } else {
        format!("\n\n{body}\n\n")
    }
}

enum ItemPiece {
    Body(String),
    Nested(String),
}

/// Render one `<li>`. Returns the item and the indentation its
/// continuation lines use.
fn list_item(state: &mut State, ctx: &Context, li: &Element, marker: &str) -> (String, String) {
    let item_indent = format!("{}{}", ctx.indent, " ".repeat(marker.chars().count() + 1));
    if ctx.flat() {
        let content = all(state, ctx, &li.children);
        return (single_line(&content), item_indent);
    }

    let body_ctx = ctx.list_item();
    let mut pieces = Vec::new();
    let mut run_start = 0;
    for (i, child) in li.children.iter().enumerate() {
        let Some(nested) = child
            .as_element()
            .filter(|c| Tag::from_name(&c.tag).is_list())
        else {
            continue;
        };
        pieces.push(item_body(state, &body_ctx, &li.children[run_start..i]));
        let rendered = element(state, &ctx.nested_list(item_indent.clone()), nested);
        pieces.push(ItemPiece::Nested(rendered.trim_matches('\n').to_string()));
        run_start = i + 1;
    }
    pieces.push(item_body(state, &body_ctx, &li.children[run_start..]));

    let mut out = format!("{}{}", ctx.indent, marker);
    let mut started = false;
    for piece in pieces {
        match piece {
            ItemPiece::Body(text) if text.is_empty() => {}
            ItemPiece::Body(text) => {
                let (first, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
                if started {
                    out.push('\n');
                    out.push_str(&indent_lines(first, &item_indent));
                } else {
                    out.push(' ');
                    out.push_str(first);
                }
                if !rest.is_empty() {
                    out.push('\n');
                    out.push_str(&indent_lines(rest, &item_indent));
                }
                started = true;
            }
            ItemPiece::Nested(text) if text.is_empty() => {}
            ItemPiece::Nested(text) => {
                out.push('\n');
                out.push_str(&text);
                started = true;
            }
        }
    }
    (out, item_indent)
}

fn item_body(state: &mut State, ctx: &Context, nodes: &[Node]) -> ItemPiece {
    let content = all(state, ctx, nodes);
    ItemPiece::Body(collapse_blank_lines(trim_block(&content)))
}

/// Prefix every non-empty line.
fn indent_lines(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pre(state: &mut State, ctx: &Context, el: &Element) -> String {
    if ctx.flat() {
        return code_span(&collapse_spaces(&el.text_content()));
    }

    let has_links = el.has_descendant(&|d| {
        d.tag == "a" && d.has_attr("href") && !d.text_content().trim().is_empty()
    });
    if has_links {
        // Fencing would lose the links; keep the layout with hard breaks.
        let content = all(state, &ctx.preformatted(), &el.children);
        let lines: Vec<String> = content
            .trim_matches('\n')
            .split('\n')
            .map(keep_indent)
            .collect();
        return padded_block(ctx, &lines.join("\\\n"));
    }

    let code = el.text_content();
    let code = code.trim_end_matches(['\n', '\r']);
    if code.trim().is_empty() {
        return String::new();
    }
    let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
    format!("\n\n{fence}{}\n{code}\n{fence}\n\n", code_language(el))
}

/// Leading spaces would be eaten by Markdown; make them non-breaking.
fn keep_indent(line: &str) -> String {
    let rest = line.trim_start_matches(' ');
    let depth = line.len() - rest.len();
    format!("{}{rest}", "\u{a0}".repeat(depth))
}

/// Language from a `syntax` attribute or a `language-*` / `lang-*` class.
fn code_language(pre: &Element) -> String {
    if let Some(syntax) = pre.attr("syntax").map(str::trim).filter(|s| !s.is_empty()) {
        return syntax.to_string();
    }
    let code = pre.child_elements().find(|c| c.tag == "code");
    code.into_iter()
        .chain(std::iter::once(pre))
        .flat_map(Element::class_list)
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
                .filter(|lang| !lang.is_empty())
        })
        .unwrap_or("")
        .to_string()
}

fn inline_code(state: &mut State, ctx: &Context, el: &Element) -> String {
    // Inside a `<pre>` that keeps its links, code is plain layout.
    if ctx.preformatted {
        return all(state, ctx, &el.children);
    }
    code_span(&collapse_spaces(&el.text_content()))
}

fn code_span(text: &str) -> String {
    if text.trim().is_empty() {
        return if text.is_empty() { String::new() } else { " ".to_string() };
    }
    let ticks = "`".repeat(longest_backtick_run(text) + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') { " " } else { "" };
    format!("{ticks}{pad}{text}{pad}{ticks}")
}

fn longest_backtick_run(s: &str) -> usize {
    let mut max = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == '`' {
            current += 1;
            max = max.max(current);
        } else {
            current = 0;
        }
    }
    max
}

fn is_edge(c: char) -> bool {
    c.is_ascii_whitespace() || c == LINK_START || c == LINK_END
}

/// Wrap content in an inline marker, keeping edge whitespace outside it.
fn wrap_inline(content: &str, marker: &str) -> String {
    let core = content.trim_matches(is_edge);
    if core.is_empty() {
        return if content.is_empty() { String::new() } else { " ".to_string() };
    }
    let lead = &content[..content.len() - content.trim_start_matches(is_edge).len()];
    let trail = &content[content.trim_end_matches(is_edge).len()..];
    format!("{lead}{marker}{core}{marker}{trail}")
}

fn wrap_inline_html(tag: &str, attrs: &[(&str, &str)], content: &str) -> String {
    let core = content.trim_matches(is_edge);
    if core.is_empty() {
        return content.to_string();
    }
    let lead = &content[..content.len() - content.trim_start_matches(is_edge).len()];
    let trail = &content[content.trim_end_matches(is_edge).len()..];
    format!("{lead}{}{trail}", wrap_html(tag, attrs, core))
}

fn wrap_html(tag: &str, attrs: &[(&str, &str)], inner: &str) -> String {
    html::element_with_attrs(tag, attrs, inner)
}

fn link(state: &mut State, ctx: &Context, el: &Element) -> String {
    let content = all(state, &ctx.link(), &el.children);
    if ctx.in_link {
        return content;
    }
    let href = el.attr("href").map(str::trim).unwrap_or("");
    if href.is_empty() || html::is_script_url(href) {
        return content;
    }

    let text = single_line(&content);
    if text.is_empty() {
        return if content.is_empty() { String::new() } else { " ".to_string() };
    }
    let url = encode_destination(&state.resolve(href));
    let title = match el.attr("title").map(collapse_spaces) {
        Some(title) if !title.trim().is_empty() => format!(" \"{}\"", escape_title(title.trim())),
        _ => String::new(),
    };

    let mut out = String::new();
    if content.starts_with(is_ascii_ws) {
        out.push(LINK_START);
    }
    out.push_str(&format!("[{text}]({url}{title})"));
    if content.ends_with(is_ascii_ws) {
        out.push(LINK_END);
    }
    out
}

fn table(state: &mut State, ctx: &Context, el: &Element) -> String {
    if ctx.flat() {
        // Nested tables flatten into the enclosing cell.
        return padded_block(ctx, &all(state, ctx, &el.children));
    }

    let mut out = String::new();
    let caption = el
        .child_elements()
        .find(|c| c.tag == "caption")
        .map(|c| single_line(&all(state, &ctx.inline_only(), &c.children)))
        .filter(|c| !c.is_empty());
    if let Some(caption) = caption {
        out.push_str(&format!("\n\n{caption}\n\n"));
    }

    let grid = table::build_grid(el);
    if grid.is_empty() {
        return out;
    }
    let cell_ctx = ctx.table_cell();
    let rendered = table::markdown::render(&grid, |cell| all(state, &cell_ctx, &cell.children));
    out.push_str("\n\n");
    out.push_str(rendered.trim_end_matches('\n'));
    out.push_str("\n\n");
    out
}

fn definition_term(state: &mut State, ctx: &Context, el: &Element) -> String {
    let content = single_line(&all(state, &ctx.inline_only(), &el.children));
    if content.is_empty() {
        String::new()
    } else if ctx.flat() {
        format!(" {content} ")
    } else {
        format!("\n\n{content}\n")
    }
}

fn definition(state: &mut State, ctx: &Context, el: &Element) -> String {
    let content = collapse_blank_lines(trim_block(&all(state, &ctx.list_item(), &el.children)));
    if content.is_empty() {
        return String::new();
    }
    if ctx.flat() {
        return format!(" {} ", single_line(&content));
    }
    let (first, rest) = content.split_once('\n').unwrap_or((content.as_str(), ""));
    let mut out = format!(": {first}");
    if !rest.is_empty() {
        out.push('\n');
        out.push_str(&indent_lines(rest, "  "));
    }
    out.push('\n');
    out
}

fn details(state: &mut State, ctx: &Context, el: &Element) -> String {
    let content = all(state, ctx, &el.children);
    let content = collapse_blank_lines(trim_block(&content));
    if ctx.flat() {
        return padded_block(ctx, &content);
    }
    let open = if el.has_attr("open") { " open" } else { "" };
    format!("\n\n<details{open}>\n\n{content}\n\n</details>\n\n")
}

fn input(el: &Element) -> String {
    let kind = el.attr("type").unwrap_or("").trim().to_ascii_lowercase();
    match kind.as_str() {
        "checkbox" | "radio" if el.has_attr("checked") => "[x] ".to_string(),
        "checkbox" | "radio" => "[ ] ".to_string(),
        _ => String::new(),
    }
}

fn select(ctx: &Context, el: &Element) -> String {
    let options: Vec<&Element> = el
        .child_elements()
        .flat_map(|child| match child.tag.as_str() {
            "option" => vec![child],
            "optgroup" => child.child_elements().filter(|o| o.tag == "option").collect(),
            _ => Vec::new(),
        })
        .collect();
    let chosen = options
        .iter()
        .find(|o| o.has_attr("selected"))
        .or(options.first());
    match chosen {
        Some(option) => ctx
            .config
            .escaper
            .escape(collapse_spaces(&option.text_content()).trim()),
        None => String::new(),
    }
}

/// Collapse runs of ASCII whitespace to one space, without trimming.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Flatten converted content to a single trimmed line.
fn single_line(content: &str) -> String {
    let joined = content.replace("\\\n", " ");
    collapse_spaces(&joined).trim().to_string()
}
