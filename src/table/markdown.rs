// Markdown pipe-table serializer.

use super::{collapse_whitespace, GridCell, TableGrid};
use crate::dom::Element;

/// Render a grid as a Markdown pipe table.
///
/// `render_cell` turns a source cell into inline Markdown; its output is
/// trimmed, whitespace-collapsed and pipe-escaped here. The separator row
/// follows the first row's width, which equals the grid width once the grid
/// has been rectangularized.
pub fn render(grid: &TableGrid, mut render_cell: impl FnMut(&Element) -> String) -> String {
    let mut out = String::new();
    for (y, row) in grid.rows().iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                GridCell::Source(el) => escape_pipes(&collapse_whitespace(&render_cell(el))),
                GridCell::Empty => String::new(),
            })
            .collect();
        out.push_str(&format_row(&cells));
        if y == 0 {
            out.push_str(&format_separator(row.len()));
        }
    }
    out
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

fn format_separator(width: usize) -> String {
    format_row(&vec!["---".to_string(); width])
}

/// Escape `|` unless it is already backslash-escaped.
fn escape_pipes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0;
    for c in text.chars() {
        if c == '|' && backslashes % 2 == 0 {
            out.push('\\');
        }
        if c == '\\' {
            backslashes += 1;
        } else {
            backslashes = 0;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_fragment, Node};
    use crate::table::build_grid;
    use pretty_assertions::assert_eq;

    fn render_plain(html: &str) -> String {
        let doc = parse_fragment(html);
        let table = doc
            .children()
            .unwrap()
            .iter()
            .find_map(Node::as_element)
            .unwrap();
        render(&build_grid(table), |el| el.text_content())
    }

    #[test]
    fn header_separator_and_body() {
        let md = render_plain(
            "<table><tr><th>a</th><th>b</th></tr><tr><td>c</td><td>d</td></tr></table>",
        );
        assert_eq!(md, "| a | b |\n| --- | --- |\n| c | d |\n");
    }

    #[test]
    fn missing_cell_stays_in_its_column() {
        let md = render_plain(
            "<table><tr><th>a</th><th>b</th><th>c</th></tr>\
             <tr><td>d</td><td>e</td><td>f</td></tr>\
             <tr><td>g</td><td>h</td></tr></table>",
        );
        assert_eq!(
            md,
            "| a | b | c |\n| --- | --- | --- |\n| d | e | f |\n| g | h |  |\n"
        );
    }

    #[test]
    fn cell_whitespace_collapses_and_pipes_escape() {
        let md = render_plain("<table><tr><td>  a \n  b </td><td>x|y</td></tr></table>");
        assert_eq!(md, "| a b | x\\|y |\n| --- | --- |\n");
    }

    #[test]
    fn escaped_pipes_are_left_alone() {
        assert_eq!(escape_pipes("a\\|b"), "a\\|b");
        assert_eq!(escape_pipes("a\\\\|b"), "a\\\\\\|b");
    }
}
