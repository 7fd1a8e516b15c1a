// Table grid engine.
//
// Collapses HTML rowspan/colspan into a rectangular logical grid shared by
// the Markdown, CSV, and JSON serializers. Grid positions borrow the source
// `<td>`/`<th>` elements; nothing is copied out of the tree.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::dom::Element;

/// HTML caps on span attributes.
const MAX_COLSPAN: u32 = 1000;
const MAX_ROWSPAN: u32 = 65534;

/// One position in a table grid.
#[derive(Debug, Clone, Copy)]
pub enum GridCell<'a> {
    /// A source cell. Several positions may point at the same element when it spans.
    Source(&'a Element),
    /// Synthetic empty cell: padding, holes, or a media cell's span filler.
    Empty,
}

impl<'a> GridCell<'a> {
    /// The originating `<td>`/`<th>`, if any.
    pub fn element(&self) -> Option<&'a Element> {
        match self {
            GridCell::Source(el) => Some(el),
            GridCell::Empty => None,
        }
    }

    /// Whether this position refers to exactly `el` (identity, not equality).
    pub fn is(&self, el: &Element) -> bool {
        self.element().is_some_and(|own| std::ptr::eq(own, el))
    }

    fn has_children(&self) -> bool {
        self.element().is_some_and(|el| !el.children.is_empty())
    }

    /// Text content with whitespace runs collapsed and the ends trimmed.
    pub fn text(&self) -> String {
        match self {
            GridCell::Source(el) => collapse_whitespace(&el.text_content()),
            GridCell::Empty => String::new(),
        }
    }
}

/// A rectangular, row-major table grid.
#[derive(Debug, Clone, Default)]
pub struct TableGrid<'a> {
    rows: Vec<Vec<GridCell<'a>>>,
}

impl<'a> TableGrid<'a> {
    pub fn rows(&self) -> &[Vec<GridCell<'a>>] {
        &self.rows
    }

    /// Number of columns (every row has this many).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&GridCell<'a>> {
        self.rows.get(y)?.get(x)
    }
}

/// Grid under construction; `None` marks a position not yet assigned.
type PartialGrid<'a> = Vec<Vec<Option<GridCell<'a>>>>;

/// Build the logical grid for a table.
///
/// Accepts a `<table>`, a row group (`<thead>`/`<tbody>`/`<tfoot>`), or a
/// single `<tr>`. Spans that overflow the table grow the grid.
pub fn build_grid(table: &Element) -> TableGrid<'_> {
    let mut grid: PartialGrid = Vec::new();

    for (y, tr) in collect_rows(table).into_iter().enumerate() {
        if grid.len() <= y {
            grid.resize_with(y + 1, Vec::new);
        }
        let mut x = 0;
        for cell in tr.child_elements().filter(|el| el.tag == "td" || el.tag == "th") {
            while grid[y].get(x).is_some_and(Option::is_some) {
                x += 1;
            }
            let colspan = span(cell, "colspan", MAX_COLSPAN);
            let rowspan = span(cell, "rowspan", MAX_ROWSPAN);
            let media = has_media(cell);

            for dy in 0..rowspan {
                for dx in 0..colspan {
                    let value = if media && (dx, dy) != (0, 0) {
                        GridCell::Empty
                    } else {
                        GridCell::Source(cell)
                    };
                    place(&mut grid, x + dx, y + dy, value);
                }
            }
            x += colspan;
        }
    }

    remove_empty_rows(&mut grid);
    let grid = rectangularize(grid);
    debug!("table grid {}x{}", grid.width(), grid.height());
    grid
}

/// Rows of this table in document order, not descending into nested tables.
fn collect_rows(table: &Element) -> Vec<&Element> {
    if table.tag == "tr" {
        return vec![table];
    }
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child.child_elements().filter(|el| el.tag == "tr"));
            }
            _ => {}
        }
    }
    rows
}

fn span(cell: &Element, name: &str, max: u32) -> usize {
    match cell.attr_u32(name) {
        Some(0) | None => 1,
        Some(n) => n.min(max) as usize,
    }
}

fn has_media(cell: &Element) -> bool {
    cell.has_descendant(&|el| matches!(el.tag.as_str(), "img" | "svg" | "video"))
}

/// Occupy a position unless something is already there.
fn place<'a>(grid: &mut PartialGrid<'a>, x: usize, y: usize, value: GridCell<'a>) {
    if grid.len() <= y {
        grid.resize_with(y + 1, Vec::new);
    }
    let row = &mut grid[y];
    if row.len() <= x {
        row.resize(x + 1, None);
    }
    if row[x].is_none() {
        row[x] = Some(value);
    }
}

/// Drop rows with no cells, or whose cells all lack child nodes.
fn remove_empty_rows(grid: &mut PartialGrid) {
    grid.retain(|row| row.iter().flatten().any(GridCell::has_children));
}

/// Pad every row to the widest row, filling holes with empty cells.
fn rectangularize(grid: PartialGrid<'_>) -> TableGrid<'_> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut padded = grid;
    for row in padded.iter_mut() {
        row.resize(width, None);
        for slot in row.iter_mut() {
            slot.get_or_insert(GridCell::Empty);
        }
    }
    debug_assert!(
        padded.iter().flatten().all(Option::is_some),
        "unassigned grid position survived rectangularization"
    );
    let rows = padded
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.unwrap_or(GridCell::Empty)).collect())
        .collect();
    TableGrid { rows }
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
