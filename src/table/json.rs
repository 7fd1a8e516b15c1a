// JSON serializer.
//
// Each row becomes an object keyed by its first column, holding the remaining
// columns as an array: `[{"a": ["b"]}, {"c": ["d"]}]`. Cells after the first
// are coerced to JSON literals and numbers where they look like them.

use std::sync::LazyLock;

use regex::Regex;

use super::{GridCell, TableGrid};

/// Permissive numeric grammar: sign, digits with optional thousands
/// separators, optional fraction, optional exponent. ASCII digits only.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?([0-9]{1,3}(?:,[0-9]{3})+|[0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$")
        .expect("valid regex")
});

/// Writes table grids as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWriter {
    empty_cell: String,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new("null")
    }
}

impl JsonWriter {
    /// `empty_cell` is emitted verbatim for empty value cells, and as a
    /// string key for an empty first column.
    pub fn new(empty_cell: impl Into<String>) -> Self {
        Self {
            empty_cell: empty_cell.into(),
        }
    }

    /// The grid as a JSON array of row objects.
    pub fn write_grid(&self, grid: &TableGrid) -> String {
        format!("[{}]", self.row_objects(grid).join(", "))
    }

    /// One JSON object per grid row.
    pub fn row_objects(&self, grid: &TableGrid) -> Vec<String> {
        grid.rows().iter().map(|row| self.row_object(row)).collect()
    }

    fn row_object(&self, row: &[GridCell]) -> String {
        let Some((first, rest)) = row.split_first() else {
            return "{}".to_string();
        };
        let key = first.text();
        let key = if key.is_empty() {
            json_string(&self.empty_cell)
        } else {
            json_string(&key)
        };
        let values: Vec<String> = rest.iter().map(|cell| self.value(&cell.text())).collect();
        format!("{{{}: [{}]}}", key, values.join(", "))
    }

    /// Coerce a cell's text to a JSON value.
    pub fn value(&self, text: &str) -> String {
        if text.is_empty() {
            return self.empty_cell.clone();
        }
        if matches!(text, "true" | "false" | "null") {
            return text.to_string();
        }
        canonical_number(text).unwrap_or_else(|| json_string(text))
    }
}

/// Canonicalize a permissively formatted number into valid JSON, or `None`
/// if the text is not numeric.
///
/// `+1` → `1`, `1,000` → `1000`, `01.1` → `1.1`, `.4` → `0.4`, `2.` → `2`.
pub fn canonical_number(text: &str) -> Option<String> {
    let caps = NUMBER.captures(text)?;
    let int = caps.get(2).map_or("", |m| m.as_str());
    let frac = caps.get(3).map(|m| m.as_str());
    if int.is_empty() && frac.is_none_or(str::is_empty) {
        return None;
    }

    let mut out = String::new();
    if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        out.push('-');
    }
    let digits: String = int.chars().filter(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');
    out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
    if let Some(frac) = frac.filter(|f| !f.is_empty()) {
        out.push('.');
        out.push_str(frac);
    }
    if let Some(exp) = caps.get(4) {
        out.push('e');
        out.push_str(exp.as_str());
    }
    Some(out)
}

/// Quote text as a JSON string, collapsing whitespace runs first.
fn json_string(text: &str) -> String {
    let collapsed = super::collapse_whitespace(text);
    serde_json::Value::String(collapsed).to_string()
}
