// CSV serializer.

use super::TableGrid;

/// Writes table grids as delimiter-separated values.
///
/// A field is wrapped in the encapsulator only when it contains the
/// encapsulator, the delimiter, or the line terminator; embedded
/// encapsulators are doubled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvWriter {
    delimiter: String,
    line_terminator: String,
    encapsulator: char,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new(",", "\r\n")
    }
}

impl CsvWriter {
    pub fn new(delimiter: impl Into<String>, line_terminator: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            line_terminator: line_terminator.into(),
            encapsulator: '"',
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    /// Quote a single field if it needs it.
    pub fn field(&self, value: &str) -> String {
        let needs_quotes = value.contains(self.encapsulator)
            || (!self.delimiter.is_empty() && value.contains(self.delimiter.as_str()))
            || (!self.line_terminator.is_empty() && value.contains(self.line_terminator.as_str()));
        if !needs_quotes {
            return value.to_string();
        }
        let quote = self.encapsulator.to_string();
        let doubled = value.replace(self.encapsulator, &quote.repeat(2));
        format!("{quote}{doubled}{quote}")
    }

    /// One record, terminated by the line terminator.
    pub fn row<S: AsRef<str>>(&self, values: &[S]) -> String {
        let fields: Vec<String> = values.iter().map(|v| self.field(v.as_ref())).collect();
        let mut line = fields.join(&self.delimiter);
        line.push_str(&self.line_terminator);
        line
    }

    /// Every grid row as a record, using each cell's collapsed text.
    pub fn write_grid(&self, grid: &TableGrid) -> String {
        grid.rows()
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|cell| cell.text()).collect();
                self.row(&values)
            })
            .collect()
    }
}
