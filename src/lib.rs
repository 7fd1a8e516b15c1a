// markclip: converts captured HTML trees into Markdown, sanitized HTML,
// CSV or JSON.
//
// Architecture:
//   host DOM → dom::Node tree → (selection extraction) → convert → String
//
// The engine never fetches or parses pages by itself; hosts hand it a tree
// (`dom::parse_document` / `dom::parse_fragment` adapt html5ever output for
// hosts that start from markup).

#[macro_use]
mod log;

pub mod convert;
pub mod dom;
mod error;
pub mod escape;
pub mod host;
pub mod selection;
pub mod settings;
pub mod table;

pub use convert::media::YoutubePolicy;
pub use convert::{convert_format, Format};
pub use dom::{Document, Element, Node};
pub use error::Error;
pub use escape::BracketMode;

/// CSV output dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: String,
    pub line_terminator: String,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            line_terminator: "\r\n".to_string(),
        }
    }
}

/// Conversion options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// URL of the captured page: the initial base URL, and the stand-in for
    /// `blob:`/`data:` media sources.
    pub page_url: Option<String>,
    /// How literal square brackets in text are written.
    pub brackets: BracketMode,
    /// Unordered list marker. Default: `'-'`.
    pub bullet: char,
    pub youtube: YoutubePolicy,
    /// Drop `<nav>` elements.
    pub omit_nav: bool,
    /// Drop `<footer>` elements (except attributions inside quotes).
    pub omit_footer: bool,
    /// Remove hidden elements before converting. Default: `true`.
    pub remove_hidden: bool,
    pub csv: CsvDialect,
    /// Emitted for empty JSON cells. Default: `null`.
    pub json_empty_cell: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_url: None,
            brackets: BracketMode::default(),
            bullet: '-',
            youtube: YoutubePolicy::default(),
            omit_nav: false,
            omit_footer: false,
            remove_hidden: true,
            csv: CsvDialect::default(),
            json_empty_cell: "null".to_string(),
        }
    }
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page URL used as the initial base.
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    /// Set the bracket substitution mode.
    pub fn with_brackets(mut self, brackets: BracketMode) -> Self {
        self.brackets = brackets;
        self
    }

    /// Set the unordered list bullet character (`-`, `*` or `+`).
    pub fn with_bullet(mut self, bullet: char) -> Self {
        self.bullet = bullet;
        self
    }

    pub fn with_youtube(mut self, policy: YoutubePolicy) -> Self {
        self.youtube = policy;
        self
    }

    pub fn with_omit_nav(mut self, omit: bool) -> Self {
        self.omit_nav = omit;
        self
    }

    pub fn with_omit_footer(mut self, omit: bool) -> Self {
        self.omit_footer = omit;
        self
    }

    pub fn with_remove_hidden(mut self, remove: bool) -> Self {
        self.remove_hidden = remove;
        self
    }

    /// Set the CSV delimiter.
    pub fn with_csv_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.csv.delimiter = delimiter.into();
        self
    }

    /// Set the CSV line terminator.
    pub fn with_csv_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.csv.line_terminator = terminator.into();
        self
    }

    /// Set the placeholder for empty JSON cells.
    pub fn with_json_empty_cell(mut self, placeholder: impl Into<String>) -> Self {
        self.json_empty_cell = placeholder.into();
        self
    }
}

/// Convert a tree using default options.
///
/// # Examples
///
/// ```
/// let node = markclip::dom::parse_fragment("<h1>Hello</h1><p>World</p>");
/// let md = markclip::convert(&node, "markdown").unwrap();
/// assert_eq!(md, "# Hello\n\nWorld\n");
/// ```
pub fn convert(node: &Node, format: &str) -> Result<String, Error> {
    convert_with(node, format, &Options::default())
}

/// Convert a tree with custom options.
///
/// Fails only when `format` names no known output format.
///
/// # Examples
///
/// ```
/// use markclip::{convert_with, Options};
///
/// let node = markclip::dom::parse_fragment("<ul><li>one</li></ul>");
/// let md = convert_with(&node, "markdown", &Options::new().with_bullet('*')).unwrap();
/// assert_eq!(md, "* one\n");
/// ```
pub fn convert_with(node: &Node, format: &str, options: &Options) -> Result<String, Error> {
    let format: Format = format.parse()?;
    Ok(convert_format(node, format, options))
}

pub fn to_markdown(node: &Node, options: &Options) -> String {
    convert_format(node, Format::Markdown, options)
}

pub fn to_markdown_with_html(node: &Node, options: &Options) -> String {
    convert_format(node, Format::MarkdownWithHtml, options)
}

pub fn to_html(node: &Node, options: &Options) -> String {
    convert_format(node, Format::Html, options)
}

pub fn to_csv(node: &Node, options: &Options) -> String {
    convert_format(node, Format::Csv, options)
}

pub fn to_json(node: &Node, options: &Options) -> String {
    convert_format(node, Format::Json, options)
}
