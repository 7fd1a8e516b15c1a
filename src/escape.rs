// Markdown escaping for text content.
//
// Escaping runs once per text node, before any Markdown syntax is assembled
// around it, so link and image brackets built by the converter are never
// touched by bracket substitution.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// How literal `[` and `]` in text are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BracketMode {
    /// `⦋` / `⦌`, reads like a bracket without being link syntax (default).
    #[default]
    Underlined,
    /// `\[` / `\]`.
    Escaped,
    /// Left as-is.
    Original,
}

impl FromStr for BracketMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "underlined" => Ok(BracketMode::Underlined),
            "escaped" => Ok(BracketMode::Escaped),
            "original" => Ok(BracketMode::Original),
            other => Err(other.to_string()),
        }
    }
}

/// Characters escaped wherever they appear.
const ALWAYS_ESCAPED: &[char] = &['\\', '#', '_', '*', '`', '~', '|', '<'];

// Block markers only matter at the start of a line.
static LINE_START_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)([>=+\-])").expect("valid regex"));
static LINE_START_ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)(\d+)\.([ \t]|$)").expect("valid regex"));

/// Text escaper bound to a bracket substitution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Escaper {
    brackets: BracketMode,
}

impl Escaper {
    pub fn new(brackets: BracketMode) -> Self {
        Self { brackets }
    }

    pub fn brackets(&self) -> BracketMode {
        self.brackets
    }

    /// Escape a run of text for Markdown output.
    pub fn escape(&self, text: &str) -> String {
        escape(text, self.brackets)
    }
}

/// Escape Markdown-significant characters in `text`, substituting square
/// brackets according to `brackets`.
pub fn escape(text: &str, brackets: BracketMode) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '[' | ']' => match brackets {
                BracketMode::Underlined => out.push(if c == '[' { '⦋' } else { '⦌' }),
                BracketMode::Escaped => {
                    out.push('\\');
                    out.push(c);
                }
                BracketMode::Original => out.push(c),
            },
            c if ALWAYS_ESCAPED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    if !out.contains(['>', '=', '+', '-', '.']) {
        return out;
    }
    let out = LINE_START_MARKER.replace_all(&out, "${1}\\${2}");
    LINE_START_ORDERED
        .replace_all(&out, "${1}${2}\\.${3}")
        .into_owned()
}

/// Escape image alt text so it cannot close the `![...]` label early.
pub fn escape_alt(alt: &str) -> String {
    let mut out = String::with_capacity(alt.len());
    for c in alt.chars() {
        if matches!(c, '\\' | '[' | ']' | '*' | '_' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a link or image title for use inside double quotes.
pub fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Make a URL safe as an inline link destination.
pub fn encode_destination(url: &str) -> String {
    url.replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
        .replace('<', "%3C")
        .replace('>', "%3E")
}
