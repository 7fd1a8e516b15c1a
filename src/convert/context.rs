// Conversion context.
//
// `Config` is resolved once per call from `Options`. `Context` is an
// immutable per-node value: handlers derive a modified copy for their
// children and never touch the one their siblings see. `State` carries the
// single piece of ambient data, the base URL, which `<base>` elements update
// for everything visited after them.

use url::Url;

use crate::convert::media::YoutubePolicy;
use crate::escape::Escaper;
use crate::Options;

/// Per-call settings shared by every handler.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub escaper: Escaper,
    pub bullet: char,
    pub youtube: YoutubePolicy,
    pub omit_nav: bool,
    pub omit_footer: bool,
    /// Emit HTML for constructs Markdown cannot express.
    pub hybrid: bool,
}

impl Config {
    pub(crate) fn new(options: &Options, hybrid: bool) -> Self {
        Self {
            escaper: Escaper::new(options.brackets),
            bullet: options.bullet,
            youtube: options.youtube,
            omit_nav: options.omit_nav,
            omit_footer: options.omit_footer,
            hybrid,
        }
    }
}

/// Ambient state threaded forward through the walk in document order.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    base_url: Option<Url>,
    page_url: Option<Url>,
}

impl State {
    pub(crate) fn new(page_url: Option<&str>) -> Self {
        let page_url = page_url.and_then(|raw| Url::parse(raw.trim()).ok());
        Self {
            base_url: page_url.clone(),
            page_url,
        }
    }

    /// Resolve a possibly relative URL against the current base URL.
    pub(crate) fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if let Some(base) = &self.base_url {
            if let Ok(resolved) = base.join(raw) {
                return resolved.to_string();
            }
        }
        raw.to_string()
    }

    /// Apply a `<base href>`: it is resolved against the current base and
    /// replaces it.
    pub(crate) fn set_base(&mut self, href: &str) {
        let href = href.trim();
        if href.is_empty() {
            return;
        }
        let next = match &self.base_url {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        };
        if let Some(next) = next {
            debug!("base url is now {}", next);
            self.base_url = Some(next);
        }
    }

    pub(crate) fn page_url(&self) -> Option<&Url> {
        self.page_url.as_ref()
    }
}

/// Immutable per-node conversion flags.
#[derive(Debug, Clone)]
pub(crate) struct Context<'a> {
    pub config: &'a Config,
    /// Prefix for list lines rendered at this depth.
    pub indent: String,
    pub in_list: bool,
    pub in_table: bool,
    pub in_blockquote: bool,
    pub in_link: bool,
    pub in_em: bool,
    pub in_strong: bool,
    pub in_s: bool,
    /// Whitespace is significant (inside `<pre>`).
    pub preformatted: bool,
    /// Blocks render as inline runs (inside links, headings).
    pub dont_trim_text: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(config: &'a Config) -> Self {
        Self {
            config,
            indent: String::new(),
            in_list: false,
            in_table: false,
            in_blockquote: false,
            in_link: false,
            in_em: false,
            in_strong: false,
            in_s: false,
            preformatted: false,
            dont_trim_text: false,
        }
    }

    /// Whether block constructs must collapse onto a single line.
    pub(crate) fn flat(&self) -> bool {
        self.in_table || self.dont_trim_text
    }

    pub(crate) fn em(&self) -> Self {
        Self {
            in_em: true,
            ..self.clone()
        }
    }

    pub(crate) fn strong(&self) -> Self {
        Self {
            in_strong: true,
            ..self.clone()
        }
    }

    pub(crate) fn strikethrough(&self) -> Self {
        Self {
            in_s: true,
            ..self.clone()
        }
    }

    pub(crate) fn link(&self) -> Self {
        Self {
            in_link: true,
            dont_trim_text: true,
            ..self.clone()
        }
    }

    pub(crate) fn inline_only(&self) -> Self {
        Self {
            dont_trim_text: true,
            ..self.clone()
        }
    }

    pub(crate) fn table_cell(&self) -> Self {
        Self {
            in_table: true,
            ..self.clone()
        }
    }

    pub(crate) fn blockquote(&self) -> Self {
        Self {
            in_blockquote: true,
            indent: String::new(),
            ..self.clone()
        }
    }

    /// Content of a list item; indentation is applied afterwards by the list.
    pub(crate) fn list_item(&self) -> Self {
        Self {
            in_list: true,
            indent: String::new(),
            ..self.clone()
        }
    }

    /// A list nested directly in an item, rendered at `indent`.
    pub(crate) fn nested_list(&self, indent: String) -> Self {
        Self {
            in_list: true,
            indent,
            ..self.clone()
        }
    }

    pub(crate) fn preformatted(&self) -> Self {
        Self {
            preformatted: true,
            ..self.clone()
        }
    }
}
