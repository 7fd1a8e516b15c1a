// Host-provided collaborators.
//
// Text-fragment generation and main-content extraction are browser features
// the engine cannot do by itself. Hosts plug them in through these traits;
// when a host has neither, conversion proceeds without them.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::dom::Node;
use crate::selection::Selection;

/// Characters escaped inside a `#:~:text=` directive. `-`, `,` and `&` are
/// directive syntax.
const TEXT_DIRECTIVE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b',')
    .add(b'-')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Outcome reported by a fragment generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStatus {
    Success,
    InvalidSelection,
    AmbiguousText,
    Timeout,
    ExecutionFailed,
}

/// A text fragment addressing the selected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub status: FragmentStatus,
    pub text_start: String,
    pub text_end: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl TextFragment {
    /// A fragment for a failed generation.
    pub fn failed(status: FragmentStatus) -> Self {
        Self {
            status,
            text_start: String::new(),
            text_end: None,
            prefix: None,
            suffix: None,
        }
    }

    /// The `text=` directive, without the `:~:` delimiter.
    pub fn directive(&self) -> String {
        let mut out = String::from("text=");
        if let Some(prefix) = non_empty(&self.prefix) {
            out.push_str(&encode(prefix));
            out.push_str("-,");
        }
        out.push_str(&encode(&self.text_start));
        if let Some(end) = non_empty(&self.text_end) {
            out.push(',');
            out.push_str(&encode(end));
        }
        if let Some(suffix) = non_empty(&self.suffix) {
            out.push_str(",-");
            out.push_str(&encode(suffix));
        }
        out
    }
}

/// Generates text fragments for a selection.
pub trait FragmentGenerator {
    fn generate_fragment(&self, selection: &Selection) -> TextFragment;
}

impl<F> FragmentGenerator for F
where
    F: Fn(&Selection) -> TextFragment,
{
    fn generate_fragment(&self, selection: &Selection) -> TextFragment {
        self(selection)
    }
}

/// Build a deep link to the selection.
///
/// Returns `None` when no generator is available or it cannot address the
/// selection. Any fragment already on `page_url` is replaced.
pub fn text_fragment_url(
    page_url: &str,
    generator: Option<&dyn FragmentGenerator>,
    selection: &Selection,
) -> Option<String> {
    let Some(generator) = generator else {
        debug!("no text fragment generator available");
        return None;
    };
    let fragment = generator.generate_fragment(selection);
    if fragment.status != FragmentStatus::Success || fragment.text_start.is_empty() {
        debug!("text fragment generation failed: {:?}", fragment.status);
        return None;
    }
    let page = page_url.split_once('#').map_or(page_url, |(page, _)| page);
    Some(format!("{page}#:~:{}", fragment.directive()))
}

/// Picks the main content out of a page.
pub trait ContentExtractor {
    /// Returns `None` when no main content could be identified.
    fn extract(&self, node: &Node) -> Option<Node>;
}

/// Narrow `node` to its main content, or return it unchanged.
pub fn extract_main_content<'a>(node: &'a Node, extractor: Option<&dyn ContentExtractor>) -> Cow<'a, Node> {
    match extractor.and_then(|e| e.extract(node)) {
        Some(content) => Cow::Owned(content),
        None => {
            debug!("converting the whole tree");
            Cow::Borrowed(node)
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, TEXT_DIRECTIVE).to_string()
}
