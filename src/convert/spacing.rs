// Output post-pass.
//
// Link spacing cannot be decided while a link is converted: whether the
// whitespace that sat inside its source content must survive depends on the
// text around it, which is only known once the paragraph is assembled. Links
// are emitted with sentinel code points marking that whitespace, and a small
// set of ordered rewrites over the finished text resolves them.

use std::sync::LazyLock;

use regex::Regex;

/// Whitespace stood at the start of a link's content.
pub(crate) const LINK_START: char = '\u{E000}';
/// Whitespace stood at the end of a link's content.
pub(crate) const LINK_END: char = '\u{E001}';

static SPACE_BEFORE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s(\[\u{E000}\u{E001}])\u{E000}").expect("valid regex"));
static SPACE_AFTER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\u{E001}([^\s.,;:!?)\]\u{E000}\u{E001}])").expect("valid regex")
});

/// Final cleanup applied to every Markdown conversion.
pub(crate) fn finish(raw: &str) -> String {
    let text = resolve_link_sentinels(raw);
    let text = collapse_blank_lines(&text);
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    format!("{text}\n")
}

/// Turn link sentinels into a single space where the neighbouring text
/// would otherwise run into the link, and drop them everywhere else.
pub(crate) fn resolve_link_sentinels(text: &str) -> String {
    if !text.contains([LINK_START, LINK_END]) {
        return text.to_string();
    }
    let text = SPACE_BEFORE_LINK.replace_all(text, "$1 ");
    let text = SPACE_AFTER_LINK.replace_all(&text, " $1");
    text.replace([LINK_START, LINK_END], "")
}

/// Empty whitespace-only lines and collapse runs of blank lines into one,
/// leaving fenced code untouched.
pub(crate) fn collapse_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut previous_blank = false;

    for line in text.split('\n') {
        if let Some((marker, len)) = fence {
            if closes_fence(line, marker, len) {
                fence = None;
            }
            out.push(line);
            previous_blank = false;
            continue;
        }
        if line.trim().is_empty() {
            if !previous_blank {
                out.push("");
            }
            previous_blank = true;
            continue;
        }
        fence = opens_fence(line);
        out.push(line);
        previous_blank = false;
    }
    out.join("\n")
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn closes_fence(line: &str, marker: char, len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= len && trimmed.chars().all(|c| c == marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinels(text: &str) -> String {
        resolve_link_sentinels(&text.replace('<', "\u{E000}").replace('>', "\u{E001}"))
    }

    #[test]
    fn space_is_restored_between_words_and_links() {
        assert_eq!(sentinels("see<[here](u)>now"), "see [here](u) now");
        assert_eq!(sentinels("see <[here](u)> now"), "see [here](u) now");
    }

    #[test]
    fn sentinels_next_to_punctuation_vanish() {
        assert_eq!(sentinels("(<[x](u)>)"), "([x](u))");
        assert_eq!(sentinels("<[x](u)>."), "[x](u).");
    }

    #[test]
    fn blank_lines_collapse_outside_fences() {
        let text = "a\n\n\n  \nb\n```\n\n\n```\nc";
        assert_eq!(collapse_blank_lines(text), "a\n\nb\n```\n\n\n```\nc");
    }

    #[test]
    fn longer_fences_need_matching_close() {
        let text = "````\n```\n\n\n````\n\n\nx";
        assert_eq!(collapse_blank_lines(text), "````\n```\n\n\n````\n\nx");
    }

    #[test]
    fn finish_trims_and_terminates() {
        assert_eq!(finish("\n\n# T\n\n\n\nbody\n\n"), "# T\n\nbody\n");
        assert_eq!(finish(" \n\n "), "");
    }
}
