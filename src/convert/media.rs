// Embedded media: images, video, audio, frames and plugin objects.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::context::{Context, State};
use super::html;
use crate::dom::Element;
use crate::escape::{encode_destination, escape_alt, escape_title};

/// How YouTube embeds are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YoutubePolicy {
    /// A plain link to the watch page (default).
    #[default]
    Link,
    /// The video thumbnail, linked to the watch page.
    Thumbnail,
    /// The `<iframe>` itself in `markdown-with-html`; a link otherwise.
    Embed,
}

impl FromStr for YoutubePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "link" => Ok(YoutubePolicy::Link),
            "thumbnail" => Ok(YoutubePolicy::Thumbnail),
            "embed" => Ok(YoutubePolicy::Embed),
            other => Err(other.to_string()),
        }
    }
}

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?:)?//(?:www\.|m\.)?(?:youtube(?:-nocookie)?\.com/(?:embed/|v/|shorts/|watch\?(?:.*&)?v=)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("valid regex")
});

/// Extract the video id from a YouTube URL.
pub(crate) fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn image(state: &State, el: &Element) -> String {
    if is_tracking_pixel(el) {
        return String::new();
    }
    let Some(src) = source_url(state, el) else {
        return String::new();
    };
    let alt = el.attr("alt").map(collapse).unwrap_or_default();
    format!(
        "![{}]({}{})",
        escape_alt(&alt),
        encode_destination(&src),
        title_suffix(el)
    )
}

pub(crate) fn video(state: &State, ctx: &Context, el: &Element) -> String {
    let src = source_url(state, el);
    let poster = el
        .attr("poster")
        .filter(|p| !p.trim().is_empty())
        .map(|p| state.resolve(p));

    if ctx.config.hybrid {
        let mut attrs = Vec::new();
        if let Some(src) = &src {
            attrs.push(("src", src.as_str()));
        }
        if let Some(poster) = &poster {
            attrs.push(("poster", poster.as_str()));
        }
        attrs.push(("controls", ""));
        return html::element_with_attrs("video", &attrs, "");
    }

    let Some(src) = src else {
        return match poster {
            Some(poster) => format!("![{}]({})", escape_alt(&label(el, "Video")), encode_destination(&poster)),
            None => String::new(),
        };
    };
    let label = escape_alt(&label(el, "Video"));
    match poster {
        Some(poster) => format!(
            "[![{label}]({})]({})",
            encode_destination(&poster),
            encode_destination(&src)
        ),
        None => format!("[{label}]({})", encode_destination(&src)),
    }
}

pub(crate) fn audio(state: &State, ctx: &Context, el: &Element) -> String {
    let Some(src) = source_url(state, el) else {
        return String::new();
    };
    if ctx.config.hybrid {
        return html::element_with_attrs("audio", &[("src", src.as_str()), ("controls", "")], "");
    }
    format!("[{}]({})", escape_alt(&label(el, "Audio")), encode_destination(&src))
}

pub(crate) fn iframe(state: &State, ctx: &Context, el: &Element) -> String {
    let Some(raw) = el.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let src = state.resolve(raw);

    if let Some(id) = youtube_id(&src) {
        return youtube(ctx, el, &src, id);
    }
    if !is_web_url(&src) {
        return String::new();
    }
    let label = el
        .attr("title")
        .map(collapse)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| src.clone());
    format!("[{}]({})", escape_alt(&label), encode_destination(&src))
}

fn youtube(ctx: &Context, el: &Element, src: &str, id: &str) -> String {
    let watch = format!("https://www.youtube.com/watch?v={id}");
    let label = escape_alt(&label(el, "YouTube video"));
    match ctx.config.youtube {
        YoutubePolicy::Embed if ctx.config.hybrid => {
            let mut attrs = vec![("src", src)];
            if let Some(title) = el.attr("title").filter(|t| !t.trim().is_empty()) {
                attrs.push(("title", title));
            }
            attrs.push(("allowfullscreen", ""));
            html::element_with_attrs("iframe", &attrs, "")
        }
        YoutubePolicy::Thumbnail => {
            format!("[![{label}](https://img.youtube.com/vi/{id}/0.jpg)]({watch})")
        }
        YoutubePolicy::Link | YoutubePolicy::Embed => format!("[{label}]({watch})"),
    }
}

/// `<object data>` and `<embed src>` become plain links.
pub(crate) fn object(state: &State, el: &Element, attr: &str) -> String {
    let Some(raw) = el.attr(attr).map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let url = state.resolve(raw);
    if !is_web_url(&url) {
        return String::new();
    }
    let label = label(el, &url);
    format!("[{}]({})", escape_alt(&label), encode_destination(&url))
}

/// Pick the media URL: `src`, lazy-loading attributes, `srcset`, then
/// `<source>` children. `blob:` and `data:` URLs are only used when nothing
/// else exists, and are replaced by the page URL.
pub(crate) fn source_url(state: &State, el: &Element) -> Option<String> {
    let mut candidates: Vec<&str> = Vec::new();
    for name in ["src", "data-src", "data-original"] {
        if let Some(value) = el.attr(name) {
            candidates.push(value);
        }
    }
    if let Some(first) = el.attr("srcset").and_then(first_srcset_url) {
        candidates.push(first);
    }
    for source in el.child_elements().filter(|c| c.tag == "source") {
        if let Some(src) = source.attr("src") {
            candidates.push(src);
        }
        if let Some(first) = source.attr("srcset").and_then(first_srcset_url) {
            candidates.push(first);
        }
    }

    let candidates: Vec<&str> = candidates
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if let Some(real) = candidates.iter().find(|c| !is_opaque(c)) {
        return Some(state.resolve(real));
    }
    if candidates.is_empty() {
        return None;
    }
    state.page_url().map(|url| url.to_string())
}

fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.split_whitespace().next()
}

fn is_opaque(url: &str) -> bool {
    let lower = url.get(..5).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("blob:") || lower.starts_with("data:")
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Declared width or height of at most one pixel.
fn is_tracking_pixel(el: &Element) -> bool {
    ["width", "height"].iter().any(|name| {
        el.attr(name)
            .map(|v| v.trim().trim_end_matches("px").trim())
            .and_then(|v| v.parse::<f64>().ok())
            .is_some_and(|v| v <= 1.0)
    })
}

fn title_suffix(el: &Element) -> String {
    match el.attr("title").map(collapse).filter(|t| !t.is_empty()) {
        Some(title) => format!(" \"{}\"", escape_title(&title)),
        None => String::new(),
    }
}

fn label(el: &Element, fallback: &str) -> String {
    ["title", "aria-label", "alt"]
        .iter()
        .filter_map(|name| el.attr(name))
        .map(collapse)
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn collapse(text: &str) -> String {
    crate::table::collapse_whitespace(text)
}
