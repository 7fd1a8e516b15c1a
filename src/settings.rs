// Settings resolution.
//
// Hosts keep user preferences behind an asynchronous key/value store. Every
// key is looked up once, before conversion starts, and folded into an
// `Options`; the tree walk itself never waits on the store. A failed lookup
// or an unparsable value keeps the default and is only logged.

use std::collections::HashMap;
use std::future::{ready, Future};

use crate::convert::media::YoutubePolicy;
use crate::escape::BracketMode;
use crate::Options;

/// Setting keys understood by [`Options::from_settings`].
pub mod keys {
    pub const PAGE_URL: &str = "page_url";
    pub const BRACKET_MODE: &str = "bracket_mode";
    pub const BULLET_MARKER: &str = "bullet_marker";
    pub const YOUTUBE: &str = "youtube";
    pub const OMIT_NAV: &str = "omit_nav";
    pub const OMIT_FOOTER: &str = "omit_footer";
    pub const REMOVE_HIDDEN: &str = "remove_hidden";
    pub const CSV_DELIMITER: &str = "csv_delimiter";
    pub const CSV_LINE_TERMINATOR: &str = "csv_line_terminator";
    pub const JSON_EMPTY_CELL: &str = "json_empty_cell";
}

/// Why a setting could not be used.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid value {value:?} for setting {key:?}")]
    Invalid { key: String, value: String },
}

/// An asynchronous key/value settings store.
pub trait SettingsProvider {
    /// Look up a setting. `Ok(None)` means unset.
    fn get_setting(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, SettingsError>>;
}

/// In-memory settings, for hosts without a persistent store and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl SettingsProvider for MemorySettings {
    fn get_setting(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, SettingsError>> {
        ready(Ok(self.values.get(name).cloned()))
    }
}

impl Options {
    /// Resolve options from a settings store.
    ///
    /// Every key is read up front. Missing keys, store failures and invalid
    /// values all fall back to the `Options::default()` value for that key.
    pub async fn from_settings<P: SettingsProvider + ?Sized>(provider: &P) -> Options {
        let mut options = Options::default();

        if let Some(url) = lookup(provider, keys::PAGE_URL).await {
            options.page_url = Some(url);
        }
        if let Some(mode) = parsed(provider, keys::BRACKET_MODE, |v| v.parse::<BracketMode>().ok()).await {
            options.brackets = mode;
        }
        if let Some(bullet) = parsed(provider, keys::BULLET_MARKER, parse_bullet).await {
            options.bullet = bullet;
        }
        if let Some(policy) = parsed(provider, keys::YOUTUBE, |v| v.parse::<YoutubePolicy>().ok()).await {
            options.youtube = policy;
        }
        if let Some(omit) = parsed(provider, keys::OMIT_NAV, parse_bool).await {
            options.omit_nav = omit;
        }
        if let Some(omit) = parsed(provider, keys::OMIT_FOOTER, parse_bool).await {
            options.omit_footer = omit;
        }
        if let Some(remove) = parsed(provider, keys::REMOVE_HIDDEN, parse_bool).await {
            options.remove_hidden = remove;
        }
        if let Some(delimiter) = parsed(provider, keys::CSV_DELIMITER, non_empty).await {
            options.csv.delimiter = delimiter;
        }
        if let Some(terminator) = parsed(provider, keys::CSV_LINE_TERMINATOR, non_empty).await {
            options.csv.line_terminator = terminator;
        }
        if let Some(placeholder) = lookup(provider, keys::JSON_EMPTY_CELL).await {
            options.json_empty_cell = placeholder;
        }

        debug!("resolved options from settings: {:?}", options);
        options
    }
}

async fn lookup<P: SettingsProvider + ?Sized>(provider: &P, key: &str) -> Option<String> {
    match provider.get_setting(key).await {
        Ok(value) => value,
        Err(err) => {
            warn!("setting {} falls back to its default: {}", key, err);
            None
        }
    }
}

async fn parsed<P, T>(provider: &P, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    P: SettingsProvider + ?Sized,
{
    let raw = lookup(provider, key).await?;
    let value = parse(&raw);
    if value.is_none() {
        let err = SettingsError::Invalid {
            key: key.to_string(),
            value: raw,
        };
        warn!("{}; using the default", err);
    }
    value
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_bullet(value: &str) -> Option<char> {
    match value.trim() {
        "-" => Some('-'),
        "*" => Some('*'),
        "+" => Some('+'),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct BrokenStore;

    impl SettingsProvider for BrokenStore {
        fn get_setting(
            &self,
            _name: &str,
        ) -> impl Future<Output = Result<Option<String>, SettingsError>> {
            ready(Err(SettingsError::Unavailable("storage quota exceeded".into())))
        }
    }

    #[test]
    fn empty_store_gives_defaults() {
        let options = block_on(Options::from_settings(&MemorySettings::new()));
        assert_eq!(options, Options::default());
    }

    #[test]
    fn values_are_applied() {
        let store = MemorySettings::new()
            .with(keys::PAGE_URL, "https://example.com/")
            .with(keys::BRACKET_MODE, "escaped")
            .with(keys::BULLET_MARKER, "*")
            .with(keys::YOUTUBE, "thumbnail")
            .with(keys::OMIT_NAV, "true")
            .with(keys::REMOVE_HIDDEN, "false")
            .with(keys::CSV_DELIMITER, "\t")
            .with(keys::JSON_EMPTY_CELL, "\"\"");
        let options = block_on(Options::from_settings(&store));
        assert_eq!(options.page_url.as_deref(), Some("https://example.com/"));
        assert_eq!(options.brackets, BracketMode::Escaped);
        assert_eq!(options.bullet, '*');
        assert_eq!(options.youtube, YoutubePolicy::Thumbnail);
        assert!(options.omit_nav);
        assert!(!options.omit_footer);
        assert!(!options.remove_hidden);
        assert_eq!(options.csv.delimiter, "\t");
        assert_eq!(options.json_empty_cell, "\"\"");
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let store = MemorySettings::new()
            .with(keys::BULLET_MARKER, "=>")
            .with(keys::OMIT_FOOTER, "sometimes")
            .with(keys::CSV_DELIMITER, "");
        let options = block_on(Options::from_settings(&store));
        assert_eq!(options.bullet, '-');
        assert!(!options.omit_footer);
        assert_eq!(options.csv.delimiter, ",");
    }

    #[test]
    fn store_failures_keep_defaults() {
        let options = block_on(Options::from_settings(&BrokenStore));
        assert_eq!(options, Options::default());
    }
}
