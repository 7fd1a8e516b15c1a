// Shared test helpers for markclip.

use std::fs;
use std::path::Path;

use markclip::Options;
use serde::Deserialize;

/// Options read from a fixture's `index.json`. Absent keys keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureConfig {
    format: Option<String>,
    page_url: Option<String>,
    brackets: Option<String>,
    bullet: Option<char>,
    youtube: Option<String>,
    omit_nav: bool,
    omit_footer: bool,
    remove_hidden: Option<bool>,
    csv_delimiter: Option<String>,
    csv_line_terminator: Option<String>,
    json_empty_cell: Option<String>,
}

pub struct Fixture {
    pub html: String,
    pub expected: String,
    pub format: String,
    pub options: Options,
}

/// Load a test fixture's input HTML, expected output, and options.
///
/// Fixture directories contain `index.html`, the expected output as
/// `index.md` (or `index.csv` for the csv format), and optionally
/// `index.json`.
pub fn load_fixture(name: &str) -> Fixture {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures").join(name);
    let html = fs::read_to_string(base.join("index.html"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.html", name));

    let config: FixtureConfig = match fs::read_to_string(base.join("index.json")) {
        Ok(json) => serde_json::from_str(&json)
            .unwrap_or_else(|err| panic!("Bad fixture options in {}: {}", name, err)),
        Err(_) => FixtureConfig::default(),
    };

    let format = config.format.clone().unwrap_or_else(|| "markdown".to_string());
    let expected_file = if format == "csv" { "index.csv" } else { "index.md" };
    let expected = fs::read_to_string(base.join(expected_file))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/{}", name, expected_file));

    Fixture {
        html,
        expected,
        format,
        options: options_from(config),
    }
}

fn options_from(config: FixtureConfig) -> Options {
    let mut options = Options::default()
        .with_omit_nav(config.omit_nav)
        .with_omit_footer(config.omit_footer);
    if let Some(url) = config.page_url {
        options = options.with_page_url(url);
    }
    if let Some(mode) = config.brackets {
        options = options.with_brackets(mode.parse().expect("bracket mode"));
    }
    if let Some(bullet) = config.bullet {
        options = options.with_bullet(bullet);
    }
    if let Some(policy) = config.youtube {
        options = options.with_youtube(policy.parse().expect("youtube policy"));
    }
    if let Some(remove) = config.remove_hidden {
        options = options.with_remove_hidden(remove);
    }
    if let Some(delimiter) = config.csv_delimiter {
        options = options.with_csv_delimiter(delimiter);
    }
    if let Some(terminator) = config.csv_line_terminator {
        options = options.with_csv_line_terminator(terminator);
    }
    if let Some(placeholder) = config.json_empty_cell {
        options = options.with_json_empty_cell(placeholder);
    }
    options
}
