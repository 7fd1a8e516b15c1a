// Fixture tests: input/output pairs under test-fixtures/.
//
// Each fixture directory contains:
//   index.html: HTML input
//   index.md: expected output (index.csv for csv fixtures)
//   index.json: optional options
//
// These tests run the full pipeline: HTML string → tree → output string.

mod common;

use pretty_assertions::assert_eq;

fn fixture_test(name: &str) {
    let f = common::load_fixture(name);
    let node = markclip::dom::parse_fragment(&f.html);
    let result = markclip::convert_with(&node, &f.format, &f.options).unwrap();
    assert_eq!(result, f.expected, "fixture: {}", name);
}

#[test]
fn fixture_article() { fixture_test("article"); }

#[test]
fn fixture_brackets_escaped() { fixture_test("brackets-escaped"); }

#[test]
fn fixture_hidden() { fixture_test("hidden"); }

#[test]
fn fixture_hybrid_media() { fixture_test("hybrid-media"); }

#[test]
fn fixture_nested_lists() { fixture_test("nested-lists"); }

#[test]
fn fixture_omit_nav_footer() { fixture_test("omit-nav-footer"); }

#[test]
fn fixture_pre_code() { fixture_test("pre-code"); }

#[test]
fn fixture_table_csv() { fixture_test("table-csv"); }

#[test]
fn fixture_table_rowspan() { fixture_test("table-rowspan"); }

#[test]
fn fixture_youtube_thumbnail() { fixture_test("youtube-thumbnail"); }
