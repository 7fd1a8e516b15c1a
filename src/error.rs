/// Errors that can occur during conversion.
///
/// Malformed input never produces an error; only a caller asking for an
/// output format the engine does not know about does.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown output format: {0:?} (expected markdown, markdown-with-html, html, csv or json)")]
    UnknownFormat(String),
}
