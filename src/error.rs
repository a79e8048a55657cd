use std::str::Utf8Error;

use crate::net::fetch::FetchError;

/// Why a locator string could not be decoded into a directive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("empty text directive")]
    Empty,
    #[error("text directive has no start text")]
    MissingStart,
    #[error("invalid percent-encoding in {component}: {source}")]
    InvalidEncoding {
        component: &'static str,
        #[source]
        source: Utf8Error,
    },
}

/// Errors surfaced by the anchoring pipeline.
///
/// "No match" is never an error; lookups return `None` for that.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("range does not resolve against the document")]
    InvalidRange,
    #[error("selection is empty")]
    EmptySelection,
}
