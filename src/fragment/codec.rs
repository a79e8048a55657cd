//! TextLocator codec.
//!
//! Locator grammar (a superset of the Text Fragments `text=` directive):
//!
//! ```text
//! directive := [prefix "-,"] start ["," end] [",-" suffix]
//! ```
//!
//! Every component is percent-encoded for a URL fragment, and a literal
//! `-` is always written as `%2D` so it cannot collide with the `-,` and
//! `,-` delimiters.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{SurroundingContext, TextDirective};
use crate::error::DirectiveError;

/// Prefixes a stored locator may carry in front of the directive body.
const DIRECTIVE_PREFIXES: &[&str] = &["#:~:text=", ":~:text=", "text="];

/// `encodeURIComponent` leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` alone.
/// `-` stays in the set here so it comes out as `%2D`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one locator component, dashes included.
pub fn percent_encode_dash(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn percent_decode(s: &str, component: &'static str) -> Result<String, DirectiveError> {
    percent_decode_str(s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|source| DirectiveError::InvalidEncoding { component, source })
}

/// Remove a leading `#:~:text=` (or shorter form) if present.
pub fn strip_directive_prefix(locator: &str) -> &str {
    DIRECTIVE_PREFIXES
        .iter()
        .find_map(|p| locator.strip_prefix(p))
        .unwrap_or(locator)
}

/// Build a locator for `selected_text`, adding whatever context is non-empty.
pub fn encode(selected_text: &str, context: &SurroundingContext) -> String {
    TextDirective::exact(selected_text)
        .with_prefix(context.prefix.as_str())
        .with_suffix(context.suffix.as_str())
        .to_string()
}

/// Decode a locator string into a directive.
pub fn decode(locator: &str) -> Result<TextDirective, DirectiveError> {
    let mut rest = strip_directive_prefix(locator);
    if rest.is_empty() {
        return Err(DirectiveError::Empty);
    }

    let mut prefix = None;
    if let Some(pos) = rest.find("-,") {
        prefix = Some(percent_decode(&rest[..pos], "prefix")?);
        rest = &rest[pos + 2..];
    }

    let mut suffix = None;
    if let Some(pos) = rest.rfind(",-") {
        suffix = Some(percent_decode(&rest[pos + 2..], "suffix")?);
        rest = &rest[..pos];
    }

    let mut parts = rest.split(',');
    let start = percent_decode(parts.next().unwrap_or_default(), "start")?;
    let end = match parts.next().filter(|p| !p.is_empty()) {
        Some(raw) => Some(percent_decode(raw, "end")?),
        None => None,
    };

    if start.is_empty() {
        return Err(DirectiveError::MissingStart);
    }

    Ok(TextDirective {
        prefix: prefix.filter(|p| !p.is_empty()),
        start,
        end,
        suffix: suffix.filter(|s| !s.is_empty()),
    })
}

/// Human-readable form of a stored locator, for link lists.
///
/// Falls back to the plain percent-decoded body when the locator does not
/// decode as a directive.
pub fn display_text(locator: &str) -> String {
    match decode(locator) {
        Ok(TextDirective { start, end: Some(end), .. }) => format!("{start}…{end}"),
        Ok(directive) => directive.start,
        Err(_) => percent_decode_str(strip_directive_prefix(locator))
            .decode_utf8_lossy()
            .into_owned(),
    }
}
