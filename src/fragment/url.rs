//! Fragment directives carried in URLs: `page#anchor:~:text=a&text=b`.

use ::url::Url;

use super::codec::strip_directive_prefix;

/// Delimiter between an ordinary fragment and the fragment directive.
pub const FRAGMENT_DIRECTIVE_DELIMITER: &str = ":~:";

/// A URL with its text directives split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentUrl {
    /// The URL without the fragment directive. An ordinary `#anchor` is kept.
    pub url: Url,
    /// Raw (still percent-encoded) `text=` directive bodies, in order.
    pub directives: Vec<String>,
}

/// Parse `input` and pull out every `text=` directive in its fragment.
pub fn split_fragment_directives(input: &str) -> Result<FragmentUrl, ::url::ParseError> {
    let mut url = Url::parse(input)?;
    let mut directives = Vec::new();

    if let Some(fragment) = url.fragment().map(str::to_owned) {
        if let Some(pos) = fragment.find(FRAGMENT_DIRECTIVE_DELIMITER) {
            let anchor = &fragment[..pos];
            let directive = &fragment[pos + FRAGMENT_DIRECTIVE_DELIMITER.len()..];
            directives = directive
                .split('&')
                .filter_map(|d| d.strip_prefix("text="))
                .filter(|d| !d.is_empty())
                .map(str::to_owned)
                .collect();
            url.set_fragment(Some(anchor).filter(|a| !a.is_empty()));
        }
    }

    Ok(FragmentUrl { url, directives })
}

/// Append a `text=` directive for `locator` to `url`.
pub fn with_text_directive(url: &Url, locator: &str) -> Url {
    let body = strip_directive_prefix(locator);
    let fragment = match url.fragment() {
        Some(f) if f.contains(FRAGMENT_DIRECTIVE_DELIMITER) => format!("{f}&text={body}"),
        Some(f) => format!("{f}{FRAGMENT_DIRECTIVE_DELIMITER}text={body}"),
        None => format!("{FRAGMENT_DIRECTIVE_DELIMITER}text={body}"),
    };
    let mut out = url.clone();
    out.set_fragment(Some(&fragment));
    out
}
