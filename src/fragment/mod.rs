//! Text-fragment locators: the directive data model, its string codec,
//! and the matcher that re-finds a directive inside a block of text.

pub mod codec;
pub mod context;
pub mod fold;
pub mod matcher;
pub mod url;

use std::fmt;

pub use codec::{decode, display_text, encode};
pub use context::{ContextExtractor, SurroundingContext};
pub use matcher::{find_match, FragmentMatcher};

/// Decoded form of a locator: `[prefix-,]start[,end][,-suffix]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDirective {
    /// Text expected immediately (modulo whitespace) before the match.
    pub prefix: Option<String>,
    /// Always non-empty.
    pub start: String,
    /// When set, the match runs from `start` through the first `end` after it.
    pub end: Option<String>,
    /// Text expected immediately (modulo whitespace) after the match.
    pub suffix: Option<String>,
}

impl TextDirective {
    /// An exact-match directive with no context.
    pub fn exact(start: impl Into<String>) -> Self {
        Self {
            prefix: None,
            start: start.into(),
            end: None,
            suffix: None,
        }
    }

    /// A range directive covering `start` through `end`.
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            end: Some(end.into()),
            ..Self::exact(start)
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|p: &String| !p.is_empty());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }
}

/// Serializes to the locator grammar, every component dash-encoded.
impl fmt::Display for TextDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}-,", codec::percent_encode_dash(prefix))?;
        }
        write!(f, "{}", codec::percent_encode_dash(&self.start))?;
        if let Some(end) = &self.end {
            write!(f, ",{}", codec::percent_encode_dash(end))?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, ",-{}", codec::percent_encode_dash(suffix))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for TextDirective {
    type Err = crate::error::DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Byte offsets `[start, end)` into a block's concatenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    pub start: usize,
    pub end: usize,
}

impl TextMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
