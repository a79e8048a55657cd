use crate::fragment::context::{DEFAULT_CONTEXT_CHARS, DEFAULT_CONTEXT_WORDS};
use crate::fragment::matcher::DEFAULT_PROXIMITY_WINDOW;
use crate::fragment::{ContextExtractor, FragmentMatcher};

/// Tunable constants of the anchoring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorConfig {
    /// Chars of slack allowed between a prefix/suffix and the match.
    pub proximity_window: usize,
    /// Chars of text considered on each side of a selection.
    pub context_max_chars: usize,
    /// Words kept from that text.
    pub context_max_words: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            proximity_window: DEFAULT_PROXIMITY_WINDOW,
            context_max_chars: DEFAULT_CONTEXT_CHARS,
            context_max_words: DEFAULT_CONTEXT_WORDS,
        }
    }
}

impl AnchorConfig {
    pub fn with_proximity_window(mut self, chars: usize) -> Self {
        self.proximity_window = chars;
        self
    }

    /// Zero is clamped to 1; context must stay finite and non-empty.
    pub fn with_context_limits(mut self, max_chars: usize, max_words: usize) -> Self {
        self.context_max_chars = max_chars.max(1);
        self.context_max_words = max_words.max(1);
        self
    }

    pub fn matcher(&self) -> FragmentMatcher {
        FragmentMatcher::new(self.proximity_window)
    }

    pub fn context_extractor(&self) -> ContextExtractor {
        ContextExtractor::new(self.context_max_chars, self.context_max_words)
    }
}
