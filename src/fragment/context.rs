//! Context extraction at capture time.
//!
//! A few words on either side of a selection are enough to tell repeated
//! phrases apart without bloating the locator.

use crate::dom::blocks::containing_block;
use crate::dom::range::ResolvedRange;
use crate::dom::DocumentTree;

pub const DEFAULT_CONTEXT_CHARS: usize = 20;
pub const DEFAULT_CONTEXT_WORDS: usize = 3;

/// Short text immediately before and after a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurroundingContext {
    pub prefix: String,
    pub suffix: String,
}

impl SurroundingContext {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextExtractor {
    max_chars: usize,
    max_words: usize,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CHARS, DEFAULT_CONTEXT_WORDS)
    }
}

impl ContextExtractor {
    /// Both caps are clamped to at least 1.
    pub fn new(max_chars: usize, max_words: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            max_words: max_words.max(1),
        }
    }

    /// Derive context for `selected_text` from the block that contains the
    /// selection start.
    ///
    /// Only the block's searchable text is used, so the context is exactly
    /// what the matcher will see. The selection's own position in that text
    /// is preferred; otherwise the first occurrence of the selected text.
    /// Absent text yields empty context.
    pub fn extract<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        selected_text: &str,
        selection: &ResolvedRange<D::NodeId>,
    ) -> SurroundingContext {
        let block = containing_block(doc, &selection.start_node);

        let at_selection = block
            .segments
            .iter()
            .find(|seg| seg.node == selection.start_node)
            .map(|seg| seg.start + selection.start_offset)
            .filter(|&pos| block.text.get(pos..).map_or(false, |t| t.starts_with(selected_text)));
        match at_selection.or_else(|| block.text.find(selected_text)) {
            Some(pos) => self.context_at(&block.text, pos, pos + selected_text.len()),
            None => SurroundingContext::default(),
        }
    }

    /// Context around the byte span `[start, end)` of `text`. Offsets that
    /// are out of range or not on a char boundary give empty context.
    pub fn context_at(&self, text: &str, start: usize, end: usize) -> SurroundingContext {
        let (Some(before), Some(after)) = (text.get(..start), text.get(end..)) else {
            return SurroundingContext::default();
        };

        let before_chars = before.chars().count();
        let window: String = before.chars().skip(before_chars.saturating_sub(self.max_chars)).collect();
        let words: Vec<&str> = window.split_whitespace().collect();
        let prefix = words[words.len().saturating_sub(self.max_words)..].join(" ");

        let window: String = after.chars().take(self.max_chars).collect();
        let suffix = window
            .split_whitespace()
            .take(self.max_words)
            .collect::<Vec<_>>()
            .join(" ");

        SurroundingContext { prefix, suffix }
    }
}
