//! Fragment matcher.
//!
//! Finds the first occurrence of a directive inside one block's
//! concatenated text: base-character comparison, prefix/suffix adjacency
//! modulo whitespace, and word boundaries at both ends of the match.
//! False candidates are skipped by moving an explicit cursor forward.

use super::fold::{fold, FoldedText};
use super::{TextDirective, TextMatch};
use crate::dom::blocks::SearchableBlock;

/// Slack (in chars) allowed between a prefix/suffix and the match.
pub const DEFAULT_PROXIMITY_WINDOW: usize = 20;

/// Letter, number or underscore.
fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

/// Whether byte position `pos` of `text` separates a word char from a
/// non-word char. Both ends of the string are boundaries.
///
/// Combining marks belong to the char before them, so they are skipped
/// when looking backwards.
pub fn is_word_boundary(text: &str, pos: usize) -> bool {
    if pos == 0 || pos >= text.len() {
        return true;
    }
    let (Some(before), Some(after)) = (text.get(..pos), text.get(pos..)) else {
        return false;
    };
    let prev = before
        .chars()
        .rev()
        .find(|&c| !unicode_normalization::char::is_combining_mark(c));
    match (prev, after.chars().next()) {
        (Some(p), Some(n)) => is_word_char(p) != is_word_char(n),
        _ => true,
    }
}

/// Directive with every component folded once up front.
struct FoldedDirective {
    prefix: Option<Vec<char>>,
    start: Vec<char>,
    end: Option<Vec<char>>,
    suffix: Option<Vec<char>>,
}

impl FoldedDirective {
    fn new(directive: &TextDirective) -> Self {
        let fold_opt = |s: &Option<String>| s.as_deref().map(fold).filter(|f| !f.is_empty());
        Self {
            prefix: fold_opt(&directive.prefix),
            start: fold(&directive.start),
            end: fold_opt(&directive.end),
            suffix: fold_opt(&directive.suffix),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentMatcher {
    proximity_window: usize,
}

impl Default for FragmentMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_WINDOW)
    }
}

impl FragmentMatcher {
    pub fn new(proximity_window: usize) -> Self {
        Self { proximity_window }
    }

    pub fn proximity_window(&self) -> usize {
        self.proximity_window
    }

    /// Find the first match of `directive` in `text`.
    pub fn find_match(&self, text: &str, directive: &TextDirective) -> Option<TextMatch> {
        let d = FoldedDirective::new(directive);
        if d.start.is_empty() {
            return None;
        }
        let hay = FoldedText::new(text);

        let mut search_pos = 0;
        loop {
            let start_idx = hay.find(&d.start, search_pos)?;
            search_pos = start_idx + 1;
            let start_byte = hay.byte_offset(start_idx);

            if let Some(prefix) = &d.prefix {
                if !self.prefix_adjacent(&hay, prefix, start_idx) {
                    log::trace!("candidate at {}: prefix not adjacent", start_byte);
                    continue;
                }
            }
            if !is_word_boundary(text, start_byte) {
                log::trace!("candidate at {}: no word boundary at start", start_byte);
                continue;
            }

            let end_idx = match &d.end {
                // No `end` after this start means none after any later start either.
                Some(end) => hay.find(end, start_idx + d.start.len())? + end.len(),
                None => start_idx + d.start.len(),
            };
            let end_byte = hay.byte_offset(end_idx);

            if let Some(suffix) = &d.suffix {
                if !self.suffix_adjacent(&hay, suffix, end_idx) {
                    log::trace!("candidate at {}: suffix not adjacent", start_byte);
                    continue;
                }
            }
            if !is_word_boundary(text, end_byte) {
                log::trace!("candidate at {}: no word boundary at end {}", start_byte, end_byte);
                continue;
            }

            return Some(TextMatch {
                start: start_byte,
                end: end_byte,
            });
        }
    }

    /// Find the first match of `directive` in a block snapshot.
    pub fn find_in_block<Id>(
        &self,
        block: &SearchableBlock<Id>,
        directive: &TextDirective,
    ) -> Option<TextMatch> {
        self.find_match(&block.text, directive)
    }

    fn prefix_adjacent(&self, hay: &FoldedText<'_>, prefix: &[char], start_idx: usize) -> bool {
        let lo = start_idx.saturating_sub(prefix.len() + self.proximity_window);
        hay.rfind_within(prefix, lo, start_idx)
            .map_or(false, |p| hay.is_whitespace_between(p + prefix.len(), start_idx))
    }

    fn suffix_adjacent(&self, hay: &FoldedText<'_>, suffix: &[char], end_idx: usize) -> bool {
        let hi = end_idx + suffix.len() + self.proximity_window;
        hay.find_within(suffix, end_idx, hi)
            .map_or(false, |s| hay.is_whitespace_between(end_idx, s))
    }
}

/// [`FragmentMatcher::find_in_block`] with the default proximity window.
pub fn find_match<Id>(block: &SearchableBlock<Id>, directive: &TextDirective) -> Option<TextMatch> {
    FragmentMatcher::default().find_in_block(block, directive)
}
