//! Search collation: compare base characters only.
//!
//! Text is folded by canonical decomposition, dropping combining marks,
//! then lowercasing, so `É`, `é` and `e` all compare equal. A folded view
//! remembers which source byte produced each folded char so matches can
//! be mapped back onto the original text.

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

fn fold_char(c: char, out: &mut impl FnMut(char)) {
    decompose_canonical(c, |d| {
        if !is_combining_mark(d) {
            for lower in d.to_lowercase() {
                out(lower);
            }
        }
    });
}

/// Fold a needle for searching.
pub fn fold(s: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        fold_char(c, &mut |f| out.push(f));
    }
    out
}

/// Folded view of a haystack with a map back to source byte offsets.
#[derive(Debug, Clone)]
pub struct FoldedText<'a> {
    source: &'a str,
    chars: Vec<char>,
    /// `offsets[i]` is the byte offset of the source char that produced `chars[i]`.
    offsets: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = Vec::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(source.len());
        for (byte, c) in source.char_indices() {
            fold_char(c, &mut |f| {
                chars.push(f);
                offsets.push(byte);
            });
        }
        Self {
            source,
            chars,
            offsets,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Number of folded chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Source byte offset for a folded position; `len()` maps to the end
    /// of the source.
    pub fn byte_offset(&self, idx: usize) -> usize {
        self.offsets.get(idx).copied().unwrap_or(self.source.len())
    }

    /// Whether a folded position sits on a source char boundary (not in
    /// the middle of one char's expansion).
    fn is_aligned(&self, idx: usize) -> bool {
        idx == 0 || idx >= self.len() || self.offsets[idx] != self.offsets[idx - 1]
    }

    fn matches_at(&self, needle: &[char], idx: usize) -> bool {
        self.chars.get(idx..idx + needle.len()) == Some(needle)
            && self.is_aligned(idx)
            && self.is_aligned(idx + needle.len())
    }

    /// First aligned occurrence of `needle` starting at or after `from`.
    pub fn find(&self, needle: &[char], from: usize) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.len() {
            return None;
        }
        (from..=self.len() - needle.len()).find(|&i| self.matches_at(needle, i))
    }

    /// First aligned occurrence lying entirely inside `[lo, hi)`.
    pub fn find_within(&self, needle: &[char], lo: usize, hi: usize) -> Option<usize> {
        let hi = hi.min(self.len());
        if needle.is_empty() || hi < lo + needle.len() {
            return None;
        }
        (lo..=hi - needle.len()).find(|&i| self.matches_at(needle, i))
    }

    /// Last aligned occurrence lying entirely inside `[lo, hi)`.
    pub fn rfind_within(&self, needle: &[char], lo: usize, hi: usize) -> Option<usize> {
        let hi = hi.min(self.len());
        if needle.is_empty() || hi < lo + needle.len() {
            return None;
        }
        (lo..=hi - needle.len())
            .rev()
            .find(|&i| self.matches_at(needle, i))
    }

    /// True when every folded char in `[lo, hi)` is whitespace.
    pub fn is_whitespace_between(&self, lo: usize, hi: usize) -> bool {
        self.chars
            .get(lo..hi)
            .map_or(false, |gap| gap.iter().all(|c| c.is_whitespace()))
    }
}
