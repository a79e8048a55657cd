//! Range resolution: matched block offsets back to (node, offset) anchors,
//! plus reading and annotating the text a range covers.

use std::collections::HashMap;

use crate::dom::blocks::{is_searchable_text_node, SearchableBlock};
use crate::dom::{DocumentTree, DomNode, DomTree, NodePath};
use crate::error::AnchorError;
use crate::fragment::TextMatch;

/// A precise anchor pair into a document. Offsets are byte offsets into
/// the respective text node's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange<Id> {
    pub start_node: Id,
    pub start_offset: usize,
    pub end_node: Id,
    pub end_offset: usize,
}

impl<Id: PartialEq> ResolvedRange<Id> {
    pub fn is_single_node(&self) -> bool {
        self.start_node == self.end_node
    }
}

/// Map a match in `block.text` back onto the block's text nodes.
///
/// A match ending exactly at a node boundary resolves to the end of that
/// node rather than the start of the next. Returns `None` when the match
/// does not fit the block's node table.
pub fn resolve_range<Id: Clone>(
    block: &SearchableBlock<Id>,
    m: &TextMatch,
) -> Option<ResolvedRange<Id>> {
    if m.start > m.end || m.end > block.text.len() {
        return None;
    }

    let mut start = None;
    let mut end = None;
    for seg in &block.segments {
        if start.is_none() && m.start >= seg.start && m.start < seg.end() {
            start = Some((seg.node.clone(), m.start - seg.start));
        }
        if start.is_some() && m.end >= seg.start && m.end <= seg.end() {
            end = Some((seg.node.clone(), m.end - seg.start));
            break;
        }
    }

    let ((start_node, start_offset), (end_node, end_offset)) = (start?, end?);
    Some(ResolvedRange {
        start_node,
        start_offset,
        end_node,
        end_offset,
    })
}

/// One text node's share of a range: `(node, lo, hi)` byte offsets.
type Piece<Id> = (Id, usize, usize);

/// Split a range into per-text-node pieces in document order.
///
/// Text nodes strictly between the endpoints are included only when
/// searchable, matching what a rendered selection would contain.
fn range_pieces<D: DocumentTree + ?Sized>(
    doc: &D,
    range: &ResolvedRange<D::NodeId>,
) -> Option<Vec<Piece<D::NodeId>>> {
    let nodes = doc.text_nodes(&doc.root());
    let first = nodes.iter().position(|n| n == &range.start_node)?;
    let last = nodes.iter().position(|n| n == &range.end_node)?;
    if last < first {
        return None;
    }

    let mut pieces = Vec::new();
    for (i, node) in nodes[first..=last].iter().enumerate() {
        let text = doc.text(node)?;
        let is_first = i == 0;
        let is_last = first + i == last;
        if !is_first && !is_last && !is_searchable_text_node(doc, node) {
            continue;
        }
        let lo = if is_first { range.start_offset } else { 0 };
        let hi = if is_last { range.end_offset } else { text.len() };
        // Rejects out-of-range offsets and offsets inside a UTF-8 sequence.
        text.get(lo..hi)?;
        pieces.push((node.clone(), lo, hi));
    }
    Some(pieces)
}

/// The text a range covers, or `None` when it does not resolve.
pub fn range_text<D: DocumentTree + ?Sized>(
    doc: &D,
    range: &ResolvedRange<D::NodeId>,
) -> Option<String> {
    let pieces = range_pieces(doc, range)?;
    let mut out = String::new();
    for (node, lo, hi) in pieces {
        out.push_str(&doc.text(&node)?[lo..hi]);
    }
    Some(out)
}

impl DomTree {
    /// Wrap every text segment covered by `range` in a highlighted link.
    ///
    /// Text nodes are split at the range offsets. Returns the number of
    /// wrapped segments. Nothing is modified if the range does not resolve.
    pub fn annotate(&mut self, range: &ResolvedRange<NodePath>, href: &str) -> Result<usize, AnchorError> {
        let pieces = range_pieces(self, range).ok_or(AnchorError::InvalidRange)?;

        let mut wrapped = 0;
        // Later pieces first: splitting a node only shifts paths after it.
        for (path, lo, hi) in pieces.into_iter().rev() {
            if lo == hi {
                continue;
            }
            let (parent_path, idx) = match path.0.split_last() {
                Some((&idx, rest)) => (NodePath(rest.to_vec()), idx),
                None => return Err(AnchorError::InvalidRange),
            };
            let parent = self.node_mut(&parent_path).ok_or(AnchorError::InvalidRange)?;
            let text = parent.children[idx].text.clone();

            let mut replacement = Vec::with_capacity(3);
            if lo > 0 {
                replacement.push(DomNode::text(&text[..lo]));
            }
            replacement.push(link_element(href, &text[lo..hi]));
            if hi < text.len() {
                replacement.push(DomNode::text(&text[hi..]));
            }
            parent.children.splice(idx..=idx, replacement);
            wrapped += 1;
        }

        log::debug!("annotated {} segment(s) with {}", wrapped, href);
        Ok(wrapped)
    }
}

fn link_element(href: &str, text: &str) -> DomNode {
    let mut attrs = HashMap::new();
    attrs.insert("href".to_string(), href.to_string());
    attrs.insert("style".to_string(), "background-color: yellow".to_string());
    DomNode::element("a", attrs, vec![DomNode::text(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::blocks::enumerate_blocks;
    use crate::dom::parser::parse_html;

    fn first_block(tree: &DomTree) -> SearchableBlock<NodePath> {
        enumerate_blocks(tree).next().unwrap()
    }

    #[test]
    fn resolves_across_nodes() {
        let tree = parse_html("<p>The <b>quick</b> brown fox</p>", "");
        let block = first_block(&tree);
        let range = resolve_range(&block, &TextMatch { start: 4, end: 15 }).unwrap();

        assert_eq!(tree.text(&range.start_node), Some("quick"));
        assert_eq!(range.start_offset, 0);
        assert_eq!(tree.text(&range.end_node), Some(" brown fox"));
        assert_eq!(range.end_offset, 6);
        assert_eq!(range_text(&tree, &range).as_deref(), Some("quick brown"));
    }

    #[test]
    fn end_on_node_boundary_stays_in_node() {
        let tree = parse_html("<p>The <b>quick</b> brown</p>", "");
        let block = first_block(&tree);
        let range = resolve_range(&block, &TextMatch { start: 4, end: 9 }).unwrap();
        assert!(range.is_single_node());
        assert_eq!(tree.text(&range.end_node), Some("quick"));
        assert_eq!(range.end_offset, 5);
    }

    #[test]
    fn start_on_node_boundary_moves_to_next_node() {
        let tree = parse_html("<p>The <b>quick</b></p>", "");
        let block = first_block(&tree);
        let range = resolve_range(&block, &TextMatch { start: 4, end: 9 }).unwrap();
        assert_eq!(tree.text(&range.start_node), Some("quick"));
        assert_eq!(range.start_offset, 0);
    }

    #[test]
    fn out_of_table_match_fails_closed() {
        let tree = parse_html("<p>short</p>", "");
        let block = first_block(&tree);
        assert!(resolve_range(&block, &TextMatch { start: 2, end: 99 }).is_none());
        assert!(resolve_range(&block, &TextMatch { start: 4, end: 2 }).is_none());
    }

    #[test]
    fn range_text_skips_hidden_middle_nodes() {
        let tree = parse_html("<p>a<script>x()</script>b</p>", "");
        let block = first_block(&tree);
        let range = resolve_range(&block, &TextMatch { start: 0, end: 2 }).unwrap();
        assert_eq!(range_text(&tree, &range).as_deref(), Some("ab"));
    }

    #[test]
    fn annotate_wraps_each_segment() {
        let mut tree = parse_html("<p>The <b>quick</b> brown fox</p>", "");
        let block = first_block(&tree);
        let range = resolve_range(&block, &TextMatch { start: 4, end: 15 }).unwrap();

        let wrapped = tree.annotate(&range, "https://example.com/").unwrap();
        assert_eq!(wrapped, 2);

        // Text is unchanged, only regrouped.
        assert_eq!(tree.root.text_content(), "The quick brown fox");
        let block = first_block(&tree);
        let links: Vec<String> = block
            .segments
            .iter()
            .filter(|s| {
                let parent = tree.parent(&s.node).unwrap();
                tree.tag_name(&parent) == Some("a")
            })
            .map(|s| tree.text(&s.node).unwrap().to_string())
            .collect();
        assert_eq!(links, vec!["quick", " brown"]);
    }

    #[test]
    fn annotate_rejects_stale_range() {
        let mut tree = parse_html("<p>abc</p>", "");
        let block = first_block(&tree);
        let mut range = resolve_range(&block, &TextMatch { start: 0, end: 3 }).unwrap();
        range.end_offset = 50;
        let before = tree.root.text_content();
        assert!(matches!(tree.annotate(&range, "x"), Err(AnchorError::InvalidRange)));
        assert_eq!(tree.root.text_content(), before);
    }
}
