//! Block segmentation.
//!
//! Splits a document into disjoint blocks (elements whose computed display
//! opens a new block-level context) and snapshots the searchable text of
//! each one. Nested blocks are cut out of their parent and emitted on
//! their own, so a passage can never be matched across a block boundary.

use crate::dom::DocumentTree;

/// Elements whose text is never searchable.
const UNSEARCHABLE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "object", "embed", "svg", "math",
];

/// One text node inside a [`SearchableBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment<Id> {
    pub node: Id,
    /// Byte offset of this node's text inside the block's concatenation.
    pub start: usize,
    /// Byte length of this node's text.
    pub len: usize,
}

impl<Id> TextSegment<Id> {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Snapshot of a block's searchable text nodes and their concatenation.
///
/// Built fresh for every block visited during a match attempt; the
/// document may change between calls, so nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableBlock<Id> {
    /// The block element itself.
    pub element: Id,
    pub segments: Vec<TextSegment<Id>>,
    pub text: String,
}

impl<Id: Clone> SearchableBlock<Id> {
    fn new(element: Id) -> Self {
        Self {
            element,
            segments: Vec::new(),
            text: String::new(),
        }
    }

    fn push(&mut self, node: Id, content: &str) {
        self.segments.push(TextSegment {
            node,
            start: self.text.len(),
            len: content.len(),
        });
        self.text.push_str(content);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// True iff the element's computed display establishes a block context.
pub fn is_block_boundary<D: DocumentTree + ?Sized>(doc: &D, node: &D::NodeId) -> bool {
    doc.is_element(node) && doc.computed_style(node).display.is_block_boundary()
}

/// True iff `node` is a text node that is rendered and not inside a
/// script-like or embedded-content container.
pub fn is_searchable_text_node<D: DocumentTree + ?Sized>(doc: &D, node: &D::NodeId) -> bool {
    if doc.text(node).is_none() {
        return false;
    }

    // Foreign content nests elements (`<svg><text>`), so the whole
    // ancestor chain is checked, not only the parent.
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if let Some(tag) = doc.tag_name(&ancestor) {
            if UNSEARCHABLE_TAGS.contains(&tag) || !doc.computed_style(&ancestor).is_rendered() {
                return false;
            }
        }
        current = doc.parent(&ancestor);
    }
    true
}

/// Lazily enumerate the searchable blocks of a document in document order.
///
/// The iterator holds only a traversal stack; each block's text is read
/// when the block is reached. Restarting means calling this again.
pub fn enumerate_blocks<D: DocumentTree + ?Sized>(doc: &D) -> Blocks<'_, D> {
    Blocks {
        doc,
        stack: vec![doc.root()],
        root_pending: true,
    }
}

/// Iterator returned by [`enumerate_blocks`].
pub struct Blocks<'a, D: DocumentTree + ?Sized> {
    doc: &'a D,
    stack: Vec<D::NodeId>,
    root_pending: bool,
}

impl<'a, D: DocumentTree + ?Sized> Iterator for Blocks<'a, D> {
    type Item = SearchableBlock<D::NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let mut children = self.doc.children(&node);
            children.reverse();
            self.stack.extend(children);

            // The root is always treated as a block so that inline content
            // without any block ancestor is still reachable.
            let is_root = std::mem::take(&mut self.root_pending);
            if !is_root && !is_block_boundary(self.doc, &node) {
                continue;
            }

            let block = collect_block(self.doc, node);
            if block.is_empty() {
                continue;
            }
            log::debug!(
                "block {:?}: {} text nodes, {} bytes",
                block.element,
                block.segments.len(),
                block.text.len()
            );
            return Some(block);
        }
        None
    }
}

/// Snapshot of the block that `node` belongs to: its nearest block-boundary
/// ancestor, or the root when there is none.
pub fn containing_block<D: DocumentTree + ?Sized>(
    doc: &D,
    node: &D::NodeId,
) -> SearchableBlock<D::NodeId> {
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if is_block_boundary(doc, &ancestor) {
            return collect_block(doc, ancestor);
        }
        current = doc.parent(&ancestor);
    }
    collect_block(doc, doc.root())
}

/// Collect the searchable text nodes under `element` without descending
/// into nested block boundaries.
fn collect_block<D: DocumentTree + ?Sized>(doc: &D, element: D::NodeId) -> SearchableBlock<D::NodeId> {
    let mut block = SearchableBlock::new(element.clone());
    let mut stack: Vec<D::NodeId> = doc.children(&element).into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if let Some(content) = doc.text(&node) {
            if is_searchable_text_node(doc, &node) {
                block.push(node, content);
            }
            continue;
        }
        if is_block_boundary(doc, &node) {
            continue;
        }
        stack.extend(doc.children(&node).into_iter().rev());
    }
    block
}
