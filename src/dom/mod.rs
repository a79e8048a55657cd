pub mod blocks;
pub mod css;
pub mod parser;
pub mod range;

use std::collections::HashMap;
use std::fmt::Debug;

use crate::dom::css::{computed_style, ComputedStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Internal DOM node representation.
/// Text nodes are kept verbatim (whitespace included) so that offsets
/// computed against them stay valid after matching.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: HashMap::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: HashMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    /// Recursively count all nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Concatenated text of every descendant text node, untouched
    /// (the DOM `textContent` of this node).
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        self.text_content_inner(&mut buf);
        buf
    }

    fn text_content_inner(&self, buf: &mut String) {
        if self.node_type == NodeType::Text {
            buf.push_str(&self.text);
        }
        for child in &self.children {
            child.text_content_inner(buf);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}

/// Stable identity of a node inside a [`DomTree`]: the child indices
/// walked from the root.
///
/// Paths stay valid as long as the tree is not mutated before them in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, idx: usize) -> Self {
        let mut path = self.0.clone();
        path.push(idx);
        Self(path)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// Capability interface the anchoring core needs from a document.
///
/// Any tree that can hand out ordered children, a parent link, element
/// tags, text node content and a computed display/visibility can be
/// searched: the in-crate [`DomTree`], a virtual DOM, a parsed document.
pub trait DocumentTree {
    type NodeId: Clone + Eq + Debug;

    fn root(&self) -> Self::NodeId;
    fn children(&self, node: &Self::NodeId) -> Vec<Self::NodeId>;
    fn parent(&self, node: &Self::NodeId) -> Option<Self::NodeId>;

    /// Lowercase tag name, `None` unless the node is an element.
    fn tag_name(&self, node: &Self::NodeId) -> Option<&str>;

    /// Text content, `None` unless the node is a text node.
    fn text(&self, node: &Self::NodeId) -> Option<&str>;

    /// Computed style of an element. Non-elements report the default style.
    fn computed_style(&self, node: &Self::NodeId) -> ComputedStyle;

    fn is_element(&self, node: &Self::NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    /// Every descendant text node of `node` (itself included) in document order.
    fn text_nodes(&self, node: &Self::NodeId) -> Vec<Self::NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node.clone()];
        while let Some(current) = stack.pop() {
            if self.text(&current).is_some() {
                out.push(current.clone());
            }
            let mut children = self.children(&current);
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

/// Parsed DOM tree with metadata
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
    pub url: String,
    pub title: String,
}

impl DomTree {
    pub fn new(root: DomNode, url: impl Into<String>) -> Self {
        Self {
            root,
            url: url.into(),
            title: String::new(),
        }
    }

    pub fn node(&self, path: &NodePath) -> Option<&DomNode> {
        let mut current = &self.root;
        for &idx in &path.0 {
            current = current.children.get(idx)?;
        }
        Some(current)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut DomNode> {
        let mut current = &mut self.root;
        for &idx in &path.0 {
            current = current.children.get_mut(idx)?;
        }
        Some(current)
    }
}

impl DocumentTree for DomTree {
    type NodeId = NodePath;

    fn root(&self) -> NodePath {
        NodePath::root()
    }

    fn children(&self, node: &NodePath) -> Vec<NodePath> {
        self.node(node)
            .map(|n| (0..n.children.len()).map(|i| node.child(i)).collect())
            .unwrap_or_default()
    }

    fn parent(&self, node: &NodePath) -> Option<NodePath> {
        node.parent()
    }

    fn tag_name(&self, node: &NodePath) -> Option<&str> {
        self.node(node)
            .filter(|n| n.node_type == NodeType::Element)
            .map(|n| n.tag.as_str())
    }

    fn text(&self, node: &NodePath) -> Option<&str> {
        self.node(node)
            .filter(|n| n.node_type == NodeType::Text)
            .map(|n| n.text.as_str())
    }

    fn computed_style(&self, node: &NodePath) -> ComputedStyle {
        match self.node(node) {
            Some(n) if n.node_type == NodeType::Element => computed_style(n),
            _ => ComputedStyle::default(),
        }
    }
}
