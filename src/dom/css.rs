//! Lightweight computed-style resolution.
//!
//! Parses inline `style=""` attributes and falls back to user-agent
//! defaults per tag. Only the two properties the anchoring core cares
//! about are resolved: `display` and `visibility`.

use crate::dom::DomNode;

/// CSS `display` outer/inner kinds that matter for text segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    InlineFlex,
    InlineGrid,
    InlineTable,
    FlowRoot,
    Flex,
    Grid,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Contents,
    None,
}

impl Display {
    pub fn parse(val: &str) -> Option<Self> {
        let v = val.trim().to_ascii_lowercase();
        // Multi-keyword syntax: "block flow-root", "inline flex", ...
        let kind = match v.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["inline", "flex"] => Display::InlineFlex,
            ["inline", "grid"] => Display::InlineGrid,
            ["inline", "table"] => Display::InlineTable,
            ["block", "flex"] => Display::Flex,
            ["block", "grid"] => Display::Grid,
            ["block", "table"] => Display::Table,
            ["block", "flow-root"] => Display::FlowRoot,
            ["block", "flow"] => Display::Block,
            ["block", "flow", "list-item"] | ["list-item", "block"] => Display::ListItem,
            [single] => match *single {
                "block" => Display::Block,
                "inline" => Display::Inline,
                "inline-block" => Display::InlineBlock,
                "flow-root" => Display::FlowRoot,
                "flex" => Display::Flex,
                "inline-flex" => Display::InlineFlex,
                "grid" => Display::Grid,
                "inline-grid" => Display::InlineGrid,
                "list-item" => Display::ListItem,
                "table" => Display::Table,
                "inline-table" => Display::InlineTable,
                "table-row" => Display::TableRow,
                "table-cell" => Display::TableCell,
                "contents" => Display::Contents,
                "none" => Display::None,
                _ => return None,
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this display value starts a new block-level context
    /// for text segmentation. Inline-level boxes (`inline-flex`,
    /// `inline-table`, ...) stay part of the surrounding block.
    pub fn is_block_boundary(self) -> bool {
        matches!(
            self,
            Display::Block
                | Display::Table
                | Display::FlowRoot
                | Display::Grid
                | Display::Flex
                | Display::ListItem
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "visible" => Some(Visibility::Visible),
            "hidden" => Some(Visibility::Hidden),
            "collapse" => Some(Visibility::Collapse),
            _ => None,
        }
    }
}

/// Resolved style properties of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

impl ComputedStyle {
    /// `display: none` or `visibility: hidden|collapse`.
    pub fn is_rendered(&self) -> bool {
        self.display != Display::None && self.visibility == Visibility::Visible
    }
}

/// Inline `style="..."` declarations that were recognised.
#[derive(Debug, Clone, Default)]
pub struct StyleProps {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
}

/// Parse an inline `style="..."` attribute value.
/// Later declarations override earlier ones, as in a cascade.
pub fn parse_inline_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();
    for decl in style.split(';') {
        let parts: Vec<&str> = decl.splitn(2, ':').collect();
        if parts.len() != 2 {
            continue;
        }
        let prop = parts[0].trim().to_ascii_lowercase();
        let val = parts[1].trim().trim_end_matches("!important").trim();
        match prop.as_str() {
            "display" => {
                if let Some(d) = Display::parse(val) {
                    props.display = Some(d);
                }
            }
            "visibility" => {
                if let Some(v) = Visibility::parse(val) {
                    props.visibility = Some(v);
                }
            }
            _ => {}
        }
    }
    props
}

const NONE_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "base", "script", "style", "template", "noscript",
    "datalist", "param", "rp", "area",
];

const BLOCK_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "dl",
    "dt",
    "dd",
    "form",
    "fieldset",
    "section",
    "article",
    "aside",
    "main",
    "header",
    "footer",
    "nav",
    "address",
    "blockquote",
    "pre",
    "figure",
    "figcaption",
    "details",
    "summary",
    "hr",
    "caption",
    "legend",
];

/// User-agent default `display` for a tag.
pub fn default_display(tag: &str) -> Display {
    match tag {
        "li" => Display::ListItem,
        "table" => Display::Table,
        "tr" => Display::TableRow,
        "td" | "th" => Display::TableCell,
        "img" | "button" | "input" | "select" | "textarea" => Display::InlineBlock,
        t if NONE_TAGS.contains(&t) => Display::None,
        t if BLOCK_TAGS.contains(&t) => Display::Block,
        _ => Display::Inline,
    }
}

/// Compute the style of an element node.
///
/// Inline style wins, then the `hidden` attribute, then the tag default.
pub fn computed_style(node: &DomNode) -> ComputedStyle {
    let inline = node.attr("style").map(parse_inline_style).unwrap_or_default();

    let display = inline.display.unwrap_or_else(|| {
        if node.attr("hidden").is_some() {
            Display::None
        } else {
            default_display(&node.tag)
        }
    });

    ComputedStyle {
        display,
        visibility: inline.visibility.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn elem(tag: &str, attrs: &[(&str, &str)]) -> DomNode {
        let attrs: HashMap<String, String> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DomNode::element(tag, attrs, Vec::new())
    }

    #[test]
    fn parse_display_values() {
        assert_eq!(Display::parse("block"), Some(Display::Block));
        assert_eq!(Display::parse(" Flex "), Some(Display::Flex));
        assert_eq!(Display::parse("inline grid"), Some(Display::InlineGrid));
        assert_eq!(Display::parse("inline flex"), Some(Display::InlineFlex));
        assert_eq!(Display::parse("inline-flex"), Some(Display::InlineFlex));
        assert_eq!(Display::parse("inline-table"), Some(Display::InlineTable));
        assert_eq!(Display::parse("block grid"), Some(Display::Grid));
        assert_eq!(Display::parse("list-item"), Some(Display::ListItem));
        assert_eq!(Display::parse("bogus"), None);
    }

    #[test]
    fn block_boundaries() {
        for d in [
            Display::Block,
            Display::Table,
            Display::FlowRoot,
            Display::Grid,
            Display::Flex,
            Display::ListItem,
        ] {
            assert!(d.is_block_boundary(), "{:?}", d);
        }
        for d in [
            Display::Inline,
            Display::TableCell,
            Display::InlineBlock,
            Display::InlineFlex,
            Display::InlineGrid,
            Display::InlineTable,
            Display::None,
        ] {
            assert!(!d.is_block_boundary(), "{:?}", d);
        }
    }

    #[test]
    fn parse_inline() {
        let props = parse_inline_style("color: red; display: none; visibility: hidden");
        assert_eq!(props.display, Some(Display::None));
        assert_eq!(props.visibility, Some(Visibility::Hidden));

        let props = parse_inline_style("display: block; display: inline !important");
        assert_eq!(props.display, Some(Display::Inline));
    }

    #[test]
    fn inline_style_beats_defaults() {
        assert_eq!(computed_style(&elem("p", &[])).display, Display::Block);
        assert_eq!(computed_style(&elem("span", &[])).display, Display::Inline);
        assert_eq!(computed_style(&elem("li", &[])).display, Display::ListItem);
        assert_eq!(computed_style(&elem("script", &[])).display, Display::None);
        assert_eq!(
            computed_style(&elem("span", &[("style", "display:block")])).display,
            Display::Block
        );
        assert_eq!(
            computed_style(&elem("div", &[("hidden", "")])).display,
            Display::None
        );
    }

    #[test]
    fn rendered_flag() {
        assert!(computed_style(&elem("p", &[])).is_rendered());
        assert!(!computed_style(&elem("p", &[("style", "visibility: hidden")])).is_rendered());
        assert!(!computed_style(&elem("p", &[("style", "display: none")])).is_rendered());
    }
}
