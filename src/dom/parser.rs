use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Parse raw HTML string into a DomTree.
///
/// Every text node is kept exactly as parsed. Whether script bodies or
/// whitespace runs are searchable is decided later from computed style.
pub fn parse_html(html: &str, url: &str) -> DomTree {
    let document = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let root = DomNode::document(vec![convert_element(document.root_element())]);

    DomTree {
        root,
        url: url.to_string(),
        title: title.trim().to_string(),
    }
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_ascii_lowercase();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    DomNode::element(tag, attributes, children)
}
