use rayon::prelude::*;

use crate::dom::blocks::{enumerate_blocks, SearchableBlock};
use crate::dom::parser::parse_html;
use crate::dom::range::{range_text, resolve_range, ResolvedRange};
use crate::dom::{DocumentTree, DomTree, NodePath};
use crate::engine::config::AnchorConfig;
use crate::error::{AnchorError, DirectiveError};
use crate::fragment::codec::{decode, encode};
use crate::fragment::url::split_fragment_directives;
use crate::fragment::{TextDirective, TextMatch};
use crate::net::fetch::fetch_url;

/// A match together with the block snapshot it was found in.
#[derive(Debug, Clone)]
pub struct BlockMatch<Id> {
    pub block: SearchableBlock<Id>,
    pub matched: TextMatch,
}

impl<Id> BlockMatch<Id> {
    /// The matched passage as it appears in the block.
    pub fn text(&self) -> &str {
        &self.block.text[self.matched.start..self.matched.end]
    }
}

/// Outcome of anchoring one stored locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor<Id> {
    Found(ResolvedRange<Id>),
    /// Valid locator, but the text is not in the document.
    NotFound,
    /// The locator did not decode; skip it.
    Malformed(DirectiveError),
}

impl<Id> Anchor<Id> {
    pub fn range(&self) -> Option<&ResolvedRange<Id>> {
        match self {
            Anchor::Found(range) => Some(range),
            _ => None,
        }
    }
}

/// Result of loading a page and anchoring its text directives.
pub struct PageResult {
    pub dom: DomTree,
    /// One entry per locator, in input order.
    pub anchors: Vec<(String, Anchor<NodePath>)>,
    pub fetch_status: u16,
}

/// The anchoring pipeline:
/// decode → segment → match → resolve at restore time,
/// selection → context → encode at capture time.
///
/// Holds configuration only; every call works on the document it is given.
#[derive(Debug, Clone, Default)]
pub struct AnchorEngine {
    config: AnchorConfig,
}

impl AnchorEngine {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// First block, in document order, containing a match. Later blocks
    /// are not read once a match is found.
    pub fn find<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        directive: &TextDirective,
    ) -> Option<BlockMatch<D::NodeId>> {
        let matcher = self.config.matcher();
        for block in enumerate_blocks(doc) {
            if let Some(matched) = matcher.find_in_block(&block, directive) {
                log::debug!(
                    "matched {:?} in block {:?} at {}..{}",
                    directive.start,
                    block.element,
                    matched.start,
                    matched.end
                );
                return Some(BlockMatch { block, matched });
            }
        }
        log::debug!("no block matches {:?}", directive.start);
        None
    }

    /// Find and resolve a directive to node anchors.
    pub fn locate<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        directive: &TextDirective,
    ) -> Option<ResolvedRange<D::NodeId>> {
        let found = self.find(doc, directive)?;
        let range = resolve_range(&found.block, &found.matched);
        if range.is_none() {
            log::warn!(
                "match {}..{} does not map onto block {:?}",
                found.matched.start,
                found.matched.end,
                found.block.element
            );
        }
        range
    }

    /// Decode a stored locator, then locate it.
    pub fn locate_str<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        locator: &str,
    ) -> Result<Option<ResolvedRange<D::NodeId>>, AnchorError> {
        let directive = decode(locator)?;
        Ok(self.locate(doc, &directive))
    }

    /// Anchor one locator, folding decode failures into the outcome.
    pub fn anchor<D: DocumentTree + ?Sized>(&self, doc: &D, locator: &str) -> Anchor<D::NodeId> {
        match decode(locator) {
            Ok(directive) => match self.locate(doc, &directive) {
                Some(range) => Anchor::Found(range),
                None => Anchor::NotFound,
            },
            Err(err) => {
                log::warn!("skipping locator {:?}: {}", locator, err);
                Anchor::Malformed(err)
            }
        }
    }

    /// Anchor several locators against the same document snapshot.
    ///
    /// Each locator is independent; outcomes come back in input order.
    pub fn locate_all<D, S>(&self, doc: &D, locators: &[S]) -> Vec<Anchor<D::NodeId>>
    where
        D: DocumentTree + Sync + ?Sized,
        D::NodeId: Send,
        S: AsRef<str> + Sync,
    {
        locators
            .par_iter()
            .map(|locator| self.anchor(doc, locator.as_ref()))
            .collect()
    }

    /// Build a locator for a selection.
    pub fn capture<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        selection: &ResolvedRange<D::NodeId>,
    ) -> Result<String, AnchorError> {
        let selected = range_text(doc, selection).ok_or(AnchorError::InvalidRange)?;
        if selected.trim().is_empty() {
            return Err(AnchorError::EmptySelection);
        }
        let context = self
            .config
            .context_extractor()
            .extract(doc, &selected, selection);
        Ok(encode(&selected, &context))
    }

    /// Selection over the `occurrence`-th (0-based) case-sensitive
    /// occurrence of `text` that lies inside a single block.
    pub fn select_text<D: DocumentTree + ?Sized>(
        &self,
        doc: &D,
        text: &str,
        occurrence: usize,
    ) -> Option<ResolvedRange<D::NodeId>> {
        if text.is_empty() {
            return None;
        }
        let mut seen = 0;
        for block in enumerate_blocks(doc) {
            for (start, _) in block.text.match_indices(text) {
                if seen == occurrence {
                    let m = TextMatch {
                        start,
                        end: start + text.len(),
                    };
                    return resolve_range(&block, &m);
                }
                seen += 1;
            }
        }
        None
    }

    /// Fetch a page and anchor every text directive in its URL fragment
    /// plus any `extra` locators.
    pub fn load_page(&self, url: &str, extra: &[String]) -> Result<PageResult, AnchorError> {
        let fetch_result = fetch_url(url)?;
        let locators = page_locators(url, extra)?;
        let mut page = self.process_html(&fetch_result.html, &fetch_result.url, &locators);
        page.fetch_status = fetch_result.status;
        Ok(page)
    }

    /// Parse HTML and anchor `locators` against it.
    pub fn process_html(&self, html: &str, url: &str, locators: &[String]) -> PageResult {
        let dom = parse_html(html, url);
        let outcomes = self.locate_all(&dom, locators);
        let anchors = locators.iter().cloned().zip(outcomes).collect();
        PageResult {
            dom,
            anchors,
            fetch_status: 200,
        }
    }
}

/// Locators carried by `url`'s fragment directive followed by `extra`.
pub fn page_locators(url: &str, extra: &[String]) -> Result<Vec<String>, AnchorError> {
    let normalized = crate::net::fetch::normalize_url(url);
    let mut locators = split_fragment_directives(&normalized)?.directives;
    locators.extend(extra.iter().cloned());
    Ok(locators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::css::ComputedStyle;
    use std::cell::RefCell;

    const ARTICLE: &str = r#"
    <html><head><title>Fox</title><script>var quick = "brown fox";</script></head>
    <body>
        <h1>The quick brown fox</h1>
        <p>The <b>quick</b> brown fox jumps over the lazy dog.</p>
        <ul><li>quick</li><li>brown</li></ul>
        <p>See note. The cat sat. See also: The cat sat on the mat.</p>
    </body></html>
    "#;

    fn engine() -> AnchorEngine {
        AnchorEngine::default()
    }

    #[test]
    fn first_block_wins() {
        let tree = parse_html(ARTICLE, "");
        let found = engine().find(&tree, &TextDirective::exact("quick brown fox")).unwrap();
        assert_eq!(tree.tag_name(&found.block.element), Some("h1"));
        assert_eq!(found.text(), "quick brown fox");
    }

    /// Records the content of every text node read through it.
    struct RecordingTree<'a> {
        inner: &'a DomTree,
        reads: RefCell<Vec<String>>,
    }

    impl DocumentTree for RecordingTree<'_> {
        type NodeId = NodePath;

        fn root(&self) -> NodePath {
            self.inner.root()
        }
        fn children(&self, node: &NodePath) -> Vec<NodePath> {
            self.inner.children(node)
        }
        fn parent(&self, node: &NodePath) -> Option<NodePath> {
            self.inner.parent(node)
        }
        fn tag_name(&self, node: &NodePath) -> Option<&str> {
            self.inner.tag_name(node)
        }
        fn text(&self, node: &NodePath) -> Option<&str> {
            let text = self.inner.text(node);
            if let Some(t) = text {
                self.reads.borrow_mut().push(t.to_string());
            }
            text
        }
        fn computed_style(&self, node: &NodePath) -> ComputedStyle {
            self.inner.computed_style(node)
        }
    }

    #[test]
    fn later_blocks_are_not_read() {
        let tree = parse_html(ARTICLE, "");
        let recording = RecordingTree {
            inner: &tree,
            reads: RefCell::new(Vec::new()),
        };
        let found = engine()
            .find(&recording, &TextDirective::exact("quick brown fox"))
            .unwrap();
        assert_eq!(tree.tag_name(&found.block.element), Some("h1"));

        let reads = recording.reads.into_inner();
        assert!(reads.iter().any(|t| t == "The quick brown fox"));
        for later in ["jumps", "lazy", "cat", "See"] {
            assert!(!reads.iter().any(|t| t.contains(later)), "{later} was read");
        }
        assert!(!reads.iter().any(|t| t == "brown"));
    }

    #[test]
    fn passage_runs_through_inline_flex_box() {
        let tree = parse_html(
            r#"<p>alpha <span style="display:inline-flex">beta</span> gamma</p>"#,
            "",
        );
        let range = engine()
            .locate(&tree, &TextDirective::exact("alpha beta gamma"))
            .unwrap();
        assert_eq!(range_text(&tree, &range).as_deref(), Some("alpha beta gamma"));
    }

    #[test]
    fn context_selects_later_block() {
        let tree = parse_html(ARTICLE, "");
        let d = TextDirective::exact("quick brown fox").with_prefix("The").with_suffix("jumps");
        let found = engine().find(&tree, &d).unwrap();
        assert_eq!(tree.tag_name(&found.block.element), Some("p"));
    }

    #[test]
    fn no_match_across_blocks() {
        let tree = parse_html(ARTICLE, "");
        assert!(tree.root.text_content().contains("quickbrown"));
        assert!(engine().find(&tree, &TextDirective::exact("quickbrown")).is_none());
        assert!(engine().find(&tree, &TextDirective::exact("quick brown dog")).is_none());
    }

    #[test]
    fn script_text_is_never_matched() {
        let tree = parse_html(ARTICLE, "");
        assert!(engine().find(&tree, &TextDirective::exact("var quick")).is_none());
    }

    #[test]
    fn locate_resolves_into_nodes() {
        let tree = parse_html(ARTICLE, "");
        let range = engine()
            .locate_str(&tree, "#:~:text=lazy%20dog")
            .unwrap()
            .unwrap();
        assert!(range.is_single_node());
        assert_eq!(range_text(&tree, &range).as_deref(), Some("lazy dog"));
    }

    #[test]
    fn locate_str_reports_malformed() {
        let tree = parse_html(ARTICLE, "");
        assert!(matches!(
            engine().locate_str(&tree, "#:~:text="),
            Err(AnchorError::Directive(DirectiveError::Empty))
        ));
        assert!(engine().locate_str(&tree, "text=unicorn").unwrap().is_none());
    }

    #[test]
    fn locate_all_keeps_order_and_independence() {
        let tree = parse_html(ARTICLE, "");
        let locators = ["also:-,The%20cat%20sat", "", "zebra", "quick,dog"];
        let outcomes = engine().locate_all(&tree, &locators);
        assert_eq!(outcomes.len(), 4);

        let cat = outcomes[0].range().unwrap();
        assert_eq!(range_text(&tree, cat).as_deref(), Some("The cat sat"));
        assert_eq!(cat.start_offset, 33);
        assert_eq!(outcomes[1], Anchor::Malformed(DirectiveError::Empty));
        assert_eq!(outcomes[2], Anchor::NotFound);
        let range = outcomes[3].range().unwrap();
        assert_eq!(
            range_text(&tree, range).as_deref(),
            Some("quick brown fox jumps over the lazy dog")
        );
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let tree = parse_html(ARTICLE, "");
        let d = TextDirective::exact("The cat sat");
        assert_eq!(engine().locate(&tree, &d), engine().locate(&tree, &d));
    }

    #[test]
    fn capture_then_locate_round_trip() {
        let tree = parse_html(ARTICLE, "");
        let eng = engine();
        let selection = eng.select_text(&tree, "The cat sat", 1).unwrap();
        let locator = eng.capture(&tree, &selection).unwrap();
        assert_eq!(locator, "sat.%20See%20also%3A-,The%20cat%20sat,-on%20the%20mat.");

        let found = eng.locate_str(&tree, &locator).unwrap().unwrap();
        assert_eq!(found, selection);
    }

    #[test]
    fn capture_round_trip_around_nested_block() {
        let tree = parse_html(
            "<div>intro text <p>nested</p> The <b>cat</b> sat. The cat sat</div>",
            "",
        );
        let eng = engine();
        let selection = eng.select_text(&tree, "The cat sat", 0).unwrap();
        let locator = eng.capture(&tree, &selection).unwrap();
        assert_eq!(locator, "intro%20text-,The%20cat%20sat,-.%20The%20cat");

        let found = eng.locate_str(&tree, &locator).unwrap().unwrap();
        assert_eq!(found, selection);
    }

    #[test]
    fn capture_rejects_blank_selection() {
        let tree = parse_html("<p>a <b> </b> b</p>", "");
        let eng = engine();
        let block = enumerate_blocks(&tree).next().unwrap();
        let blank = resolve_range(&block, &TextMatch { start: 1, end: 4 }).unwrap();
        assert!(matches!(eng.capture(&tree, &blank), Err(AnchorError::EmptySelection)));
    }

    #[test]
    fn wider_window_finds_distant_prefix() {
        let gap = " ".repeat(25);
        let tree = parse_html(&format!("<p>see:{gap}target</p>"), "");
        let d = TextDirective::exact("target").with_prefix("see:");
        assert!(engine().locate(&tree, &d).is_none());

        let wide = AnchorEngine::new(AnchorConfig::default().with_proximity_window(40));
        assert!(wide.locate(&tree, &d).is_some());
    }

    #[test]
    fn context_gap_must_be_whitespace() {
        let tree = parse_html("<p>intro, a long aside here, target</p>", "");
        let d = TextDirective::exact("target").with_prefix("intro,");
        assert!(engine().locate(&tree, &d).is_none());
        let d = TextDirective::exact("target").with_prefix("here,");
        assert!(engine().locate(&tree, &d).is_some());
    }

    #[test]
    fn process_html_anchors_locators() {
        let page = engine().process_html(
            ARTICLE,
            "https://example.com/fox",
            &["lazy%20dog".to_string(), "nope".to_string()],
        );
        assert_eq!(page.dom.title, "Fox");
        assert_eq!(page.anchors.len(), 2);
        assert!(matches!(page.anchors[0].1, Anchor::Found(_)));
        assert_eq!(page.anchors[1], ("nope".to_string(), Anchor::NotFound));
    }

    #[test]
    fn page_locators_come_from_fragment_then_extras() {
        let locators = page_locators(
            "example.com/fox#:~:text=lazy%20dog&text=quick",
            &["extra".to_string()],
        )
        .unwrap();
        assert_eq!(locators, vec!["lazy%20dog", "quick", "extra"]);
    }
}
