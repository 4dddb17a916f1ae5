//! Parsed document snapshot.
//!
//! The outline and header models never talk to a rendering engine directly.
//! They read and write this arena, which is filled by html5ever from the
//! rendered HTML form of a FictionBook document.

mod arena;
mod element_ref;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Document, Node, NodeData, NodeId, html_name};
pub use element_ref::{ElementRef, OutlineSelectors};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, SelectorList};

use tree_sink::DocumentSink;

/// Parse an HTML document into a [`Document`].
///
/// Parsing is lenient: malformed markup is repaired the way browsers do.
///
/// # Example
///
/// ```
/// use fb2outline::dom::parse_html;
///
/// let doc = parse_html("<body><div class='title'>Chapter 1</div></body>");
/// let title = doc.find_by_class("title").unwrap();
/// assert_eq!(doc.text_content(title), "Chapter 1");
/// ```
pub fn parse_html(html: &str) -> Document {
    let sink = DocumentSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_document()
}

impl Document {
    /// First element in document order matching a CSS selector list.
    ///
    /// Returns `None` if the selector does not parse or nothing matches.
    pub fn select_first(&self, selector: &str) -> Option<NodeId> {
        let mut input = cssparser::ParserInput::new(selector);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = match SelectorList::parse(&OutlineSelectors, &mut parser, ParseRelative::No) {
            Ok(list) => list,
            Err(_) => {
                log::warn!("unparseable selector: {selector}");
                return None;
            }
        };

        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        // One cache for the whole walk: elements are keyed by arena slot.
        self.find(|id, _| {
            ElementRef::new(self, id).is_some_and(|element| {
                list.slice().iter().any(|s| {
                    selectors::matching::matches_selector(s, 0, None, &element, &mut context)
                })
            })
        })
    }
}
