//! Selector matching over the arena.
//!
//! Outline rows are addressed by `:root > :nth-child(..)` paths; this module
//! lets the selectors crate evaluate those paths (and plain class selectors)
//! against a [`Document`]. No pseudo-classes or pseudo-elements are
//! supported, a parsed document has no interaction state.

use std::fmt;

use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{Element, OpaqueElement, SelectorImpl};

use super::arena::{Document, Node, NodeData, NodeId};

/// An interned name as the selectors crate sees it.
///
/// Names, classes, ids and attribute values all go through html5ever's atoms
/// so comparisons against the arena are cheap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CssAtom<T>(pub T);

pub type CssName = CssAtom<LocalName>;
pub type CssNamespace = CssAtom<Namespace>;

impl<T: PrecomputedHash> PrecomputedHash for CssAtom<T> {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl<T: AsRef<str>> cssparser::ToCss for CssAtom<T> {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(self.0.as_ref(), dest)
    }
}

impl<T: AsRef<str>> AsRef<str> for CssAtom<T> {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl<'a, T: From<&'a str>> From<&'a str> for CssAtom<T> {
    fn from(s: &'a str) -> Self {
        Self(T::from(s))
    }
}

/// Uninhabited: nothing beyond tree-structural selectors is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {}

impl cssparser::ToCss for Unsupported {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for Unsupported {
    type Impl = OutlineSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for Unsupported {
    type Impl = OutlineSelectors;
}

/// Selector dialect understood by [`Document::select_first`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSelectors;

impl SelectorImpl for OutlineSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssName;
    type Identifier = CssName;
    type LocalName = CssName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = CssName;
    type BorrowedLocalName = CssName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = Unsupported;
    type PseudoElement = Unsupported;
}

impl<'i> selectors::parser::Parser<'i> for OutlineSelectors {
    type Impl = OutlineSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// An element of a [`Document`] during selector matching.
///
/// Carries the arena slot itself: its address is the element's identity for
/// the matcher's `:nth-child` caches.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    node: &'a Node,
}

impl<'a> ElementRef<'a> {
    /// `None` unless `id` is an element.
    pub fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        let node = doc.get(id)?;
        matches!(node.data, NodeData::Element { .. }).then_some(Self { doc, id, node })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Nearest element among the siblings reached by `step`.
    fn sibling(&self, step: fn(&Node) -> NodeId) -> Option<Self> {
        let mut current = step(self.node);
        while let Some(node) = self.doc.get(current) {
            if let Some(element) = Self::new(self.doc, current) {
                return Some(element);
            }
            current = step(node);
        }
        None
    }

    fn local_name(&self) -> Option<&'a LocalName> {
        match &self.node.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {:?}", self.local_name().map_or("", |n| n.as_ref()), self.id)
    }
}

impl Element for ElementRef<'_> {
    type Impl = OutlineSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        Self::new(self.doc, self.node.parent)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling(|n| n.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling(|n| n.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .element_children(self.id)
            .find_map(|child| Self::new(self.doc, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssName) -> bool {
        self.local_name() == Some(&name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.doc.element_namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.local_name() == other.local_name()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssName,
        operation: &AttrSelectorOperation<&CssName>,
    ) -> bool {
        let NodeData::Element { attrs, .. } = &self.node.data else {
            return false;
        };
        attrs.iter().any(|attr| {
            attr.name.local == local_name.0
                && match ns {
                    NamespaceConstraint::Any => true,
                    NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
                }
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &Unsupported,
        _context: &mut MatchingContext<'_, OutlineSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &Unsupported,
        _context: &mut MatchingContext<'_, OutlineSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .attr(self.id, "id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.as_ref().as_bytes()))
    }

    fn has_class(&self, name: &CssName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .element_classes(self.id)
            .iter()
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.as_ref().as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssName) -> Option<CssName> {
        None
    }

    fn is_part(&self, _name: &CssName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.id).all(|child| match self.doc.get(child).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => false,
            Some(NodeData::Text(text)) => text.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.doc
            .get(self.node.parent)
            .is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
