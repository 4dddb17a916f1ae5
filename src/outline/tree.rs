//! Outline tree construction from a parsed document.
//!
//! Only `div` and `img` elements qualify as outline nodes. Every other
//! element is a transparent wrapper: its qualifying descendants attach to the
//! nearest qualifying ancestor.

use percent_encoding::percent_decode_str;

use super::location::{Location, LocationStep, SelectorPath};
use crate::dom::{Document, NodeId};
use crate::util::simplified;

/// Maximum number of characters taken from a title before simplification.
pub const MAX_LABEL_CHARS: usize = 255;

// ============================================================================
// Public Types
// ============================================================================

/// Index of a node within an [`OutlineTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutlineId(pub u32);

impl OutlineId {
    /// The root node (the document's `<body>`).
    pub const ROOT: OutlineId = OutlineId(0);
}

/// Classification of an outline node, computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `div.title`: label is the title text, rolled up into the parent.
    Title,
    /// `div.subtitle`: label is the subtitle text.
    Subtitle,
    /// `div.body` without a `name` attribute.
    Body,
    /// `div.body name="..."`, e.g. notes or comments bodies.
    NamedBody(String),
    /// `img`: label is the path of the `src` URL.
    Image,
    /// Any other qualifying element (sections, epigraphs, the root).
    Container,
}

/// One qualifying element of the document.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    /// The element this node was built from.
    pub element: NodeId,
    /// Lowercased element name.
    pub tag: String,
    /// Lowercased `class` attribute, may be empty.
    pub style: String,
    pub kind: Kind,
    /// Display key: the style-derived key if any, else the tag.
    pub key: String,
    pub label: String,
    pub parent: Option<OutlineId>,
    /// All qualifying descendants attached to this node, in document order.
    pub children: Vec<OutlineId>,
    /// The subset of `children` that are immediate DOM children.
    pub content: Vec<OutlineId>,
}

impl OutlineNode {
    /// `"<key> label"`, the text shown in the outline view.
    pub fn display_text(&self) -> String {
        format!("<{}> {}", self.key, self.label)
    }

    /// Tag, style, kind and display key of an element.
    fn classify(doc: &Document, element: NodeId) -> (String, String, Kind, String) {
        let tag = doc
            .tag_name(element)
            .map(|n| n.as_ref().to_ascii_lowercase())
            .unwrap_or_default();
        let style = doc
            .attr(element, "class")
            .map(str::to_lowercase)
            .unwrap_or_default();

        let (kind, key) = match tag.as_str() {
            "div" => match style.as_str() {
                "title" => (Kind::Title, style.clone()),
                "subtitle" => (Kind::Subtitle, style.clone()),
                "body" => match doc.attr(element, "name").filter(|n| !n.is_empty()) {
                    Some(name) => (
                        Kind::NamedBody(name.to_string()),
                        format!("body name={name}"),
                    ),
                    None => (Kind::Body, style.clone()),
                },
                "" => (Kind::Container, tag.clone()),
                _ => (Kind::Container, style.clone()),
            },
            "img" => (Kind::Image, tag.clone()),
            _ => (Kind::Container, tag.clone()),
        };

        (tag, style, kind, key)
    }
}

/// Whether an element becomes an outline node.
pub fn is_qualifying(doc: &Document, element: NodeId) -> bool {
    doc.tag_name(element).is_some_and(|name| {
        let name: &str = name;
        name.eq_ignore_ascii_case("div") || name.eq_ignore_ascii_case("img")
    })
}

/// Title text of an element: first [`MAX_LABEL_CHARS`] characters of its
/// rendered text, simplified. Paragraphs of a title become words separated by
/// a space.
pub fn title_text(doc: &Document, element: NodeId) -> String {
    let text: String = doc
        .plain_text(element)
        .chars()
        .take(MAX_LABEL_CHARS)
        .collect();
    simplified(&text)
}

/// Path component of an image URL, percent-decoded.
///
/// Fragment-only references (`#cover.jpg`, the usual FictionBook binary
/// reference) have an empty path and yield the fragment instead.
pub fn url_path(src: &str) -> String {
    let src = src.trim();
    let (rest, fragment) = match src.split_once('#') {
        Some((rest, fragment)) => (rest, fragment),
        None => (src, ""),
    };
    let rest = rest.split('?').next().unwrap_or_default();

    let after_scheme = match rest.split_once(':') {
        Some((scheme, tail)) if is_url_scheme(scheme) => tail,
        _ => rest,
    };

    let path = match after_scheme.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map(|pos| &authority_and_path[pos..])
            .unwrap_or_default(),
        None => after_scheme,
    };

    let chosen = if path.is_empty() { fragment } else { path };
    percent_decode_str(chosen).decode_utf8_lossy().into_owned()
}

fn is_url_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// ============================================================================
// Tree
// ============================================================================

/// Arena of outline nodes rooted at the document's `<body>`.
#[derive(Debug, Clone)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
}

impl OutlineTree {
    /// Build the outline of a document, rooted at its `<body>` element.
    ///
    /// Returns `None` when the document has no body.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let body = doc.find_by_tag("body")?;
        Some(Self::build(doc, body))
    }

    /// Build the outline of the subtree rooted at `root`.
    ///
    /// Construction is two-pass: the node tree and each node's own label
    /// first, then title labels rolled up into their parents.
    pub fn build(doc: &Document, root: NodeId) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let root_id = tree.push_node(doc, root, None);
        tree.add_children(doc, root_id, root, true);
        tree.roll_up_titles();
        log::debug!("built outline with {} nodes", tree.nodes.len());
        tree
    }

    fn push_node(&mut self, doc: &Document, element: NodeId, parent: Option<OutlineId>) -> OutlineId {
        let (tag, style, kind, key) = OutlineNode::classify(doc, element);
        let label = match &kind {
            Kind::Title | Kind::Subtitle => title_text(doc, element),
            Kind::Image => doc.attr(element, "src").map(url_path).unwrap_or_default(),
            _ => String::new(),
        };

        let id = OutlineId(self.nodes.len() as u32);
        self.nodes.push(OutlineNode {
            element,
            tag,
            style,
            kind,
            key,
            label,
            parent,
            children: Vec::new(),
            content: Vec::new(),
        });
        id
    }

    fn add_children(&mut self, doc: &Document, owner: OutlineId, element: NodeId, direct: bool) {
        for child in doc.element_children(element) {
            if is_qualifying(doc, child) {
                let id = self.push_node(doc, child, Some(owner));
                let node = &mut self.nodes[owner.0 as usize];
                node.children.push(id);
                if direct {
                    node.content.push(id);
                }
                self.add_children(doc, id, child, true);
            } else {
                self.add_children(doc, owner, child, false);
            }
        }
    }

    /// Append each title's own label, plus a space, to its parent's label.
    ///
    /// Nodes are visited in allocation (document) order and only own labels
    /// are propagated, so a title nested in a title contributes to its
    /// direct parent only. A parent that already has text of its own gets a
    /// separating space first. The root has no row of its own and never
    /// receives a rollup.
    fn roll_up_titles(&mut self) {
        let rollups: Vec<(OutlineId, String)> = self
            .nodes
            .iter()
            .filter(|n| n.kind == Kind::Title)
            .filter_map(|n| n.parent.map(|p| (p, n.label.clone())))
            .filter(|(p, _)| *p != OutlineId::ROOT)
            .collect();

        for (parent, label) in rollups {
            let target = &mut self.nodes[parent.0 as usize].label;
            if !target.is_empty() && !target.ends_with(' ') {
                target.push(' ');
            }
            target.push_str(&label);
            target.push(' ');
        }
    }

    pub fn root(&self) -> OutlineId {
        OutlineId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: OutlineId) -> Option<&OutlineNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Iterate all nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (OutlineId, &OutlineNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (OutlineId(i as u32), n))
    }

    pub fn child_at(&self, id: OutlineId, row: usize) -> Option<OutlineId> {
        self.node(id)?.children.get(row).copied()
    }

    pub fn child_count(&self, id: OutlineId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn parent(&self, id: OutlineId) -> Option<OutlineId> {
        self.node(id)?.parent
    }

    /// Row of `child` within `parent`'s children.
    pub fn index_of(&self, parent: OutlineId, child: OutlineId) -> Option<usize> {
        self.node(parent)?.children.iter().position(|&c| c == child)
    }

    /// The `index`-th direct-content child.
    pub fn content_at(&self, id: OutlineId, index: usize) -> Option<OutlineId> {
        self.node(id)?.content.get(index).copied()
    }

    pub fn display_text(&self, id: OutlineId) -> Option<String> {
        self.node(id).map(OutlineNode::display_text)
    }

    /// Selector path from the document element down to this node's element.
    ///
    /// `None` if the element is no longer attached to the document.
    pub fn selector_path(&self, doc: &Document, id: OutlineId) -> Option<SelectorPath> {
        SelectorPath::of(doc, self.node(id)?.element)
    }

    /// Encode a node's position as a location of direct-content indexes.
    ///
    /// `None` if any node on the path was reached through a wrapper and so
    /// has no content index.
    pub fn location_of(&self, id: OutlineId) -> Option<Location> {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self.node(parent)?.content.iter().position(|&c| c == current)?;
            let key = self.node(current)?.tag.to_ascii_uppercase();
            steps.push(LocationStep { key, index });
            current = parent;
        }
        steps.reverse();
        Some(Location::new(steps))
    }

    /// Serializable snapshot of the subtree rooted at `id`.
    pub fn snapshot(&self, id: OutlineId) -> Option<OutlineEntry> {
        let node = self.node(id)?;
        Some(OutlineEntry {
            key: node.key.clone(),
            label: node.label.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.snapshot(c))
                .collect(),
        })
    }
}

/// Owned, serializable copy of an outline subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OutlineEntry {
    pub key: String,
    pub label: String,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<OutlineEntry>,
}
