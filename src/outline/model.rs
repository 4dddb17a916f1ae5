//! Row-addressable view over an [`OutlineTree`].
//!
//! Positions are [`Handle`]s. The root has no handle: it is `None` wherever
//! a parent is expected or returned, matching the invalid index of a tree
//! widget's item model.

use super::location::Location;
use super::tree::{Kind, OutlineId, OutlineTree};
use crate::dom::Document;
use crate::view::{DocumentView, TreeView};

/// Opaque position of an outline row.
///
/// Invalidated by any rebuild of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    row: usize,
    node: OutlineId,
}

impl Handle {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        0
    }

    pub fn node(&self) -> OutlineId {
        self.node
    }
}

/// What a view asks [`OutlineModel::data`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Display,
    Edit,
    ToolTip,
}

/// Outline of a document's `<body>`.
#[derive(Debug, Clone, Default)]
pub struct OutlineModel {
    tree: Option<OutlineTree>,
}

impl OutlineModel {
    /// Build the model; an empty model if the document has no body.
    pub fn new(doc: &Document) -> Self {
        Self {
            tree: OutlineTree::from_document(doc),
        }
    }

    pub fn from_tree(tree: OutlineTree) -> Self {
        Self { tree: Some(tree) }
    }

    pub fn tree(&self) -> Option<&OutlineTree> {
        self.tree.as_ref()
    }

    /// The node a handle addresses, or the root for `None`.
    pub fn item(&self, index: Option<Handle>) -> Option<OutlineId> {
        let tree = self.tree.as_ref()?;
        match index {
            Some(handle) => tree.node(handle.node).map(|_| handle.node),
            None => Some(tree.root()),
        }
    }

    pub fn column_count(&self) -> usize {
        1
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<Handle>) -> Option<Handle> {
        if column > 0 {
            return None;
        }
        let tree = self.tree.as_ref()?;
        let owner = self.item(parent)?;
        let node = tree.child_at(owner, row)?;
        Some(Handle { row, node })
    }

    /// Handle of the child's parent within the grandparent.
    ///
    /// `None` for top-level rows, whose parent is the root.
    pub fn parent(&self, child: Handle) -> Option<Handle> {
        let tree = self.tree.as_ref()?;
        let parent = tree.parent(child.node)?;
        let owner = tree.parent(parent)?;
        let row = tree.index_of(owner, parent)?;
        Some(Handle { row, node: parent })
    }

    pub fn row_count(&self, parent: Option<Handle>) -> usize {
        match (self.tree.as_ref(), self.item(parent)) {
            (Some(tree), Some(owner)) => tree.child_count(owner),
            _ => 0,
        }
    }

    pub fn has_children(&self, parent: Option<Handle>) -> bool {
        self.row_count(parent) > 0
    }

    /// Display text for [`Role::Display`]; nothing for any other role.
    pub fn data(&self, index: Handle, role: Role) -> Option<String> {
        if role != Role::Display {
            return None;
        }
        self.tree.as_ref()?.display_text(index.node)
    }

    /// Expand the top-level `div.body` rows (not named bodies).
    pub fn expand_bodies(&self, view: &mut impl TreeView<Handle>) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        for row in 0..self.row_count(None) {
            if let Some(handle) = self.index(row, 0, None)
                && tree.node(handle.node).is_some_and(|n| n.kind == Kind::Body)
            {
                view.expand(handle);
            }
        }
    }

    /// Scroll the document to a row's element, put the cursor there and
    /// focus the document view.
    ///
    /// Does nothing for a handle whose element is detached.
    pub fn select(&self, doc: &Document, index: Handle, view: &mut impl DocumentView) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let Some(path) = tree.selector_path(doc, index.node) else {
            log::debug!("row {} is detached from the document", index.row);
            return;
        };
        view.scroll_to(&path);
        view.set_cursor(&path);
        view.set_focus();
    }

    /// Resolve a location descriptor to the deepest row it reaches.
    ///
    /// Each step indexes the direct-content children of the current node.
    /// The walk stops at the first out-of-range step; `None` means not even
    /// the first step resolved.
    pub fn locate(&self, location: &str) -> Option<Handle> {
        self.locate_parsed(&Location::parse(location))
    }

    pub fn locate_parsed(&self, location: &Location) -> Option<Handle> {
        let tree = self.tree.as_ref()?;
        let mut current = tree.root();
        let mut found = None;

        for key in location.indexes() {
            let Some(child) = tree.content_at(current, key) else {
                log::debug!("location {location} stops at content index {key}");
                break;
            };
            let row = tree.index_of(current, child)?;
            found = Some(Handle { row, node: child });
            current = child;
        }

        found
    }

    /// Handle for an outline node, if it is not the root.
    pub fn handle_of(&self, node: OutlineId) -> Option<Handle> {
        let tree = self.tree.as_ref()?;
        let parent = tree.parent(node)?;
        let row = tree.index_of(parent, node)?;
        Some(Handle { row, node })
    }

    /// Follow the document view's cursor: locate it, make it current and
    /// expand it.
    pub fn sync_to_view(
        &self,
        document: &impl DocumentView,
        tree_view: &mut impl TreeView<Handle>,
    ) -> Option<Handle> {
        let found = self.locate(&document.location());
        tree_view.set_current(found);
        if let Some(handle) = found {
            tree_view.expand(handle);
        }
        found
    }
}
