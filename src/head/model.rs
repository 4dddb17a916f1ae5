//! Row-addressable view over a [`HeadTree`], with schema lookups.

use super::tree::{HeadId, HeadTree};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::outline::Role;
use crate::scheme::{Scheme, SchemeId};
use crate::view::TreeView;

/// Columns of the header view.
pub const COLUMNS: [&str; 5] = ["Key", "Value", "Info", "Type", "Id"];

/// Column holding the editable value.
pub const VALUE_COLUMN: usize = 1;

/// Opaque position of a header cell.
///
/// Invalidated by `remove` of the row or any ancestor, and by a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    row: usize,
    column: usize,
    node: HeadId,
}

impl Handle {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn node(&self) -> HeadId {
        self.node
    }

    /// The same row at another column.
    pub fn sibling(&self, column: usize) -> Option<Handle> {
        (column < COLUMNS.len()).then_some(Handle { column, ..*self })
    }
}

/// What a view may do with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub editable: bool,
}

/// Header of a document, checked against a FictionBook [`Scheme`].
#[derive(Debug, Clone)]
pub struct HeadModel<'s> {
    tree: Option<HeadTree>,
    scheme: &'s Scheme,
}

impl<'s> HeadModel<'s> {
    /// Build the model; an empty model if the document has no description.
    pub fn new(doc: &Document, scheme: &'s Scheme) -> Self {
        Self {
            tree: HeadTree::from_document(doc),
            scheme,
        }
    }

    pub fn tree(&self) -> Option<&HeadTree> {
        self.tree.as_ref()
    }

    pub fn scheme(&self) -> &'s Scheme {
        self.scheme
    }

    /// The node a handle addresses, or the root for `None`.
    pub fn item(&self, index: Option<Handle>) -> Option<HeadId> {
        let tree = self.tree.as_ref()?;
        match index {
            Some(handle) => tree.node(handle.node).map(|_| handle.node),
            None => Some(tree.root()),
        }
    }

    pub fn column_count(&self) -> usize {
        COLUMNS.len()
    }

    pub fn header_data(&self, section: usize) -> Option<&'static str> {
        COLUMNS.get(section).copied()
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<Handle>) -> Option<Handle> {
        if column >= COLUMNS.len() || parent.is_some_and(|p| p.column != 0) {
            return None;
        }
        let tree = self.tree.as_ref()?;
        let owner = self.item(parent)?;
        let node = tree.child_at(owner, row)?;
        Some(Handle { row, column, node })
    }

    /// Handle of the child's parent, at column 0.
    ///
    /// `None` for top-level rows.
    pub fn parent(&self, child: Handle) -> Option<Handle> {
        let tree = self.tree.as_ref()?;
        let parent = tree.parent(child.node)?;
        let owner = tree.parent(parent)?;
        let row = tree.index_of(owner, parent)?;
        Some(Handle {
            row,
            column: 0,
            node: parent,
        })
    }

    pub fn row_count(&self, parent: Option<Handle>) -> usize {
        if parent.is_some_and(|p| p.column != 0) {
            return 0;
        }
        match (self.tree.as_ref(), self.item(parent)) {
            (Some(tree), Some(owner)) => tree.child_count(owner),
            _ => 0,
        }
    }

    /// Handle for a header node at column 0, if it is not the root.
    pub fn handle_of(&self, node: HeadId) -> Option<Handle> {
        let tree = self.tree.as_ref()?;
        let parent = tree.parent(node)?;
        let row = tree.index_of(parent, node)?;
        Some(Handle {
            row,
            column: 0,
            node,
        })
    }

    /// Schema definition of a node, found by walking the names from the
    /// description root down.
    pub fn scheme_of(&self, node: HeadId) -> Option<SchemeId> {
        let tree = self.tree.as_ref()?;
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = tree.parent(current) {
            path.push(tree.node(current)?.name.as_str());
            current = parent;
        }

        let mut definition = self.scheme.description()?;
        for name in path.into_iter().rev() {
            definition = self.scheme.element(Some(definition), name)?;
        }
        Some(definition)
    }

    /// Text of one cell.
    pub fn text(&self, index: Handle) -> Option<String> {
        let node = self.tree.as_ref()?.node(index.node)?;
        let text = match index.column {
            0 => node.key_text(),
            1 => node.text.clone(),
            2 => self
                .scheme_of(index.node)
                .map(|s| self.scheme.info(s).to_string())
                .unwrap_or_default(),
            3 => self
                .scheme_of(index.node)
                .and_then(|s| self.scheme.type_name(s))
                .unwrap_or_default()
                .to_string(),
            4 => node.id.clone(),
            _ => return None,
        };
        Some(text)
    }

    /// Cell text for display; the value for editing; schema documentation
    /// as a tooltip.
    pub fn data(&self, index: Handle, role: Role) -> Option<String> {
        match role {
            Role::Display => self.text(index),
            Role::Edit if index.column == VALUE_COLUMN => self.text(index),
            Role::ToolTip => self.text(Handle { column: 2, ..index }),
            _ => None,
        }
    }

    /// The value column of a leaf text element is editable.
    pub fn flags(&self, index: Handle) -> ItemFlags {
        let Some(node) = self.tree.as_ref().and_then(|t| t.node(index.node)) else {
            return ItemFlags::default();
        };
        let text_leaf = node.children.is_empty()
            && node.name != "image"
            && self
                .scheme_of(index.node)
                .is_none_or(|s| self.scheme.legal_child_names(s).is_empty());
        ItemFlags {
            enabled: true,
            selectable: true,
            editable: index.column == VALUE_COLUMN && text_leaf,
        }
    }

    /// Apply an edit from the view. Only [`Role::Edit`] on an editable cell
    /// is accepted.
    pub fn set_data(&mut self, doc: &mut Document, index: Handle, value: &str, role: Role) -> bool {
        if role != Role::Edit || !self.flags(index).editable {
            return false;
        }
        self.set_text(doc, index, value)
    }

    /// Element names the schema allows under a node (`None` for the root).
    pub fn allowed_children(&self, parent: Option<Handle>) -> Vec<String> {
        self.item(parent)
            .and_then(|node| self.scheme_of(node))
            .map(|s| self.scheme.legal_child_names(s))
            .unwrap_or_default()
    }

    /// Alternatives offered when adding to a node whose content is a choice,
    /// e.g. `first-name` or `nickname` for an author.
    pub fn alternatives(&self, parent: Option<Handle>) -> Vec<String> {
        self.item(parent)
            .and_then(|node| self.scheme_of(node))
            .and_then(|s| self.scheme.choice_of(s))
            .map(|choice| self.scheme.type_alternatives(choice))
            .unwrap_or_default()
    }

    /// Append a `name` element as the last child of `parent` (`None` for the
    /// root), in the tree and the document.
    ///
    /// No schema check; see [`HeadModel::append_checked`].
    pub fn append(&mut self, doc: &mut Document, parent: Option<Handle>, name: &str) -> Option<Handle> {
        let owner = self.item(parent)?;
        let tree = self.tree.as_mut()?;
        let node = tree.append(doc, owner, name)?;
        let row = tree.child_count(owner).checked_sub(1)?;
        Some(Handle {
            row,
            column: 0,
            node,
        })
    }

    /// [`HeadModel::append`], rejecting names the schema does not allow
    /// under `parent`.
    pub fn append_checked(
        &mut self,
        doc: &mut Document,
        parent: Option<Handle>,
        name: &str,
    ) -> Result<Handle> {
        let owner = self
            .item(parent)
            .ok_or_else(|| Error::NotFound("header row".into()))?;
        let parent_name = self
            .tree
            .as_ref()
            .and_then(|t| t.node(owner))
            .map(|n| n.name.clone())
            .unwrap_or_default();

        if !self.allowed_children(parent).iter().any(|n| n == name) {
            log::warn!("refusing to add <{name}> under <{parent_name}>");
            return Err(Error::NotAllowed {
                parent: parent_name,
                child: name.to_string(),
            });
        }

        self.append(doc, parent, name)
            .ok_or_else(|| Error::NotFound(format!("<{parent_name}>")))
    }

    /// Remove a row and its subtree from the tree and the document.
    pub fn remove(&mut self, doc: &mut Document, index: Handle) -> bool {
        match self.tree.as_mut() {
            Some(tree) => tree.remove(doc, index.node),
            None => false,
        }
    }

    /// Write a leaf's text to the document and refresh cached values.
    pub fn set_text(&mut self, doc: &mut Document, index: Handle, text: &str) -> bool {
        match self.tree.as_mut() {
            Some(tree) => tree.set_text(doc, index.node, text),
            None => false,
        }
    }

    /// Expand the top-level rows and the authors directly below them.
    pub fn expand(&self, view: &mut impl TreeView<Handle>) {
        for row in 0..self.row_count(None) {
            let Some(top) = self.index(row, 0, None) else {
                continue;
            };
            view.expand(top);
            for child_row in 0..self.row_count(Some(top)) {
                if let Some(child) = self.index(child_row, 0, Some(top))
                    && self
                        .tree
                        .as_ref()
                        .and_then(|t| t.node(child.node))
                        .is_some_and(|n| n.name == "author")
                {
                    view.expand(child);
                }
            }
        }
    }
}
