//! Feeds html5ever's tree builder into the arena.

use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as ParsedAttribute, QualName, local_name, ns};

use super::arena::{Attribute, Document, NodeData, NodeId};

/// Name reported for handles that are not elements.
static NO_NAME: QualName = QualName {
    prefix: None,
    ns: ns!(),
    local: local_name!(""),
};

/// Builds a [`Document`] while html5ever parses.
///
/// The tree builder only hands out `&self`, so the arena sits in a `RefCell`.
#[derive(Default)]
pub struct DocumentSink {
    doc: RefCell<Document>,
    recovered: Cell<usize>,
}

impl DocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_document(self) -> Document {
        match self.recovered.get() {
            0 => {}
            n => log::debug!("html parser recovered from {n} errors"),
        }
        self.doc.into_inner()
    }

    fn insert(&self, child: NodeOrText<NodeId>, place: impl FnOnce(&mut Document, NodeId)) {
        let mut doc = self.doc.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => place(&mut doc, node),
            NodeOrText::AppendText(text) => {
                let node = doc.create_text(text.to_string());
                place(&mut doc, node);
            }
        }
    }
}

fn convert(attrs: Vec<ParsedAttribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|attr| Attribute {
            name: attr.name,
            value: attr.value.to_string(),
        })
        .collect()
}

impl TreeSink for DocumentSink {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        self.recovered.set(self.recovered.get() + 1);
    }

    fn get_document(&self) -> NodeId {
        self.doc.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> Ref<'a, QualName> {
        Ref::map(self.doc.borrow(), |doc| match doc.get(*target).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => name,
            _ => &NO_NAME,
        })
    }

    fn create_element(&self, name: QualName, attrs: Vec<ParsedAttribute>, _: ElementFlags) -> NodeId {
        self.doc.borrow_mut().create_element(name, convert(attrs))
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(data.to_string())
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            // Adjacent text runs merge into one node.
            NodeOrText::AppendText(text) => self.doc.borrow_mut().append_text(*parent, &text),
            node => self.insert(node, |doc, id| doc.append(*parent, id)),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let parent = self.doc.borrow().parent(*element);
        self.append(parent.as_ref().unwrap_or(prev_element), child);
    }

    fn append_doctype_to_document(&self, name: StrTendril, _public: StrTendril, _system: StrTendril) {
        let mut doc = self.doc.borrow_mut();
        let doctype = doc.create_doctype(name.to_string());
        let root = doc.document();
        doc.append(root, doctype);
    }

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        self.insert(new_node, |doc, id| doc.insert_before(*sibling, id));
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<ParsedAttribute>) {
        let mut doc = self.doc.borrow_mut();
        for attr in convert(attrs) {
            let name = attr.name.local.as_ref();
            if doc.attr(*target, name).is_none() {
                doc.set_attr(*target, name, &attr.value);
            }
        }
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn remove_from_parent(&self, target: &NodeId) {
        self.doc.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        self.doc.borrow_mut().reparent_children(*node, *new_parent);
    }
}
