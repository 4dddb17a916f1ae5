//! FictionBook schema catalogue.
//!
//! The header editor needs to know which elements may appear under which
//! container. That knowledge comes from the FictionBook XSD, parsed once
//! into an arena of [`SchemeNode`]s.
//!
//! ```text
//! xs:element name="title-info" type="title-infoType"
//!        │                              │
//!        │ (inline complexType)         ▼ (named type)
//!        ▼                   xs:complexType name="title-infoType"
//!   xs:sequence / xs:choice            └─ xs:sequence
//!        └─ xs:element ...                  └─ xs:element name="genre" ...
//! ```
//!
//! Composite wrappers (`sequence`, `choice`, `complexType`) are transparent
//! for lookups; `type` references are followed to the named complex type.

use std::collections::HashMap;
use std::sync::OnceLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// The packaged FictionBook 2.1 schema (description section in full).
pub const FICTIONBOOK_XSD: &str = include_str!("FictionBook.xsd");

/// Index of a node within a [`Scheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemeId(pub u32);

/// XSD construct a scheme node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsKind {
    Schema,
    Element,
    ComplexType,
    Sequence,
    Choice,
    Annotation,
    Documentation,
    /// Attributes, simple content and anything else not needed for lookups.
    Other,
}

impl XsKind {
    fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"schema" => XsKind::Schema,
            b"element" => XsKind::Element,
            b"complexType" => XsKind::ComplexType,
            b"sequence" => XsKind::Sequence,
            b"choice" => XsKind::Choice,
            b"annotation" => XsKind::Annotation,
            b"documentation" => XsKind::Documentation,
            _ => XsKind::Other,
        }
    }

    /// Wrappers looked through when searching for child elements.
    pub fn is_composite(self) -> bool {
        matches!(self, XsKind::ComplexType | XsKind::Sequence | XsKind::Choice)
    }
}

#[derive(Debug, Clone)]
pub struct SchemeNode {
    pub kind: XsKind,
    /// `name` attribute.
    pub name: Option<String>,
    /// `type` attribute without its namespace prefix.
    pub type_ref: Option<String>,
    /// Text of the `xs:annotation/xs:documentation` child.
    pub doc: String,
    pub parent: Option<SchemeId>,
    pub children: Vec<SchemeId>,
}

/// Parsed schema catalogue. Read-only after parsing.
#[derive(Debug, Clone)]
pub struct Scheme {
    nodes: Vec<SchemeNode>,
    /// Top-level named complex types.
    types: HashMap<String, SchemeId>,
}

static PACKAGED: OnceLock<Scheme> = OnceLock::new();

impl Scheme {
    /// The packaged FictionBook schema, parsed on first use.
    pub fn packaged() -> &'static Scheme {
        PACKAGED.get_or_init(|| match Scheme::parse(FICTIONBOOK_XSD) {
            Ok(scheme) => scheme,
            Err(e) => {
                log::error!("packaged FictionBook schema is invalid: {e}");
                Scheme::empty()
            }
        })
    }

    /// A scheme with only the `xs:schema` root. Every lookup misses.
    pub fn empty() -> Self {
        Scheme {
            nodes: vec![SchemeNode {
                kind: XsKind::Schema,
                name: None,
                type_ref: None,
                doc: String::new(),
                parent: None,
                children: Vec::new(),
            }],
            types: HashMap::new(),
        }
    }

    /// Parse an XSD document.
    pub fn parse(xsd: &str) -> Result<Self> {
        // Untrimmed: documentation text is split around entity references.
        let mut reader = Reader::from_str(xsd);

        let mut scheme = Scheme {
            nodes: Vec::new(),
            types: HashMap::new(),
        };
        let mut stack: Vec<SchemeId> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let id = scheme.open(&e, stack.last().copied())?;
                    stack.push(id);
                }
                Event::Empty(e) => {
                    scheme.open(&e, stack.last().copied())?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(e) => {
                    scheme.push_doc(&stack, &String::from_utf8_lossy(e.as_ref()));
                }
                Event::GeneralRef(e) => {
                    if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                        scheme.push_doc(&stack, &resolved);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match scheme.nodes.first() {
            Some(root) if root.kind == XsKind::Schema => {}
            _ => return Err(Error::InvalidSchema("missing xs:schema root".into())),
        }

        log::debug!(
            "parsed schema: {} nodes, {} named types",
            scheme.nodes.len(),
            scheme.types.len()
        );
        Ok(scheme)
    }

    fn open(&mut self, e: &BytesStart<'_>, parent: Option<SchemeId>) -> Result<SchemeId> {
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(Error::InvalidSchema("more than one root element".into()));
        }

        let mut name = None;
        let mut type_ref = None;
        for attr in e.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            match attr.key.as_ref() {
                b"name" => name = Some(value),
                b"type" => type_ref = Some(strip_prefix(&value).to_string()),
                _ => {}
            }
        }

        let kind = XsKind::from_local_name(e.local_name().as_ref());
        let id = SchemeId(self.nodes.len() as u32);
        self.nodes.push(SchemeNode {
            kind,
            name,
            type_ref,
            doc: String::new(),
            parent,
            children: Vec::new(),
        });

        if let Some(parent) = parent {
            self.nodes[parent.0 as usize].children.push(id);
            let at_top = self.nodes[parent.0 as usize].kind == XsKind::Schema;
            if at_top
                && kind == XsKind::ComplexType
                && let Some(type_name) = self.nodes[id.0 as usize].name.clone()
            {
                self.types.insert(type_name, id);
            }
        }

        Ok(id)
    }

    /// Append documentation text to the node owning the annotation.
    fn push_doc(&mut self, stack: &[SchemeId], text: &str) {
        let [.., owner, annotation, documentation] = stack else {
            return;
        };
        if self.nodes[documentation.0 as usize].kind != XsKind::Documentation
            || self.nodes[annotation.0 as usize].kind != XsKind::Annotation
        {
            return;
        }
        self.nodes[owner.0 as usize].doc.push_str(text);
    }

    pub fn root(&self) -> SchemeId {
        SchemeId(0)
    }

    pub fn node(&self, id: SchemeId) -> Option<&SchemeNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Named top-level complex type.
    pub fn named_type(&self, name: &str) -> Option<SchemeId> {
        self.types.get(strip_prefix(name)).copied()
    }

    /// The `FictionBook/description` element: the header region's root.
    pub fn description(&self) -> Option<SchemeId> {
        let book = self.element(Some(self.root()), "FictionBook")?;
        self.element(Some(book), "description")
    }

    /// Definition of the child element `name` under `from`.
    ///
    /// `None` for `from` starts at the description element. Returns `None`
    /// if no such child is declared.
    pub fn element(&self, from: Option<SchemeId>, name: &str) -> Option<SchemeId> {
        let from = match from {
            Some(id) => id,
            None => self.description()?,
        };

        let found = self.find_element(from, name).or_else(|| {
            self.resolved_type(from)
                .and_then(|ty| self.find_element(ty, name))
        });
        if found.is_none() {
            log::debug!("scheme has no <{name}> under {:?}", self.node(from)?.name);
        }
        found
    }

    fn find_element(&self, id: SchemeId, name: &str) -> Option<SchemeId> {
        for &child in &self.node(id)?.children {
            let node = self.node(child)?;
            match node.kind {
                XsKind::Element if node.name.as_deref() == Some(name) => return Some(child),
                kind if kind.is_composite() => {
                    if let Some(found) = self.find_element(child, name) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// The named complex type an element refers to, if any.
    fn resolved_type(&self, id: SchemeId) -> Option<SchemeId> {
        let node = self.node(id)?;
        if node.kind != XsKind::Element {
            return None;
        }
        self.named_type(node.type_ref.as_deref()?)
    }

    /// Names of the elements allowed directly under `id`.
    ///
    /// Composite wrappers are flattened: a sequence contributes its names in
    /// declaration order, a choice the union of its branches. Duplicates
    /// are dropped, keeping the first position.
    pub fn legal_child_names(&self, id: SchemeId) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(id, &mut names);
        if let Some(ty) = self.resolved_type(id) {
            self.collect_names(ty, &mut names);
        }
        names
    }

    fn collect_names(&self, id: SchemeId, names: &mut Vec<String>) {
        let Some(node) = self.node(id) else {
            return;
        };
        for &child in &node.children {
            let Some(child_node) = self.node(child) else {
                continue;
            };
            match child_node.kind {
                XsKind::Element => {
                    if let Some(name) = &child_node.name
                        && !names.contains(name)
                    {
                        names.push(name.clone());
                    }
                }
                kind if kind.is_composite() => self.collect_names(child, names),
                _ => {}
            }
        }
    }

    /// Alternatives of a `choice`: each branch's element name, or for a
    /// composite branch the first name it allows. Empty for anything that
    /// is not a choice.
    pub fn type_alternatives(&self, id: SchemeId) -> Vec<String> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        if node.kind != XsKind::Choice {
            return Vec::new();
        }

        let mut alternatives: Vec<String> = Vec::new();
        for &branch in &node.children {
            let Some(branch_node) = self.node(branch) else {
                continue;
            };
            let label = match branch_node.kind {
                XsKind::Element => branch_node.name.clone(),
                kind if kind.is_composite() => self.legal_child_names(branch).into_iter().next(),
                _ => None,
            };
            if let Some(label) = label
                && !alternatives.contains(&label)
            {
                alternatives.push(label);
            }
        }
        alternatives
    }

    /// The first `choice` reachable from `id` through wrappers and its type.
    pub fn choice_of(&self, id: SchemeId) -> Option<SchemeId> {
        let node = self.node(id)?;
        if node.kind == XsKind::Choice {
            return Some(id);
        }
        let search = |start: SchemeId| -> Option<SchemeId> {
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                let current_node = self.node(current)?;
                if current_node.kind == XsKind::Choice {
                    return Some(current);
                }
                if current == start || current_node.kind.is_composite() {
                    stack.extend(current_node.children.iter().rev());
                }
            }
            None
        };
        search(id).or_else(|| self.resolved_type(id).and_then(search))
    }

    /// Documentation text of an element, falling back to its type's.
    pub fn info(&self, id: SchemeId) -> &str {
        let Some(node) = self.node(id) else {
            return "";
        };
        if !node.doc.is_empty() {
            return node.doc.trim();
        }
        self.resolved_type(id)
            .and_then(|ty| self.node(ty))
            .map_or("", |ty| ty.doc.trim())
    }

    /// The `type` attribute without namespace prefix.
    pub fn type_name(&self, id: SchemeId) -> Option<&str> {
        self.node(id)?.type_ref.as_deref()
    }
}

fn strip_prefix(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => Some("'".to_string()),
        "quot" => Some("\"".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "amp" => Some("&".to_string()),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code).map(String::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="FictionBook">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="description">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="title-info" type="infoType"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:complexType name="infoType">
    <xs:annotation><xs:documentation>Info &amp; more</xs:documentation></xs:annotation>
    <xs:sequence>
      <xs:element name="b"/>
      <xs:element name="a"/>
      <xs:choice>
        <xs:element name="x"/>
        <xs:sequence>
          <xs:element name="y"/>
          <xs:element name="z"/>
        </xs:sequence>
      </xs:choice>
      <xs:element name="a"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#;

    #[test]
    fn test_fixture_lookup_through_named_type() {
        let scheme = Scheme::parse(FIXTURE).unwrap();
        let info = scheme.element(None, "title-info").unwrap();

        assert_eq!(scheme.type_name(info), Some("infoType"));
        assert_eq!(scheme.legal_child_names(info), vec!["b", "a", "x", "y", "z"]);
        assert!(scheme.element(Some(info), "z").is_some());
        assert_eq!(scheme.element(Some(info), "nope"), None);
        assert_eq!(scheme.info(info), "Info & more");
    }

    #[test]
    fn test_fixture_choice() {
        let scheme = Scheme::parse(FIXTURE).unwrap();
        let info = scheme.element(None, "title-info").unwrap();
        let choice = scheme.choice_of(info).unwrap();

        assert_eq!(scheme.node(choice).unwrap().kind, XsKind::Choice);
        assert_eq!(scheme.legal_child_names(choice), vec!["x", "y", "z"]);
        assert_eq!(scheme.type_alternatives(choice), vec!["x", "y"]);
        assert!(scheme.type_alternatives(info).is_empty());
    }

    #[test]
    fn test_packaged_description() {
        let scheme = Scheme::packaged();
        let description = scheme.description().unwrap();
        assert_eq!(
            scheme.legal_child_names(description),
            vec![
                "title-info",
                "src-title-info",
                "document-info",
                "publish-info",
                "custom-info"
            ]
        );
        assert_eq!(scheme.info(description), "Book description");
    }

    #[test]
    fn test_packaged_author_choice() {
        let scheme = Scheme::packaged();
        let title_info = scheme.element(None, "title-info").unwrap();
        let author = scheme.element(Some(title_info), "author").unwrap();

        assert_eq!(
            scheme.legal_child_names(author),
            vec![
                "first-name",
                "middle-name",
                "last-name",
                "nickname",
                "home-page",
                "email",
                "id"
            ]
        );
        let choice = scheme.choice_of(author).unwrap();
        assert_eq!(scheme.type_alternatives(choice), vec!["first-name", "nickname"]);
        assert_eq!(scheme.info(author), "Author(s) of this book");
    }

    #[test]
    fn test_packaged_same_name_different_containers() {
        let scheme = Scheme::packaged();
        let document_info = scheme.element(None, "document-info").unwrap();
        let publish_info = scheme.element(None, "publish-info").unwrap();

        let doc_publisher = scheme.element(Some(document_info), "publisher").unwrap();
        let pub_publisher = scheme.element(Some(publish_info), "publisher").unwrap();

        assert_ne!(doc_publisher, pub_publisher);
        assert_eq!(scheme.type_name(doc_publisher), Some("authorType"));
        assert_eq!(scheme.type_name(pub_publisher), Some("textFieldType"));
        assert!(scheme.legal_child_names(pub_publisher).is_empty());
    }

    #[test]
    fn test_missing_element_is_none() {
        let scheme = Scheme::packaged();
        assert_eq!(scheme.element(None, "body"), None);
        assert_eq!(scheme.element(Some(SchemeId(u32::MAX)), "x"), None);
        assert!(scheme.legal_child_names(SchemeId(u32::MAX)).is_empty());
    }

    #[test]
    fn test_empty_scheme() {
        let scheme = Scheme::empty();
        assert_eq!(scheme.description(), None);
        assert_eq!(scheme.element(None, "title-info"), None);
    }

    #[test]
    fn test_invalid_schema() {
        assert!(matches!(
            Scheme::parse("<root/>"),
            Err(Error::InvalidSchema(_))
        ));
        assert!(Scheme::parse("<xs:schema><xs:element").is_err());
    }
}
