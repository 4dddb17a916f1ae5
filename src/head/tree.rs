//! Header tree: the `div.description` region of a rendered book.
//!
//! Header elements are `div`s named by their `class` (`title-info`,
//! `author`, `first-name`, ...) and `img`s, which become `image` nodes.
//! As in the outline, other elements are transparent wrappers.
//!
//! Unlike the outline, the header tree is edited in place. Removed nodes
//! leave an empty slot so the ids of the remaining nodes stay valid.

use super::hints::hint;
use crate::dom::{Document, NodeId, html_name};
use crate::outline::url_path;
use crate::util::simplified;

/// Index of a node within a [`HeadTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadId(pub u32);

impl HeadId {
    /// The `div.description` element.
    pub const ROOT: HeadId = HeadId(0);
}

#[derive(Debug, Clone)]
pub struct HeadNode {
    pub element: NodeId,
    /// Lowercased `class` of a `div`, `image` for an `img`.
    pub name: String,
    /// Name of the containing header node; empty for the root.
    pub id: String,
    /// Cached display value, see [`HeadTree::value`].
    pub text: String,
    pub parent: Option<HeadId>,
    pub children: Vec<HeadId>,
}

impl HeadNode {
    pub fn hint(&self) -> &'static str {
        hint(&self.name, &self.id)
    }

    /// `"<name> hint"`, the key column of the header view.
    pub fn key_text(&self) -> String {
        format!("<{}> {}", self.name, self.hint())
    }

    /// Free-text nodes whose children are not shown in the tree.
    fn is_opaque(name: &str) -> bool {
        matches!(name, "annotation" | "history")
    }
}

/// Header element name of a document element, if it is one.
pub fn head_name(doc: &Document, element: NodeId) -> Option<String> {
    let tag: &str = doc.tag_name(element)?;
    if tag.eq_ignore_ascii_case("img") {
        return Some("image".to_string());
    }
    if !tag.eq_ignore_ascii_case("div") {
        return None;
    }
    let class = doc.attr(element, "class").unwrap_or_default().to_lowercase();
    if class.is_empty() {
        Some("div".to_string())
    } else {
        Some(class)
    }
}

#[derive(Debug, Clone)]
pub struct HeadTree {
    nodes: Vec<Option<HeadNode>>,
}

impl HeadTree {
    /// Build the header tree from the document's first `div.description`.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let Some(root) = doc.find(|id, _| {
            doc.tag_name(id).is_some_and(|t| t.as_ref() == "div")
                && head_name(doc, id).as_deref() == Some("description")
        }) else {
            log::debug!("document has no description, header is empty");
            return None;
        };
        Some(Self::build(doc, root))
    }

    /// Build the header tree rooted at an arbitrary element.
    pub fn build(doc: &Document, root: NodeId) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push_node(doc, root, None);
        log::debug!("built header tree with {} nodes", tree.len());
        tree
    }

    fn push_node(&mut self, doc: &Document, element: NodeId, parent: Option<HeadId>) -> HeadId {
        let name = head_name(doc, element).unwrap_or_default();
        let id = parent
            .and_then(|p| self.node(p))
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let head_id = HeadId(self.nodes.len() as u32);
        self.nodes.push(Some(HeadNode {
            element,
            name: name.clone(),
            id,
            text: String::new(),
            parent,
            children: Vec::new(),
        }));

        if !HeadNode::is_opaque(&name) {
            self.add_children(doc, head_id, element);
        }
        let text = self.value(doc, head_id);
        if let Some(node) = self.node_mut(head_id) {
            node.text = text;
        }
        head_id
    }

    fn add_children(&mut self, doc: &Document, owner: HeadId, element: NodeId) {
        for child in doc.element_children(element) {
            if head_name(doc, child).is_some() {
                let id = self.push_node(doc, child, Some(owner));
                if let Some(node) = self.node_mut(owner) {
                    node.children.push(id);
                }
            } else {
                self.add_children(doc, owner, child);
            }
        }
    }

    /// Display value of a node, computed from the document and the cached
    /// values of its children.
    ///
    /// * `author`, `translator`: `last first middle`, or the nickname
    /// * `coverpage`: the values of its images, comma separated
    /// * `image`: path or fragment of `href`/`src`
    /// * `sequence`: `name`, plus `, #number` for a non-zero number
    /// * free text and leaves: simplified text; other containers: empty
    pub fn value(&self, doc: &Document, id: HeadId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let element = node.element;

        match node.name.as_str() {
            "author" | "translator" => {
                let full = simplified(&format!(
                    "{} {} {}",
                    self.sub(id, "last-name").unwrap_or_default(),
                    self.sub(id, "first-name").unwrap_or_default(),
                    self.sub(id, "middle-name").unwrap_or_default(),
                ));
                if full.is_empty() {
                    self.sub(id, "nickname").unwrap_or_default().to_string()
                } else {
                    full
                }
            }
            "coverpage" => node
                .children
                .iter()
                .filter_map(|&c| self.node(c))
                .filter(|c| c.name == "image")
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "image" => doc
                .attr(element, "href")
                .or_else(|| doc.attr(element, "src"))
                .map(url_path)
                .unwrap_or_default(),
            "sequence" => {
                let name = doc.attr(element, "name").unwrap_or_default().trim();
                match doc.attr(element, "number").map(str::trim) {
                    Some(number) if !number.is_empty() && number != "0" => {
                        format!("{name}, #{number}")
                    }
                    _ => name.to_string(),
                }
            }
            name if HeadNode::is_opaque(name) || node.children.is_empty() => {
                simplified(&doc.plain_text(element))
            }
            _ => String::new(),
        }
    }

    /// Cached value of the first child named `key`.
    pub fn sub(&self, id: HeadId, key: &str) -> Option<&str> {
        self.node(id)?
            .children
            .iter()
            .filter_map(|&c| self.node(c))
            .find(|c| c.name == key)
            .map(|c| c.text.as_str())
    }

    /// Recompute the cached value of a node and all its ancestors.
    fn refresh(&mut self, doc: &Document, id: HeadId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let text = self.value(doc, id);
            let Some(node) = self.node_mut(id) else {
                return;
            };
            node.text = text;
            current = node.parent;
        }
    }

    pub fn root(&self) -> HeadId {
        HeadId::ROOT
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a live node. `None` for removed or out-of-range ids.
    pub fn node(&self, id: HeadId) -> Option<&HeadNode> {
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    fn node_mut(&mut self, id: HeadId) -> Option<&mut HeadNode> {
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn child_at(&self, id: HeadId, row: usize) -> Option<HeadId> {
        self.node(id)?.children.get(row).copied()
    }

    pub fn child_count(&self, id: HeadId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn parent(&self, id: HeadId) -> Option<HeadId> {
        self.node(id)?.parent
    }

    pub fn index_of(&self, parent: HeadId, child: HeadId) -> Option<usize> {
        self.node(parent)?.children.iter().position(|&c| c == child)
    }

    /// Append a new `name` element as the last child of `parent`.
    ///
    /// The document gets a `div class=name` (an `img` for `image`) at the
    /// end of the parent element.
    pub fn append(&mut self, doc: &mut Document, parent: HeadId, name: &str) -> Option<HeadId> {
        let parent_node = self.node(parent)?;
        let parent_element = parent_node.element;
        let scope = parent_node.name.clone();

        let element = if name == "image" {
            doc.create_element(html_name("img"), Vec::new())
        } else {
            let element = doc.create_element(html_name("div"), Vec::new());
            doc.set_attr(element, "class", name);
            element
        };
        doc.append(parent_element, element);

        let id = HeadId(self.nodes.len() as u32);
        self.nodes.push(Some(HeadNode {
            element,
            name: name.to_string(),
            id: scope,
            text: String::new(),
            parent: Some(parent),
            children: Vec::new(),
        }));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        self.refresh(doc, id);

        log::debug!("appended <{name}> to header node {}", parent.0);
        Some(id)
    }

    /// Remove a node and its subtree from the tree and the document.
    ///
    /// The root cannot be removed.
    pub fn remove(&mut self, doc: &mut Document, id: HeadId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(node) = self.node(id) else {
            return false;
        };
        doc.detach(node.element);

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(current.0 as usize)
                && let Some(removed) = slot.take()
            {
                stack.extend(removed.children);
            }
        }

        self.refresh(doc, parent);
        true
    }

    /// Replace the text of a leaf node in the document and refresh the
    /// cached values up to the root.
    ///
    /// Returns false for containers and images, whose values are derived.
    pub fn set_text(&mut self, doc: &mut Document, id: HeadId, text: &str) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.children.is_empty() || node.name == "image" {
            return false;
        }
        doc.set_text(node.element, text);
        self.refresh(doc, id);
        true
    }

    /// Serializable snapshot of the subtree rooted at `id`.
    pub fn snapshot(&self, id: HeadId) -> Option<HeadEntry> {
        let node = self.node(id)?;
        Some(HeadEntry {
            name: node.name.clone(),
            hint: node.hint().to_string(),
            value: node.text.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.snapshot(c))
                .collect(),
        })
    }
}

/// Owned, serializable copy of a header subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct HeadEntry {
    pub name: String,
    pub hint: String,
    pub value: String,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<HeadEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const HEAD: &str = r##"<body>
        <div class="description">
            <div class="title-info">
                <div class="genre">sf_social</div>
                <div class="author">
                    <div class="first-name">Arkady</div>
                    <div class="last-name">Strugatsky</div>
                </div>
                <div class="book-title">Roadside   Picnic</div>
                <div class="annotation"><p>First</p><p>Second</p></div>
                <div class="coverpage"><img src="#cover.jpg"><img src="#back.jpg"></div>
                <div class="lang">ru</div>
                <div class="sequence" name="Noon Universe" number="3"></div>
            </div>
            <div class="document-info">
                <div class="author"><div class="nickname">scanner</div></div>
            </div>
        </div>
        <div class="body"><div class="title"><p>Body</p></div></div>
    </body>"##;

    fn head(html: &str) -> (Document, HeadTree) {
        let doc = parse_html(html);
        let tree = HeadTree::from_document(&doc).unwrap();
        (doc, tree)
    }

    fn names(tree: &HeadTree, id: HeadId) -> Vec<String> {
        tree.node(id)
            .unwrap()
            .children
            .iter()
            .map(|&c| tree.node(c).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_structure() {
        let (_, tree) = head(HEAD);
        assert_eq!(names(&tree, tree.root()), vec!["title-info", "document-info"]);

        let title_info = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(
            names(&tree, title_info),
            vec![
                "genre",
                "author",
                "book-title",
                "annotation",
                "coverpage",
                "lang",
                "sequence"
            ]
        );
        let author = tree.child_at(title_info, 1).unwrap();
        assert_eq!(tree.node(author).unwrap().id, "title-info");
        assert_eq!(tree.node(tree.root()).unwrap().id, "");
    }

    #[test]
    fn test_values() {
        let (_, tree) = head(HEAD);
        let title_info = tree.child_at(tree.root(), 0).unwrap();
        let text = |row| tree.node(tree.child_at(title_info, row).unwrap()).unwrap().text.clone();

        assert_eq!(text(0), "sf_social");
        assert_eq!(text(1), "Strugatsky Arkady");
        assert_eq!(text(2), "Roadside Picnic");
        assert_eq!(text(3), "First Second");
        assert_eq!(text(4), "cover.jpg, back.jpg");
        assert_eq!(text(6), "Noon Universe, #3");
        assert_eq!(tree.node(title_info).unwrap().text, "");

        let document_info = tree.child_at(tree.root(), 1).unwrap();
        let file_author = tree.child_at(document_info, 0).unwrap();
        assert_eq!(tree.node(file_author).unwrap().text, "scanner");
        assert_eq!(tree.node(file_author).unwrap().hint(), "File author");
    }

    #[test]
    fn test_annotation_is_not_expanded() {
        let (_, tree) = head(HEAD);
        let title_info = tree.child_at(tree.root(), 0).unwrap();
        let annotation = tree.child_at(title_info, 3).unwrap();
        assert_eq!(tree.child_count(annotation), 0);
    }

    #[test]
    fn test_sequence_without_number() {
        let (_, tree) = head(
            r#"<div class="description"><div class="sequence" name="S" number="0"></div></div>"#,
        );
        let sequence = tree.child_at(tree.root(), 0).unwrap();
        assert_eq!(tree.node(sequence).unwrap().text, "S");
    }

    #[test]
    fn test_append_and_remove_write_through() {
        let (mut doc, mut tree) = head(HEAD);
        let title_info = tree.child_at(tree.root(), 0).unwrap();

        let author = tree.append(&mut doc, title_info, "author").unwrap();
        assert_eq!(tree.index_of(title_info, author), Some(7));
        assert_eq!(tree.node(author).unwrap().id, "title-info");

        let rebuilt = HeadTree::from_document(&doc).unwrap();
        let rebuilt_info = rebuilt.child_at(rebuilt.root(), 0).unwrap();
        assert_eq!(names(&rebuilt, rebuilt_info).last().unwrap(), "author");

        assert!(tree.remove(&mut doc, author));
        assert_eq!(tree.child_count(title_info), 7);
        assert!(tree.node(author).is_none());

        let rebuilt = HeadTree::from_document(&doc).unwrap();
        let rebuilt_info = rebuilt.child_at(rebuilt.root(), 0).unwrap();
        assert_eq!(rebuilt.child_count(rebuilt_info), 7);
    }

    #[test]
    fn test_remove_subtree_and_root() {
        let (mut doc, mut tree) = head(HEAD);
        let before = tree.len();
        let title_info = tree.child_at(tree.root(), 0).unwrap();
        let author = tree.child_at(title_info, 1).unwrap();
        let first_name = tree.child_at(author, 0).unwrap();

        assert!(tree.remove(&mut doc, author));
        assert!(tree.node(first_name).is_none());
        assert_eq!(tree.len(), before - 3);

        assert!(!tree.remove(&mut doc, tree.root()));
        assert!(!tree.remove(&mut doc, author));
    }

    #[test]
    fn test_set_text_refreshes_ancestors() {
        let (mut doc, mut tree) = head(HEAD);
        let title_info = tree.child_at(tree.root(), 0).unwrap();
        let author = tree.child_at(title_info, 1).unwrap();
        let first_name = tree.child_at(author, 0).unwrap();

        assert!(tree.set_text(&mut doc, first_name, "Boris"));
        assert_eq!(tree.node(first_name).unwrap().text, "Boris");
        assert_eq!(tree.node(author).unwrap().text, "Strugatsky Boris");

        assert!(!tree.set_text(&mut doc, author, "nope"));

        let rebuilt = HeadTree::from_document(&doc).unwrap();
        let info = rebuilt.child_at(rebuilt.root(), 0).unwrap();
        let author = rebuilt.child_at(info, 1).unwrap();
        assert_eq!(rebuilt.node(author).unwrap().text, "Strugatsky Boris");
    }

    #[test]
    fn test_append_image_updates_coverpage() {
        let (mut doc, mut tree) = head(HEAD);
        let title_info = tree.child_at(tree.root(), 0).unwrap();
        let coverpage = tree.child_at(title_info, 4).unwrap();

        let image = tree.append(&mut doc, coverpage, "image").unwrap();
        let element = tree.node(image).unwrap().element;
        assert_eq!(doc.tag_name(element).unwrap().as_ref(), "img");

        doc.set_attr(element, "src", "#spine.png");
        tree.refresh(&doc, image);
        assert_eq!(
            tree.node(coverpage).unwrap().text,
            "cover.jpg, back.jpg, spine.png"
        );
    }

    #[test]
    fn test_head_name() {
        let mut doc = Document::new();
        let image = doc.create_element(html_name("IMG"), Vec::new());
        let bare = doc.create_element(html_name("Div"), Vec::new());
        let para = doc.create_element(html_name("p"), Vec::new());
        let genre = doc.create_element(html_name("div"), Vec::new());
        doc.set_attr(genre, "class", "Genre");

        assert_eq!(head_name(&doc, image).as_deref(), Some("image"));
        assert_eq!(head_name(&doc, bare).as_deref(), Some("div"));
        assert_eq!(head_name(&doc, genre).as_deref(), Some("genre"));
        assert_eq!(head_name(&doc, para), None);
    }

    #[test]
    fn test_missing_description() {
        let doc = parse_html("<body><div class=\"body\"></div></body>");
        assert!(HeadTree::from_document(&doc).is_none());
    }

    #[test]
    fn test_snapshot() {
        let (_, tree) = head(HEAD);
        let snapshot = tree.snapshot(tree.root()).unwrap();
        assert_eq!(snapshot.name, "description");
        assert_eq!(snapshot.children[0].hint, "Book");
        assert_eq!(snapshot.children[0].children[1].value, "Strugatsky Arkady");
    }
}
