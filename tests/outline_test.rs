//! Outline model tests against a rendered book.
//!
//! The fixture is the HTML rendering of a FictionBook with a description,
//! a main body and a notes body.

use fb2outline::dom::{Document, parse_html};
use fb2outline::outline::{Handle, Kind, Location, OutlineModel, Role, SelectorPath};
use fb2outline::view::{DocumentView, TreeView};

const BOOK: &str = include_str!("fixtures/roadside.html");

fn load() -> (Document, OutlineModel) {
    let doc = parse_html(BOOK);
    let model = OutlineModel::new(&doc);
    (doc, model)
}

fn texts(model: &OutlineModel, parent: Option<Handle>) -> Vec<String> {
    (0..model.row_count(parent))
        .filter_map(|row| model.index(row, 0, parent))
        .filter_map(|h| model.data(h, Role::Display))
        .collect()
}

#[derive(Default)]
struct Editor {
    location: String,
    scrolled: Option<String>,
    cursor: Option<String>,
    focused: bool,
    expanded: Vec<Handle>,
    current: Option<Handle>,
}

impl DocumentView for Editor {
    fn scroll_to(&mut self, target: &SelectorPath) {
        self.scrolled = Some(target.to_string());
    }

    fn set_cursor(&mut self, target: &SelectorPath) {
        self.cursor = Some(target.to_string());
    }

    fn set_focus(&mut self) {
        self.focused = true;
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

impl TreeView<Handle> for Editor {
    fn expand(&mut self, index: Handle) {
        self.expanded.push(index);
    }

    fn set_current(&mut self, index: Option<Handle>) {
        self.current = index;
    }
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_top_level_rows() {
    let (_, model) = load();
    assert_eq!(
        texts(&model, None),
        vec![
            "<description> ",
            "<body> Roadside Picnic ",
            "<body name=notes> "
        ]
    );
}

#[test]
fn test_main_body_rows() {
    let (_, model) = load();
    let body = model.index(1, 0, None).unwrap();
    assert_eq!(
        texts(&model, Some(body)),
        vec![
            "<title> Roadside Picnic",
            "<epigraph> ",
            "<section> 1. Redrick Schuhart, age 23 ",
            "<section> 2. Redrick Schuhart, age 28 "
        ]
    );

    let first = model.index(2, 0, Some(body)).unwrap();
    assert_eq!(
        texts(&model, Some(first)),
        vec![
            "<title> 1. Redrick Schuhart, age 23",
            "<img> images/zone.png",
            "<section> The Institute "
        ]
    );

    let second = model.index(3, 0, Some(body)).unwrap();
    assert_eq!(
        texts(&model, Some(second)),
        vec![
            "<title> 2. Redrick Schuhart, age 28",
            "<img> images/wrapped.png",
            "<subtitle> Evening"
        ]
    );
}

#[test]
fn test_kinds() {
    let (_, model) = load();
    let tree = model.tree().unwrap();
    let kind = |handle: Handle| tree.node(handle.node()).unwrap().kind.clone();

    let body = model.index(1, 0, None).unwrap();
    let notes = model.index(2, 0, None).unwrap();
    assert_eq!(kind(body), Kind::Body);
    assert_eq!(kind(notes), Kind::NamedBody("notes".to_string()));
    assert_eq!(kind(model.index(0, 0, Some(body)).unwrap()), Kind::Title);
}

// ============================================================================
// Locations and selectors
// ============================================================================

#[test]
fn test_locate_engine_location() {
    let (_, model) = load();
    let zone = model.locate("HTML=0,DIV=1,DIV=2,IMG=1").unwrap();
    assert_eq!(model.data(zone, Role::Display).unwrap(), "<img> images/zone.png");

    let tree = model.tree().unwrap();
    assert_eq!(
        tree.location_of(zone.node()).unwrap().to_string(),
        "DIV=1,DIV=2,IMG=1"
    );
}

#[test]
fn test_wrapped_image_has_no_location() {
    let (_, model) = load();
    let body = model.index(1, 0, None).unwrap();
    let second = model.index(3, 0, Some(body)).unwrap();
    let wrapped = model.index(1, 0, Some(second)).unwrap();
    let subtitle = model.index(2, 0, Some(second)).unwrap();

    let tree = model.tree().unwrap();
    assert_eq!(tree.location_of(wrapped.node()), None);

    // The subtitle is the second direct-content child but the third row.
    let location = tree.location_of(subtitle.node()).unwrap();
    assert_eq!(location.to_string(), "DIV=1,DIV=3,DIV=1");
    assert_eq!(model.locate_parsed(&location), Some(subtitle));
}

#[test]
fn test_locate_partial_and_malformed() {
    let (_, model) = load();
    let body = model.index(1, 0, None).unwrap();

    assert_eq!(model.locate("DIV=1,DIV=99"), Some(body));
    assert_eq!(model.locate("DIV=1,DIV=x,DIV=0"), Some(body));
    assert_eq!(model.locate("DIV=7"), None);
    assert_eq!(model.locate(""), None);
    assert_eq!(model.locate("garbage"), None);
}

#[test]
fn test_selector_path_round_trip() {
    let (doc, model) = load();
    let tree = model.tree().unwrap();

    for (id, node) in tree.iter() {
        let path = tree.selector_path(&doc, id).unwrap();
        assert_eq!(path.resolve(&doc), Some(node.element), "{path}");
    }

    let zone = model.locate("DIV=1,DIV=2,IMG=1").unwrap();
    let path = tree.selector_path(&doc, zone.node()).unwrap();
    assert_eq!(
        path.to_string(),
        ":root > :nth-child(2) > :nth-child(2) > :nth-child(3) > :nth-child(3)"
    );
}

#[test]
fn test_selector_path_resolves_every_element() {
    let (doc, _) = load();
    let mut elements = Vec::new();
    doc.find(|id, _| {
        if doc.is_element(id) {
            elements.push(id);
        }
        false
    });
    assert!(elements.len() > 40);

    for element in elements {
        let path = SelectorPath::of(&doc, element).unwrap();
        assert_eq!(path.resolve(&doc), Some(element), "{path}");
    }
}

#[test]
fn test_location_text_round_trip() {
    let location: Location = "DIV=1, DIV=2 ,IMG=1".parse().unwrap();
    assert_eq!(location.to_string(), "DIV=1,DIV=2,IMG=1");
    assert_eq!(Location::parse(&location.to_string()), location);
}

// ============================================================================
// View seam
// ============================================================================

#[test]
fn test_select_and_sync() {
    let (doc, model) = load();
    let mut editor = Editor::default();

    let body = model.index(1, 0, None).unwrap();
    let institute_section = {
        let first = model.index(2, 0, Some(body)).unwrap();
        model.index(2, 0, Some(first)).unwrap()
    };
    model.select(&doc, institute_section, &mut editor);
    assert!(editor.focused);
    assert_eq!(editor.scrolled, editor.cursor);
    let selector = editor.cursor.clone().unwrap();
    let element = doc.select_first(&selector).unwrap();
    assert_eq!(doc.attr(element, "class"), Some("section"));

    editor.location = "HTML=0,DIV=1,DIV=2,DIV=2".to_string();
    let mut tree_view = Editor::default();
    let found = model.sync_to_view(&editor, &mut tree_view);
    assert_eq!(found, Some(institute_section));
    assert_eq!(tree_view.current, Some(institute_section));
    assert_eq!(tree_view.expanded, vec![institute_section]);
}

#[test]
fn test_expand_bodies() {
    let (_, model) = load();
    let mut editor = Editor::default();
    model.expand_bodies(&mut editor);
    assert_eq!(editor.expanded, vec![model.index(1, 0, None).unwrap()]);
}

#[test]
fn test_select_detached_row() {
    let (mut doc, model) = load();
    let body = model.index(1, 0, None).unwrap();
    let element = model.tree().unwrap().node(body.node()).unwrap().element;
    doc.detach(element);

    let mut editor = Editor::default();
    model.select(&doc, body, &mut editor);
    assert!(!editor.focused);
    assert_eq!(editor.cursor, None);
}
