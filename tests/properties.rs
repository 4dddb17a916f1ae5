//! Property tests over generated book shapes.

use fb2outline::dom::parse_html;
use fb2outline::outline::{Handle, Location, LocationStep, OutlineModel};
use proptest::prelude::*;

/// A generated body element: an image or a section, optionally wrapped in a
/// non-qualifying element.
#[derive(Debug, Clone)]
enum Shape {
    Image { wrapped: bool },
    Section { wrapped: bool, children: Vec<Shape> },
}

impl Shape {
    fn count(&self) -> usize {
        match self {
            Shape::Image { .. } => 1,
            Shape::Section { children, .. } => 1 + children.iter().map(Shape::count).sum::<usize>(),
        }
    }

    fn render(&self, out: &mut String) {
        let wrapped = match self {
            Shape::Image { wrapped } | Shape::Section { wrapped, .. } => *wrapped,
        };
        if wrapped {
            out.push_str("<blockquote>");
        }
        match self {
            Shape::Image { .. } => out.push_str(r#"<img src="/i.png">"#),
            Shape::Section { children, .. } => {
                out.push_str(r#"<div class="section">"#);
                for child in children {
                    child.render(out);
                }
                out.push_str("</div>");
            }
        }
        if wrapped {
            out.push_str("</blockquote>");
        }
    }
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(|wrapped| Shape::Image { wrapped }),
        any::<bool>().prop_map(|wrapped| Shape::Section {
            wrapped,
            children: Vec::new()
        }),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        (any::<bool>(), prop::collection::vec(inner, 0..4))
            .prop_map(|(wrapped, children)| Shape::Section { wrapped, children })
    })
}

fn book(shapes: &[Shape]) -> String {
    let mut html = String::from("<body>");
    for shape in shapes {
        shape.render(&mut html);
    }
    html.push_str("</body>");
    html
}

fn all_handles(model: &OutlineModel, parent: Option<Handle>, out: &mut Vec<(Option<Handle>, Handle)>) {
    for row in 0..model.row_count(parent) {
        if let Some(handle) = model.index(row, 0, parent) {
            out.push((parent, handle));
            all_handles(model, Some(handle), out);
        }
    }
}

proptest! {
    #[test]
    fn prop_one_node_per_qualifying_element(shapes in prop::collection::vec(shape(), 0..5)) {
        let doc = parse_html(&book(&shapes));
        let model = OutlineModel::new(&doc);
        let tree = model.tree().unwrap();

        let expected: usize = shapes.iter().map(Shape::count).sum();
        prop_assert_eq!(tree.len(), expected + 1);

        let mut handles = Vec::new();
        all_handles(&model, None, &mut handles);
        prop_assert_eq!(handles.len(), expected);
    }

    #[test]
    fn prop_index_and_parent_are_inverse(shapes in prop::collection::vec(shape(), 1..5)) {
        let doc = parse_html(&book(&shapes));
        let model = OutlineModel::new(&doc);

        let mut handles = Vec::new();
        all_handles(&model, None, &mut handles);
        for (parent, handle) in handles {
            prop_assert_eq!(model.parent(handle), parent);
            prop_assert_eq!(model.index(handle.row(), 0, parent), Some(handle));
        }
    }

    #[test]
    fn prop_location_round_trip(shapes in prop::collection::vec(shape(), 1..5)) {
        let doc = parse_html(&book(&shapes));
        let model = OutlineModel::new(&doc);
        let tree = model.tree().unwrap();

        for (id, _) in tree.iter().skip(1) {
            if let Some(location) = tree.location_of(id) {
                let reparsed = Location::parse(&format!("HTML=0,{location}"));
                prop_assert_eq!(model.locate_parsed(&reparsed), model.handle_of(id));
            }
        }
    }

    #[test]
    fn prop_selector_path_resolves(shapes in prop::collection::vec(shape(), 1..4)) {
        let doc = parse_html(&book(&shapes));
        let tree = OutlineModel::new(&doc).tree().cloned().unwrap();

        for (id, node) in tree.iter() {
            let path = tree.selector_path(&doc, id).unwrap();
            prop_assert_eq!(path.resolve(&doc), Some(node.element));
        }
    }

    #[test]
    fn prop_location_text_round_trip(
        steps in prop::collection::vec(("[A-G]{1,4}", 0usize..10_000), 0..8)
    ) {
        let location = Location::new(
            steps
                .into_iter()
                .map(|(key, index)| LocationStep { key, index })
                .collect(),
        );
        prop_assert_eq!(Location::parse(&location.to_string()), location);
    }
}
