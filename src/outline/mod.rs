//! Document outline: sections, titles and images of a book body.
//!
//! # Example
//!
//! ```
//! use fb2outline::dom::parse_html;
//! use fb2outline::outline::{OutlineModel, Role};
//!
//! let doc = parse_html(
//!     r#"<body><div class="title">Chap 1</div><img src="/img/1.png"></body>"#,
//! );
//! let model = OutlineModel::new(&doc);
//!
//! assert_eq!(model.row_count(None), 2);
//! let image = model.index(1, 0, None).unwrap();
//! assert_eq!(model.data(image, Role::Display).unwrap(), "<img> /img/1.png");
//! assert_eq!(model.locate("HTML=0,DIV=1"), Some(image));
//! ```

mod location;
mod model;
mod tree;

pub use location::{Location, LocationStep, SelectorPath};
pub use model::{Handle, OutlineModel, Role};
pub use tree::{
    Kind, MAX_LABEL_CHARS, OutlineEntry, OutlineId, OutlineNode, OutlineTree, is_qualifying,
    title_text, url_path,
};
