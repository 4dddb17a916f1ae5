//! Book header (FictionBook `description`) as an editable tree.
//!
//! # Example
//!
//! ```
//! use fb2outline::dom::parse_html;
//! use fb2outline::head::HeadModel;
//! use fb2outline::scheme::Scheme;
//!
//! let mut doc = parse_html(
//!     r#"<div class="description"><div class="title-info"></div></div>"#,
//! );
//! let mut model = HeadModel::new(&doc, Scheme::packaged());
//!
//! let title_info = model.index(0, 0, None).unwrap();
//! let genre = model.append_checked(&mut doc, Some(title_info), "genre").unwrap();
//! assert!(model.set_text(&mut doc, genre, "sf_history"));
//! assert!(model.append_checked(&mut doc, Some(title_info), "body").is_err());
//! ```

mod hints;
mod model;
mod tree;

pub use hints::hint;
pub use model::{COLUMNS, Handle, HeadModel, ItemFlags, VALUE_COLUMN};
pub use tree::{HeadEntry, HeadId, HeadNode, HeadTree, head_name};
