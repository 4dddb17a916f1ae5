//! # fb2outline
//!
//! Outline and header models for FictionBook books rendered as HTML.
//!
//! ## Features
//!
//! - Outline of sections, titles and images, addressable by row
//! - Location descriptors (`DIV=1,IMG=0`) resolved back to outline rows
//! - Selector paths (`:root > :nth-child(2) > ...`) for placing a cursor
//! - Editable header tree (authors, cover, sequences) checked against the
//!   FictionBook schema
//!
//! ## Quick Start
//!
//! ```
//! use fb2outline::dom::parse_html;
//! use fb2outline::outline::{OutlineModel, Role};
//!
//! let doc = parse_html(r#"<body>
//!     <div class="title">Chap 1</div>
//!     <div class="subtitle">Intro</div>
//!     <img src="/img/1.png">
//! </body>"#);
//! let model = OutlineModel::new(&doc);
//!
//! let rows: Vec<_> = (0..model.row_count(None))
//!     .filter_map(|row| model.index(row, 0, None))
//!     .filter_map(|h| model.data(h, Role::Display))
//!     .collect();
//! assert_eq!(rows, ["<title> Chap 1", "<subtitle> Intro", "<img> /img/1.png"]);
//! ```
//!
//! ## Working with the header
//!
//! See [`head::HeadModel`]. The schema it checks against is a [`Scheme`]
//! passed by reference; [`Scheme::packaged`] is the bundled FictionBook 2.1
//! schema.

pub mod dom;
mod error;
pub mod head;
pub mod outline;
pub mod scheme;
pub mod util;
pub mod view;

pub use error::{Error, Result};
pub use head::HeadModel;
pub use outline::OutlineModel;
pub use scheme::Scheme;
pub use view::{DocumentView, TreeView};
