//! Seams to the presentation layer.
//!
//! The models never render anything. Scrolling, cursor placement and tree
//! expansion are delegated to whatever implements these traits: a widget
//! toolkit, a browser bridge, or a recording fake in tests.

use crate::outline::SelectorPath;

/// The rendered document.
pub trait DocumentView {
    /// Scroll so the addressed element is visible.
    fn scroll_to(&mut self, target: &SelectorPath);

    /// Put the editing cursor at the start of the addressed element.
    fn set_cursor(&mut self, target: &SelectorPath);

    /// Give input focus to the document view.
    fn set_focus(&mut self);

    /// Location descriptor of the current cursor position.
    fn location(&self) -> String;
}

/// A tree widget showing one of the models. `H` is the model's handle type.
pub trait TreeView<H> {
    fn expand(&mut self, index: H);

    /// Make `index` the current row; `None` clears the selection.
    fn set_current(&mut self, index: Option<H>);
}
