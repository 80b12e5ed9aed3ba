//! Render tree for the Koala text engine.
//!
//! [CSS 2 § 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! This crate lays out a [`koala_dom::DomTree`] just far enough for text
//! iteration: which nodes generate boxes and of what kind, their computed
//! visibility and white-space handling, which characters of each text node
//! survive whitespace collapsing (as [`InlineTextBox`]es), and which line
//! every box sits on. It computes no geometry beyond line indices and
//! approximate block heights.

mod builder;
mod metrics;
mod render_object;
pub mod style;
mod tree;

pub use metrics::{ApproximateFontMetrics, FontMetrics};
pub use render_object::{
    FirstLetter, InlineTextBox, RenderImage, RenderKind, RenderObject, RenderText,
    TableCellPosition,
};
pub use style::{RenderStyle, Visibility, WhiteSpace};
pub use tree::{LayoutOptions, RenderTree};
