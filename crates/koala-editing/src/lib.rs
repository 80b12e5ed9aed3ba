//! Text iteration, plain-text extraction and find-in-page for the Koala
//! renderer.
//!
//! [§ innerText](https://html.spec.whatwg.org/multipage/dom.html#the-innertext-idl-attribute)
//!
//! Everything here reads a [`koala_dom::DomTree`] together with its
//! [`koala_layout::RenderTree`] through a [`TextContext`] and turns a range of
//! the document into the linear text a reader sees, or back:
//!
//! - [`TextIterator`] and [`BackwardsTextIterator`] produce the text of a
//!   range run by run, each run tied to the boundary points it came from.
//! - [`CharacterIterator`] and [`BackwardsCharacterIterator`] step through
//!   that text by character counts; [`character_subrange`] maps offsets back
//!   to ranges.
//! - [`WordAwareIterator`] merges runs so that words are never split.
//! - [`SearchBuffer`] matches a target against the text stream with
//!   collation, word-start and kana rules.
//! - [`plain_text`], [`range_length`], [`subrange`] and [`find_plain_text`]
//!   package these up for whole ranges, and [`TextFinder`] drives
//!   find-in-page over a document.
//!
//! # Example
//!
//! ```
//! use koala_dom::{DomTree, NodeId, Range};
//! use koala_editing::{TextContext, TextIteratorBehavior, plain_text};
//! use koala_layout::{LayoutOptions, RenderTree};
//!
//! let mut dom = DomTree::new();
//! let html = dom.append_element(NodeId::ROOT, "html");
//! let body = dom.append_element(html, "body");
//! let div = dom.append_element(body, "div");
//! let _ = dom.append_text(div, "foo");
//! let div = dom.append_element(body, "div");
//! let _ = dom.append_text(div, "bar");
//!
//! let layout = RenderTree::build(&dom, &LayoutOptions::default());
//! let ctx = TextContext::new(&dom, &layout);
//! let range = Range::select_node_contents(&dom, body);
//! assert_eq!(plain_text(ctx, &range, TextIteratorBehavior::empty()), "foo\nbar");
//! ```

mod backwards_text_iterator;
mod behavior;
pub mod bit_stack;
mod character_iterator;
pub mod clipping;
mod context;
mod error;
mod finder;
mod heuristics;
mod operations;
mod run;
pub mod search;
mod text_iterator;
mod word_aware_iterator;

pub use backwards_text_iterator::BackwardsTextIterator;
pub use behavior::{FindOptions, TextIteratorBehavior};
pub use bit_stack::BitStack;
pub use character_iterator::{BackwardsCharacterIterator, CharacterIterator, character_subrange};
pub use context::TextContext;
pub use error::FindError;
pub use finder::TextFinder;
pub use operations::{find_plain_text, plain_text, plain_text_with_max_length, range_length, subrange};
pub use run::LazyRange;
pub use search::collation::{CollationMatch, Collator, Strength};
pub use search::{BufferMatch, SearchBuffer};
pub use text_iterator::TextIterator;
pub use word_aware_iterator::WordAwareIterator;
