//! Iterator behavior flags and search options.

use bitflags::bitflags;

bitflags! {
    /// How a text iterator walks the tree and what it emits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextIteratorBehavior: u32 {
        /// Descend into the user-agent shadow tree of text controls and emit
        /// their value.
        const ENTERS_TEXT_CONTROLS = 1 << 0;
        /// Emit a character for every visible position, so that offsets line
        /// up with caret positions: `,` for replaced elements, a space for
        /// `<hr>`, tabs and newlines around tables.
        const EMITS_CHARACTERS_BETWEEN_ALL_VISIBLE_POSITIONS = 1 << 1;
        /// Emit the text as written, before `text-transform`, and `<br>`
        /// elements as literal newlines even inside text controls.
        const EMITS_ORIGINAL_TEXT = 1 << 2;
        /// Emit text styled `visibility: hidden` or clipped away.
        const IGNORES_STYLE_VISIBILITY = 1 << 3;
        /// Stop at the first node inside a form control.
        const STOPS_ON_FORM_CONTROLS = 1 << 4;
        /// Emit the `alt` text of images.
        const EMITS_IMAGE_ALT_TEXT = 1 << 5;
        /// Descend into author shadow trees.
        const ENTERS_AUTHOR_SHADOW_ROOTS = 1 << 6;
    }
}

bitflags! {
    /// How [`find_plain_text`](crate::find_plain_text) matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FindOptions: u32 {
        /// Ignore case, accents and kana variants (primary collation strength).
        const CASE_INSENSITIVE = 1 << 0;
        /// Only accept matches that start a word.
        const AT_WORD_STARTS = 1 << 1;
        /// With `AT_WORD_STARTS`, an uppercase letter after a lowercase one
        /// also starts a word ("Cat" in "WebCat").
        const TREAT_MEDIAL_CAPITAL_AS_WORD_START = 1 << 2;
        /// Search from the end of the range towards its start.
        const BACKWARDS = 1 << 3;
        /// Continue from the other end of the scope when nothing is found.
        /// Honoured by [`TextFinder`](crate::TextFinder).
        const WRAP_AROUND = 1 << 4;
    }
}

/// Behavior flags resolved once when an iterator is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct IteratorConfig {
    pub(crate) enters_text_controls: bool,
    pub(crate) emits_characters_between_all_visible_positions: bool,
    pub(crate) emits_original_text: bool,
    pub(crate) ignores_style_visibility: bool,
    pub(crate) stops_on_form_controls: bool,
    pub(crate) emits_image_alt_text: bool,
    pub(crate) enters_author_shadow_roots: bool,
}

impl From<TextIteratorBehavior> for IteratorConfig {
    fn from(behavior: TextIteratorBehavior) -> Self {
        IteratorConfig {
            enters_text_controls: behavior.contains(TextIteratorBehavior::ENTERS_TEXT_CONTROLS),
            emits_characters_between_all_visible_positions: behavior
                .contains(TextIteratorBehavior::EMITS_CHARACTERS_BETWEEN_ALL_VISIBLE_POSITIONS),
            emits_original_text: behavior.contains(TextIteratorBehavior::EMITS_ORIGINAL_TEXT),
            ignores_style_visibility: behavior.contains(TextIteratorBehavior::IGNORES_STYLE_VISIBILITY),
            stops_on_form_controls: behavior.contains(TextIteratorBehavior::STOPS_ON_FORM_CONTROLS),
            emits_image_alt_text: behavior.contains(TextIteratorBehavior::EMITS_IMAGE_ALT_TEXT),
            enters_author_shadow_roots: behavior.contains(TextIteratorBehavior::ENTERS_AUTHOR_SHADOW_ROOTS),
        }
    }
}
