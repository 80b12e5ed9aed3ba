//! Character-granular cursors over the text iterators.
//!
//! A [`CharacterIterator`] counts emitted characters, so that a character
//! offset into [`plain_text`](crate::plain_text) of a range can be turned
//! back into a document range with [`character_subrange`].

use koala_dom::{DomTree, Position, Range};

use crate::backwards_text_iterator::BackwardsTextIterator;
use crate::behavior::TextIteratorBehavior;
use crate::context::TextContext;
use crate::text_iterator::TextIterator;

/// Moves through the text of a range character by character, or in larger
/// steps.
#[derive(Debug, Clone)]
pub struct CharacterIterator<'a> {
    underlying: TextIterator<'a>,
    /// Characters passed so far.
    offset: usize,
    /// Position within the current run.
    run_offset: usize,
    at_break: bool,
}

impl<'a> CharacterIterator<'a> {
    /// Position a cursor at the first character of `range`.
    #[must_use]
    pub fn new(ctx: TextContext<'a>, range: &Range, behavior: TextIteratorBehavior) -> Self {
        let mut underlying = TextIterator::new(ctx, range, behavior);
        while !underlying.at_end() && underlying.length() == 0 {
            underlying.advance();
        }
        CharacterIterator {
            underlying,
            offset: 0,
            run_offset: 0,
            at_break: true,
        }
    }

    /// Whether every character has been passed.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.underlying.at_end()
    }

    /// Whether an empty run (a position with no text, such as the start of a
    /// block) was crossed by the last [`advance`](Self::advance). True before
    /// the first step and at the end.
    #[must_use]
    pub const fn at_break(&self) -> bool {
        self.at_break
    }

    /// Number of characters passed so far.
    #[must_use]
    pub const fn character_offset(&self) -> usize {
        self.offset
    }

    /// The rest of the current run, starting at the cursor.
    #[must_use]
    pub fn text(&self) -> &[char] {
        self.underlying.text().get(self.run_offset..).unwrap_or_default()
    }

    /// Number of characters in [`text`](Self::text).
    #[must_use]
    pub fn length(&self) -> usize {
        self.text().len()
    }

    /// The range of the character under the cursor.
    ///
    /// Runs that do not map one character to one offset (collapsed spaces,
    /// alt text standing in for an image) are reported whole.
    #[must_use]
    pub fn range(&self) -> Range {
        let range = self.underlying.range();
        if self.underlying.at_end() {
            return range;
        }
        let run_length = self.underlying.length();
        let maps_characters = self
            .underlying
            .lazy_range()
            .is_some_and(|lazy| lazy.end - lazy.start == run_length);
        if run_length <= 1 || !maps_characters {
            return range;
        }
        let container = range.start.container;
        let offset = range.start.offset + self.run_offset;
        Range {
            start: Position::new(container, offset),
            end: Position::new(container, offset + 1),
        }
    }

    /// Move the cursor forward by `count` characters.
    pub fn advance(&mut self, count: usize) {
        if count == 0 || self.at_end() {
            return;
        }
        self.at_break = false;

        let remaining = self.underlying.length() - self.run_offset;
        if count < remaining {
            self.run_offset += count;
            self.offset += count;
            return;
        }

        let mut count = count - remaining;
        self.offset += remaining;
        self.underlying.advance();
        while !self.at_end() {
            let run_length = self.underlying.length();
            if run_length == 0 {
                self.at_break = true;
            } else if count < run_length {
                self.run_offset = count;
                self.offset += count;
                return;
            } else {
                count -= run_length;
                self.offset += run_length;
            }
            self.underlying.advance();
        }

        self.at_break = true;
        self.run_offset = 0;
    }
}

/// Moves backwards through the text of a range, character by character.
#[derive(Debug, Clone)]
pub struct BackwardsCharacterIterator<'a> {
    underlying: BackwardsTextIterator<'a>,
    offset: usize,
    /// Characters consumed from the end of the current run.
    run_offset: usize,
    at_break: bool,
}

impl<'a> BackwardsCharacterIterator<'a> {
    /// Position a cursor at the last character of `range`.
    #[must_use]
    pub fn new(ctx: TextContext<'a>, range: &Range, behavior: TextIteratorBehavior) -> Self {
        let mut underlying = BackwardsTextIterator::new(ctx, range, behavior);
        while !underlying.at_end() && underlying.length() == 0 {
            underlying.advance();
        }
        BackwardsCharacterIterator {
            underlying,
            offset: 0,
            run_offset: 0,
            at_break: true,
        }
    }

    /// Whether every character has been passed.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.underlying.at_end()
    }

    /// Whether an empty run was crossed by the last step.
    #[must_use]
    pub const fn at_break(&self) -> bool {
        self.at_break
    }

    /// Number of characters passed so far.
    #[must_use]
    pub const fn character_offset(&self) -> usize {
        self.offset
    }

    /// The range of the character under the cursor.
    #[must_use]
    pub fn range(&self) -> Range {
        let range = self.underlying.range();
        if self.underlying.at_end() || self.underlying.length() <= 1 {
            return range;
        }
        let container = range.start.container;
        let offset = range.end.offset - self.run_offset;
        Range {
            start: Position::new(container, offset - 1),
            end: Position::new(container, offset),
        }
    }

    /// Move the cursor backwards by `count` characters.
    pub fn advance(&mut self, count: usize) {
        if count == 0 || self.at_end() {
            return;
        }
        self.at_break = false;

        let remaining = self.underlying.length() - self.run_offset;
        if count < remaining {
            self.run_offset += count;
            self.offset += count;
            return;
        }

        let mut count = count - remaining;
        self.offset += remaining;
        self.underlying.advance();
        while !self.at_end() {
            let run_length = self.underlying.length();
            if run_length == 0 {
                self.at_break = true;
            } else if count < run_length {
                self.run_offset = count;
                self.offset += count;
                return;
            } else {
                count -= run_length;
                self.offset += run_length;
            }
            self.underlying.advance();
        }

        self.at_break = true;
        self.run_offset = 0;
    }
}

/// The document range of `length` characters starting `offset` characters
/// into the text under `it`.
///
/// Past the end of the text the range collapses to the end of the iterated
/// range. Characters the iterator synthesizes at block boundaries sit at
/// collapsed positions; when one opens or closes the subrange, the boundary
/// is chosen so that iterating the subrange emits it again.
pub fn character_subrange(it: &mut CharacterIterator<'_>, offset: usize, length: usize) -> Range {
    let dom = it.underlying.context().dom;
    let iterated_start = it.underlying.range_start();

    it.advance(offset);
    let first = it.range();
    let start = if offset == 0 && !it.at_end() && first.is_collapsed() {
        iterated_start
    } else {
        first.start
    };

    if length > 1 {
        it.advance(length - 1);
    }
    let last = it.range();
    let end = if !it.at_end() && last.is_collapsed() {
        end_after_synthesized(dom, last.end)
    } else {
        last.end
    };
    Range { start, end }
}

/// The boundary point that ends a range just after the synthesized character
/// positioned at `position`.
fn end_after_synthesized(dom: &DomTree, position: Position) -> Position {
    let container = position.container;
    if dom.offset_in_characters(container) {
        return position;
    }
    // Emitted on reaching the child: its newline or tab before.
    if let Some(child) = dom.child_at(container, position.offset) {
        return Position::new(child, 0);
    }
    // Emitted on leaving the container.
    match dom.parent(container) {
        Some(parent) => Position::new(parent, dom.node_index(container) + 1),
        None => position,
    }
}
