//! Text iteration that never splits a word across runs.

use koala_dom::Range;

use crate::behavior::TextIteratorBehavior;
use crate::context::TextContext;
use crate::heuristics::is_space_or_newline;
use crate::text_iterator::TextIterator;

/// Wraps a [`TextIterator`], merging runs so that each chunk ends at
/// whitespace, a break, or the end of the range.
///
/// Spell and grammar checking want whole words; a word split over several
/// text nodes (`<b>w</b>ord`) comes out as one chunk here.
#[derive(Debug, Clone)]
pub struct WordAwareIterator<'a> {
    iterator: TextIterator<'a>,
    /// Runs copied out of the iterator once a chunk needed look-ahead.
    buffer: Vec<char>,
    range: Range,
    /// Whether the underlying iterator is already on the run after this
    /// chunk.
    did_look_ahead: bool,
}

impl<'a> WordAwareIterator<'a> {
    /// Start iterating `range`.
    #[must_use]
    pub fn new(ctx: TextContext<'a>, range: &Range) -> Self {
        let iterator = TextIterator::new(ctx, range, TextIteratorBehavior::empty());
        let mut it = WordAwareIterator {
            range: iterator.range(),
            iterator,
            buffer: Vec::new(),
            did_look_ahead: true,
        };
        it.advance();
        it
    }

    /// Whether every chunk has been produced.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        !self.did_look_ahead && self.iterator.at_end()
    }

    /// The document range the current chunk spans.
    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    /// Characters of the current chunk.
    #[must_use]
    pub fn text(&self) -> &[char] {
        if self.buffer.is_empty() {
            self.iterator.text()
        } else {
            &self.buffer
        }
    }

    /// Number of characters in the current chunk.
    #[must_use]
    pub fn length(&self) -> usize {
        self.text().len()
    }

    /// Produce the next chunk.
    pub fn advance(&mut self) {
        self.buffer.clear();

        // A look-ahead run becomes the start of this chunk.
        if !self.did_look_ahead {
            debug_assert!(!self.iterator.at_end());
            self.iterator.advance();
        }
        self.did_look_ahead = false;

        while !self.iterator.at_end() && self.iterator.length() == 0 {
            self.iterator.advance();
        }
        self.range = self.iterator.range();
        if self.iterator.at_end() {
            return;
        }

        loop {
            // A chunk ending in whitespace is complete.
            if self.iterator.text().last().is_some_and(|&c| is_space_or_newline(c)) {
                return;
            }

            if self.buffer.is_empty() {
                self.iterator.append_text_to(&mut self.buffer);
            }

            self.iterator.advance();
            let continues_word = !self.iterator.at_end()
                && self
                    .iterator
                    .text()
                    .first()
                    .is_some_and(|&c| !is_space_or_newline(c));
            if !continues_word {
                self.did_look_ahead = true;
                return;
            }

            self.iterator.append_text_to(&mut self.buffer);
            self.range.end = self.iterator.range().end;
        }
    }
}
