//! Whole-range operations built on the iterators: text extraction, length,
//! offset-to-range mapping and search.

use koala_dom::{Position, Range};

use crate::backwards_text_iterator::BackwardsTextIterator;
use crate::behavior::{FindOptions, TextIteratorBehavior};
use crate::character_iterator::{CharacterIterator, character_subrange};
use crate::context::TextContext;
use crate::error::FindError;
use crate::search::SearchBuffer;
use crate::text_iterator::TextIterator;

/// Initial capacity of the plain-text buffer. Most documents fit.
const PLAIN_TEXT_INITIAL_CAPACITY: usize = 1 << 15;

/// Behavior used for every search.
const FIND_BEHAVIOR: TextIteratorBehavior =
    TextIteratorBehavior::ENTERS_TEXT_CONTROLS.union(TextIteratorBehavior::ENTERS_AUTHOR_SHADOW_ROOTS);

/// The text of `range` as the user sees it.
#[must_use]
pub fn plain_text(ctx: TextContext<'_>, range: &Range, behavior: TextIteratorBehavior) -> String {
    let mut chars = Vec::with_capacity(PLAIN_TEXT_INITIAL_CAPACITY);
    let mut it = TextIterator::new(ctx, range, behavior);
    while !it.at_end() {
        it.append_text_to(&mut chars);
        it.advance();
    }
    chars.into_iter().collect()
}

/// The first `max_chars` characters of [`plain_text`] with the default
/// behavior. Iteration stops once the limit is reached.
#[must_use]
pub fn plain_text_with_max_length(ctx: TextContext<'_>, range: &Range, max_chars: usize) -> String {
    let mut chars = Vec::with_capacity(max_chars.min(PLAIN_TEXT_INITIAL_CAPACITY));
    let mut it = TextIterator::new(ctx, range, TextIteratorBehavior::empty());
    while !it.at_end() && chars.len() < max_chars {
        let text = it.text();
        let wanted = text.len().min(max_chars - chars.len());
        chars.extend_from_slice(&text[..wanted]);
        it.advance();
    }
    chars.into_iter().collect()
}

/// Number of characters in the text of `range`.
///
/// With `for_selection_preservation`, every visible position counts, so
/// that offsets survive a round trip through [`subrange`].
#[must_use]
pub fn range_length(ctx: TextContext<'_>, range: &Range, for_selection_preservation: bool) -> usize {
    let behavior = if for_selection_preservation {
        TextIteratorBehavior::EMITS_CHARACTERS_BETWEEN_ALL_VISIBLE_POSITIONS
    } else {
        TextIteratorBehavior::empty()
    };
    let mut length = 0;
    let mut it = TextIterator::new(ctx, range, behavior);
    while !it.at_end() {
        length += it.length();
        it.advance();
    }
    length
}

/// The document range covering `character_count` characters of the text of
/// `range`, starting `character_offset` characters in.
#[must_use]
pub fn subrange(ctx: TextContext<'_>, range: &Range, character_offset: usize, character_count: usize) -> Range {
    let mut it = CharacterIterator::new(ctx, range, TextIteratorBehavior::empty());
    character_subrange(&mut it, character_offset, character_count)
}

/// Find `target` in the text of `range`.
///
/// Returns the first match, or with [`FindOptions::BACKWARDS`] the last one.
/// When nothing matches the result is `range` collapsed to the end the
/// search started from: its start, or its end when searching backwards.
///
/// # Errors
/// [`FindError::EmptyTarget`] when `target` is empty.
pub fn find_plain_text(
    ctx: TextContext<'_>,
    range: &Range,
    target: &str,
    options: FindOptions,
) -> Result<Range, FindError> {
    let target: Vec<char> = target.chars().collect();
    let mut it = CharacterIterator::new(ctx, range, FIND_BEHAVIOR);
    let Some((match_start, match_length)) = find_plain_text_internal(ctx, &mut it, &target, options)? else {
        return Ok(range.collapsed_to(!options.contains(FindOptions::BACKWARDS)));
    };

    let mut it = CharacterIterator::new(ctx, range, FIND_BEHAVIOR);
    Ok(character_subrange(&mut it, match_start, match_length))
}

/// Character offset and length of the match in the text under `it`.
fn find_plain_text_internal(
    ctx: TextContext<'_>,
    it: &mut CharacterIterator<'_>,
    target: &[char],
    options: FindOptions,
) -> Result<Option<(usize, usize)>, FindError> {
    let mut buffer = SearchBuffer::new(target, options)?;

    if buffer.needs_more_context() {
        let dom = ctx.dom;
        let mut before_start = Range::collapsed_at(Position::new(dom.root(), 0));
        before_start.set_end(dom, it.range().start);
        let mut backwards = BackwardsTextIterator::new(ctx, &before_start, TextIteratorBehavior::empty());
        while !backwards.at_end() {
            buffer.prepend_context(backwards.text());
            if !buffer.needs_more_context() {
                break;
            }
            backwards.advance();
        }
    }

    let backwards = options.contains(FindOptions::BACKWARDS);
    let mut found = None;
    while !it.at_end() {
        let text = it.text();
        if text.is_empty() {
            break;
        }
        let appended = buffer.append(text);
        it.advance(appended);
        loop {
            if let Some(hit) = buffer.search() {
                debug_assert!(it.character_offset() >= hit.start_from_end);
                found = Some((it.character_offset() - hit.start_from_end, hit.length));
                // Forward searches stop at the first match; backward ones
                // keep going to end up with the last.
                if !backwards {
                    return Ok(found);
                }
                continue;
            }
            if it.at_break() && !buffer.at_break() {
                buffer.reached_break();
                continue;
            }
            break;
        }
    }
    Ok(found)
}
