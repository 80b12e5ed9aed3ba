//! Find-in-page over a window of iterated text.
//!
//! A [`SearchBuffer`] holds a bounded window of the text stream. Callers
//! append text as a character iterator produces it and ask for matches; the
//! buffer keeps an overlap between windows so that matches straddling two
//! windows are still found, and an optional prefix of text from before the
//! searched range for word-start decisions.

pub mod collation;
mod kana;
mod unicode;

use crate::behavior::FindOptions;
use crate::error::FindError;
use collation::{CollationMatch, Collator, Strength};
use unicode::{
    fold_quote_marks_and_soft_hyphens, is_cjk_ideograph_or_symbol, is_separator, previous_word_start,
    start_of_last_word_boundary_context, word_boundaries,
};

/// Smallest window, in characters.
const MINIMUM_SEARCH_BUFFER_SIZE: usize = 8192;

/// A match reported by [`SearchBuffer::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMatch {
    /// Number of matched characters.
    pub length: usize,
    /// Distance from the match's first character to the end of the text
    /// appended so far.
    pub start_from_end: usize,
}

/// What one pass over the window found.
enum Outcome {
    Nothing,
    /// A match too close to the end of an unfinished window to be trusted;
    /// keep this many characters and wait for more text.
    Tentative(usize),
    Found(CollationMatch),
}

/// A bounded window of text searched for one target.
#[derive(Debug, Clone)]
pub struct SearchBuffer {
    options: FindOptions,
    collator: Collator,
    target_keys: Vec<char>,
    /// NFC form of the target, kept only when it has kana letters.
    normalized_target: Option<Vec<char>>,

    buffer: Vec<char>,
    capacity: usize,
    overlap: usize,
    /// Leading characters of `buffer` that are context, not searchable.
    prefix_length: usize,
    number_of_characters_just_appended: usize,
    at_break: bool,
    needs_more_context: bool,
}

impl SearchBuffer {
    /// Prepare a search for `target`.
    ///
    /// # Errors
    /// [`FindError::EmptyTarget`] when `target` is empty.
    pub fn new(target: &[char], options: FindOptions) -> Result<Self, FindError> {
        if target.is_empty() {
            return Err(FindError::EmptyTarget);
        }
        let mut folded = target.to_vec();
        fold_quote_marks_and_soft_hyphens(&mut folded);

        let capacity = (folded.len() * 8).max(MINIMUM_SEARCH_BUFFER_SIZE);
        let mut options = options;
        // Separators never start a word, so a target starting with one can
        // only be matched without the word-start rule.
        if options.contains(FindOptions::AT_WORD_STARTS) && is_separator(folded[0]) {
            options.remove(FindOptions::AT_WORD_STARTS);
        }

        let strength = if options.contains(FindOptions::CASE_INSENSITIVE) {
            Strength::Primary
        } else {
            Strength::Tertiary
        };
        let collator = Collator::new(strength);
        let normalized_target = kana::contains_kana_letters(&folded).then(|| kana::normalize(&folded));

        Ok(SearchBuffer {
            options,
            target_keys: collator.keys(&folded),
            collator,
            normalized_target,
            buffer: Vec::with_capacity(capacity),
            capacity,
            overlap: capacity / 4,
            prefix_length: 0,
            number_of_characters_just_appended: 0,
            at_break: true,
            needs_more_context: options.contains(FindOptions::AT_WORD_STARTS),
        })
    }

    /// The options in effect, after dropping any that cannot apply to the
    /// target.
    #[must_use]
    pub const fn options(&self) -> FindOptions {
        self.options
    }

    /// Window size in characters.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add text to the window, as much as fits, and return how much was
    /// taken. A full window first drops all but its overlap.
    pub fn append(&mut self, chars: &[char]) -> usize {
        debug_assert!(!chars.is_empty());
        if self.at_break {
            self.buffer.clear();
            self.prefix_length = 0;
            self.at_break = false;
        } else if self.buffer.len() == self.capacity {
            let dropped = self.buffer.len() - self.overlap;
            self.buffer.copy_within(dropped.., 0);
            self.buffer.truncate(self.overlap);
            self.prefix_length -= self.prefix_length.min(dropped);
        }

        let old_length = self.buffer.len();
        let usable = (self.capacity - old_length).min(chars.len());
        self.buffer.extend_from_slice(&chars[..usable]);
        fold_quote_marks_and_soft_hyphens(&mut self.buffer[old_length..]);
        self.number_of_characters_just_appended = usable;
        usable
    }

    /// How many characters the last [`append`](Self::append) took.
    #[must_use]
    pub const fn number_of_characters_just_appended(&self) -> usize {
        self.number_of_characters_just_appended
    }

    /// Whether word-start matching still wants text from before the range.
    #[must_use]
    pub const fn needs_more_context(&self) -> bool {
        self.needs_more_context
    }

    /// Put text from before the searched range in front of the window. Only
    /// as much is kept as decides word boundaries: the last character, or
    /// the whole trailing run of a script that needs context.
    pub fn prepend_context(&mut self, chars: &[char]) {
        debug_assert!(self.needs_more_context);
        debug_assert_eq!(self.prefix_length, self.buffer.len());
        let Some((_, rest)) = chars.split_last() else {
            return;
        };
        self.at_break = false;

        let context_start = start_of_last_word_boundary_context(rest);
        let usable = (self.capacity - self.prefix_length).min(chars.len() - context_start);
        let mut buffer = Vec::with_capacity(self.capacity);
        buffer.extend_from_slice(&chars[chars.len() - usable..]);
        buffer.append(&mut self.buffer);
        self.buffer = buffer;
        self.prefix_length += usable;

        if context_start > 0 || self.prefix_length == self.capacity {
            self.needs_more_context = false;
        }
    }

    /// Whether the window is empty or ended by a break.
    #[must_use]
    pub const fn at_break(&self) -> bool {
        self.at_break
    }

    /// Mark the end of a block of text: the window can be searched to its
    /// end, and the next append starts a new window.
    pub fn reached_break(&mut self) {
        self.at_break = true;
    }

    /// Look for the next match in the window.
    ///
    /// Windows are searched only when full or at a break. A found match and
    /// everything before it are dropped from the window, so calling again
    /// finds the next one.
    pub fn search(&mut self) -> Option<BufferMatch> {
        let size = self.buffer.len();
        if self.at_break {
            if size == 0 {
                return None;
            }
        } else if size != self.capacity {
            return None;
        }

        match self.find_in_window() {
            Outcome::Nothing => None,
            Outcome::Tentative(keep) => {
                self.buffer.copy_within(size - keep.., 0);
                self.buffer.truncate(keep);
                self.prefix_length -= self.prefix_length.min(size - keep);
                None
            }
            Outcome::Found(found) => {
                let consumed = found.start + 1;
                self.buffer.copy_within(consumed.., 0);
                self.buffer.truncate(size - consumed);
                self.prefix_length -= self.prefix_length.min(consumed);
                Some(BufferMatch {
                    length: found.len,
                    start_from_end: size - found.start,
                })
            }
        }
    }

    fn find_in_window(&self) -> Outcome {
        let size = self.buffer.len();
        let collated = self.collator.collate(&self.buffer);
        let mut from = self.prefix_length;
        while let Some(found) = collated.find(&self.target_keys, from) {
            // The same match may appear longer once more text arrives, for
            // instance with a combining mark.
            if !self.at_break && found.start >= size - self.overlap {
                let mut keep = self.overlap;
                if self.options.contains(FindOptions::AT_WORD_STARTS) {
                    // Keep enough before the match to decide on word starts.
                    let context_start =
                        start_of_last_word_boundary_context(&self.buffer[..found.start.saturating_sub(1)]);
                    keep = (size - 1).min(keep.max(size - context_start));
                }
                return Outcome::Tentative(keep);
            }

            let matched = &self.buffer[found.start..found.start + found.len];
            let rejected = self.is_bad_match(matched)
                || (self.options.contains(FindOptions::AT_WORD_STARTS)
                    && !self.is_word_start_match(found.start, found.len));
            if !rejected {
                return Outcome::Found(found);
            }
            from = found.start + 1;
        }
        Outcome::Nothing
    }

    /// Whether the collator's match differs from the target in kana size or
    /// voicing.
    fn is_bad_match(&self, matched: &[char]) -> bool {
        let Some(normalized_target) = &self.normalized_target else {
            return false;
        };
        !kana::check_only_kana_letters_in_strings(normalized_target, &kana::normalize(matched))
    }

    fn is_word_start_match(&self, start: usize, length: usize) -> bool {
        debug_assert!(self.options.contains(FindOptions::AT_WORD_STARTS));
        if start == 0 {
            return true;
        }
        let buffer = &self.buffer;
        let first = buffer[start];

        if self.options.contains(FindOptions::TREAT_MEDIAL_CAPITAL_AS_WORD_START) {
            let previous = buffer[start - 1];
            if is_separator(first) {
                // A separator run starts a word (".org" in "webkit.org").
                if !is_separator(previous) {
                    return true;
                }
            } else if first.is_ascii_uppercase() {
                // An uppercase run starts a word ("Kit" in "WebKit").
                if !previous.is_ascii_uppercase() {
                    return true;
                }
                // So does its last letter when a lowercase one follows
                // ("Request" in "XMLHTTPRequest").
                let next = buffer.get(start + 1).copied().unwrap_or('\0');
                if !next.is_ascii_uppercase() && !next.is_ascii_digit() && !is_separator(next) {
                    return true;
                }
            } else if first.is_ascii_digit() {
                // A digit run starts a word ("2" in "WebKit2").
                if !previous.is_ascii_digit() {
                    return true;
                }
            } else if is_separator(previous) || previous.is_ascii_digit() {
                // Lowercase after a separator or digit, not after uppercase
                // ("org" in "webkit.org", not "ore" in "WebCore").
                return true;
            }
        }

        // Chinese and Japanese have no word separators.
        if is_cjk_ideograph_or_symbol(first) {
            return true;
        }

        let boundaries = word_boundaries(buffer);
        let mut position = start + length;
        while position > start {
            position = previous_word_start(buffer, &boundaries, position);
        }
        position == start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    /// Append `text` as one block and collect every match as
    /// (offset from the start of the text, length).
    fn search_all(target: &str, text: &str, options: FindOptions) -> Vec<(usize, usize)> {
        let mut buffer = SearchBuffer::new(&chars(target), options).unwrap();
        let text = chars(text);
        let mut appended = 0;
        let mut found = Vec::new();
        while appended < text.len() {
            appended += buffer.append(&text[appended..]);
            while let Some(m) = buffer.search() {
                found.push((appended - m.start_from_end, m.length));
            }
        }
        buffer.reached_break();
        while let Some(m) = buffer.search() {
            found.push((appended - m.start_from_end, m.length));
        }
        found
    }

    #[test]
    fn test_empty_target_is_rejected() {
        assert_eq!(SearchBuffer::new(&[], FindOptions::empty()).unwrap_err(), FindError::EmptyTarget);
    }

    #[test]
    fn test_capacity_and_overlap() {
        let buffer = SearchBuffer::new(&chars("abc"), FindOptions::empty()).unwrap();
        assert_eq!(buffer.capacity(), 8192);
        assert_eq!(buffer.overlap, 2048);

        let long: String = "x".repeat(2000);
        let buffer = SearchBuffer::new(&chars(&long), FindOptions::empty()).unwrap();
        assert_eq!(buffer.capacity(), 16000);
    }

    #[test]
    fn test_finds_every_occurrence() {
        assert_eq!(
            search_all("ab", "ab xab ab", FindOptions::empty()),
            vec![(0, 2), (4, 2), (7, 2)]
        );
    }

    #[test]
    fn test_overlapping_occurrences() {
        assert_eq!(search_all("aa", "aaa", FindOptions::empty()), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(search_all("hello", "Hello", FindOptions::empty()).is_empty());
        assert_eq!(search_all("hello", "Hello", FindOptions::CASE_INSENSITIVE), vec![(0, 5)]);
    }

    #[test]
    fn test_quote_marks_fold() {
        assert_eq!(search_all("it's", "it\u{2019}s", FindOptions::empty()), vec![(0, 4)]);
        assert_eq!(search_all("ab", "a\u{ad}b", FindOptions::empty()), vec![(0, 3)]);
    }

    #[test]
    fn test_word_starts() {
        assert!(search_all("cat", "concatenate", FindOptions::AT_WORD_STARTS).is_empty());
        assert_eq!(search_all("cat", "a cat", FindOptions::AT_WORD_STARTS), vec![(2, 3)]);
        assert!(search_all("Cat", "WebCat", FindOptions::AT_WORD_STARTS).is_empty());
        assert_eq!(
            search_all(
                "Cat",
                "WebCat",
                FindOptions::AT_WORD_STARTS | FindOptions::TREAT_MEDIAL_CAPITAL_AS_WORD_START
            ),
            vec![(3, 3)]
        );
    }

    #[test]
    fn test_medial_capital_rules() {
        let medial = FindOptions::AT_WORD_STARTS | FindOptions::TREAT_MEDIAL_CAPITAL_AS_WORD_START;
        assert_eq!(search_all("Request", "XMLHTTPRequest", medial), vec![(7, 7)]);
        assert_eq!(search_all("2", "WebKit2", medial), vec![(6, 1)]);
        assert_eq!(search_all("org", "webkit.org", medial), vec![(7, 3)]);
        assert!(search_all("ore", "WebCore", medial).is_empty());
    }

    #[test]
    fn test_separator_target_drops_word_starts() {
        let buffer = SearchBuffer::new(&chars(".org"), FindOptions::AT_WORD_STARTS).unwrap();
        assert!(!buffer.options().contains(FindOptions::AT_WORD_STARTS));
        assert!(!buffer.needs_more_context());
        assert_eq!(search_all(".org", "webkit.org", FindOptions::AT_WORD_STARTS), vec![(6, 4)]);
    }

    #[test]
    fn test_cjk_positions_are_word_starts() {
        assert_eq!(
            search_all("\u{672c}", "\u{65e5}\u{672c}", FindOptions::AT_WORD_STARTS),
            vec![(1, 1)]
        );
    }

    #[test]
    fn test_kana_workaround_rejects_voicing_differences() {
        assert!(search_all("\u{306f}", "\u{3070}", FindOptions::CASE_INSENSITIVE).is_empty());
        assert_eq!(
            search_all("\u{30cf}", "\u{306f}", FindOptions::CASE_INSENSITIVE),
            vec![(0, 1)]
        );
    }

    #[test]
    fn test_prepended_context_decides_word_start() {
        let mut buffer = SearchBuffer::new(&chars("cat"), FindOptions::AT_WORD_STARTS).unwrap();
        assert!(buffer.needs_more_context());
        buffer.prepend_context(&chars("con"));
        assert!(!buffer.needs_more_context());
        let _ = buffer.append(&chars("catenate"));
        buffer.reached_break();
        assert_eq!(buffer.search(), None);
    }

    #[test]
    fn test_match_across_window_boundary() {
        let mut text = "x".repeat(8190);
        text.push_str("needle");
        let found = search_all("needle", &text, FindOptions::empty());
        assert_eq!(found, vec![(8190, 6)]);
    }
}
