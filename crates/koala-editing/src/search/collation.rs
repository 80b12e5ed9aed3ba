//! [UTS #10 Unicode Collation](https://www.unicode.org/reports/tr10/)
//!
//! A small collation-based string search. Text is mapped character by
//! character to collation keys; a match is a run of whole characters whose
//! keys equal the pattern's keys.
//!
//! Only two strengths exist. Tertiary compares canonically equivalent text
//! as equal and nothing else. Primary also ignores case, accents,
//! compatibility variants and kana size and voicing.

use unicode_normalization::char::{decompose_canonical, decompose_compatible, is_combining_mark};

use super::unicode::{full_size_kana, is_ignorable};

/// [UTS #10 § 1.1 Multi-Level Comparison](https://www.unicode.org/reports/tr10/#Multi_Level_Comparison)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// "Typically, this is used to denote differences between base
    /// characters."
    Primary,
    /// "Upper and lower case differences in characters are distinguished at
    /// the tertiary level."
    Tertiary,
}

/// A match found by [`Collator::find`], in characters of the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollationMatch {
    /// Offset of the first matched character.
    pub start: usize,
    /// Number of matched characters.
    pub len: usize,
}

/// Maps text to collation keys at one strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collator {
    strength: Strength,
}

impl Collator {
    /// A collator comparing at `strength`.
    #[must_use]
    pub const fn new(strength: Strength) -> Self {
        Collator { strength }
    }

    /// The strength this collator compares at.
    #[must_use]
    pub const fn strength(&self) -> Strength {
        self.strength
    }

    fn push_keys(self, c: char, out: &mut Vec<char>) {
        if is_ignorable(c) {
            return;
        }
        let c = if c == '\u{a0}' { ' ' } else { c };
        match self.strength {
            Strength::Tertiary => decompose_canonical(c, |d| out.push(d)),
            Strength::Primary => decompose_compatible(c, |d| {
                if is_combining_mark(d) || is_ignorable(d) {
                    return;
                }
                for lower in d.to_lowercase() {
                    if lower == '\u{df}' {
                        out.extend(['s', 's']);
                    } else {
                        out.push(fold_kana(lower));
                    }
                }
            }),
        }
    }

    /// Collation keys of `text`.
    #[must_use]
    pub fn keys(&self, text: &[char]) -> Vec<char> {
        let mut keys = Vec::with_capacity(text.len());
        for &c in text {
            self.push_keys(c, &mut keys);
        }
        keys
    }

    /// Prepare `text` for repeated searching.
    #[must_use]
    pub fn collate<'t>(&self, text: &'t [char]) -> CollatedText<'t> {
        let mut keys = Vec::with_capacity(text.len());
        let mut key_start = Vec::with_capacity(text.len() + 1);
        for &c in text {
            key_start.push(keys.len());
            self.push_keys(c, &mut keys);
        }
        key_start.push(keys.len());
        CollatedText { text, keys, key_start }
    }

    /// The first match of `pattern` in `text` starting at or after `from`.
    #[must_use]
    pub fn find(&self, pattern: &[char], text: &[char], from: usize) -> Option<CollationMatch> {
        self.collate(text).find(&self.keys(pattern), from)
    }
}

/// Text with its collation keys.
#[derive(Debug, Clone)]
pub struct CollatedText<'t> {
    text: &'t [char],
    keys: Vec<char>,
    /// `key_start[i]..key_start[i + 1]` are the keys of character `i`.
    key_start: Vec<usize>,
}

impl CollatedText<'_> {
    fn has_keys(&self, index: usize) -> bool {
        self.key_start[index] < self.key_start[index + 1]
    }

    /// The first match of the keys `pattern` starting at or after character
    /// `from`.
    ///
    /// A match starts on a character with keys that is not a combining mark,
    /// covers whole characters, takes in ignorable combining marks that
    /// follow it, and is not followed by a significant combining mark.
    #[must_use]
    pub fn find(&self, pattern: &[char], from: usize) -> Option<CollationMatch> {
        if pattern.is_empty() {
            return None;
        }
        (from..self.text.len()).find_map(|start| self.match_at(pattern, start))
    }

    fn match_at(&self, pattern: &[char], start: usize) -> Option<CollationMatch> {
        if !self.has_keys(start) || is_combining_mark(self.text[start]) {
            return None;
        }
        let first_key = self.key_start[start];
        if !self.keys[first_key..].starts_with(pattern) {
            return None;
        }

        // The match must end between two characters.
        let end_key = first_key + pattern.len();
        let mut end = self.key_start.partition_point(|&k| k < end_key);
        if self.key_start.get(end) != Some(&end_key) {
            return None;
        }

        while end < self.text.len() && !self.has_keys(end) && is_combining_mark(self.text[end]) {
            end += 1;
        }
        if end < self.text.len() && is_combining_mark(self.text[end]) {
            return None;
        }
        Some(CollationMatch {
            start,
            len: end - start,
        })
    }
}

/// Katakana to hiragana, small kana to full size.
fn fold_kana(c: char) -> char {
    let hiragana = if ('\u{30a1}'..='\u{30f6}').contains(&c) {
        char::from_u32(u32::from(c) - 0x60).unwrap_or(c)
    } else {
        c
    };
    full_size_kana(hiragana)
}
