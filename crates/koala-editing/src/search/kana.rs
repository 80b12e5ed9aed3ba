//! Kana comparison for matches the collator accepts too eagerly.
//!
//! At primary strength small and full-size kana compare equal, as do kana
//! with and without voiced sound marks. Japanese readers do not consider
//! `は` a match for `ば`, so such matches are rejected after the fact.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::decompose_canonical;

use super::unicode::{is_combining_voiced_sound_mark, is_kana_letter, is_small_kana_letter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoicedSoundMark {
    None,
    Voiced,
    SemiVoiced,
}

/// The sound mark composed into a kana letter, read off its canonical
/// decomposition.
fn composed_voiced_sound_mark(c: char) -> VoicedSoundMark {
    let mut last = c;
    decompose_canonical(c, |d| last = d);
    match last {
        '\u{3099}' if last != c => VoicedSoundMark::Voiced,
        '\u{309a}' if last != c => VoicedSoundMark::SemiVoiced,
        _ => VoicedSoundMark::None,
    }
}

/// Whether `text` has any kana letter, so that matches need checking.
pub(crate) fn contains_kana_letters(text: &[char]) -> bool {
    text.iter().any(|&c| is_kana_letter(c))
}

/// NFC form of `text`, which the check below compares.
pub(crate) fn normalize(text: &[char]) -> Vec<char> {
    text.iter().copied().nfc().collect()
}

/// Whether two NFC strings agree on every kana letter: same count, same
/// size, same composed sound mark, and the same combining sound marks after
/// each letter. Everything between kana letters is ignored.
pub(crate) fn check_only_kana_letters_in_strings(first: &[char], second: &[char]) -> bool {
    let (mut a, mut b) = (0, 0);
    loop {
        while a < first.len() && !is_kana_letter(first[a]) {
            a += 1;
        }
        while b < second.len() && !is_kana_letter(second[b]) {
            b += 1;
        }
        if a == first.len() || b == second.len() {
            return a == first.len() && b == second.len();
        }

        if is_small_kana_letter(first[a]) != is_small_kana_letter(second[b]) {
            return false;
        }
        if composed_voiced_sound_mark(first[a]) != composed_voiced_sound_mark(second[b]) {
            return false;
        }
        a += 1;
        b += 1;

        loop {
            let a_is_combining = first.get(a).is_some_and(|&c| is_combining_voiced_sound_mark(c));
            let b_is_combining = second.get(b).is_some_and(|&c| is_combining_voiced_sound_mark(c));
            if !a_is_combining && !b_is_combining {
                break;
            }
            if !a_is_combining || !b_is_combining || first[a] != second[b] {
                return false;
            }
            a += 1;
            b += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfc(s: &str) -> Vec<char> {
        normalize(&s.chars().collect::<Vec<_>>())
    }

    #[test]
    fn test_voiced_sound_marks() {
        assert_eq!(composed_voiced_sound_mark('\u{304c}'), VoicedSoundMark::Voiced);
        assert_eq!(composed_voiced_sound_mark('\u{3071}'), VoicedSoundMark::SemiVoiced);
        assert_eq!(composed_voiced_sound_mark('\u{306f}'), VoicedSoundMark::None);
        assert_eq!(composed_voiced_sound_mark('\u{3099}'), VoicedSoundMark::None);
    }

    #[test]
    fn test_identical_kana_pass() {
        assert!(check_only_kana_letters_in_strings(&nfc("\u{304b}\u{306a}"), &nfc("\u{304b}\u{306a}")));
        assert!(check_only_kana_letters_in_strings(&nfc("ab"), &nfc("xyz")));
    }

    #[test]
    fn test_kana_differences_rejected() {
        // ha / ba
        assert!(!check_only_kana_letters_in_strings(&nfc("\u{306f}"), &nfc("\u{3070}")));
        // tsu / small tsu
        assert!(!check_only_kana_letters_in_strings(&nfc("\u{3064}"), &nfc("\u{3063}")));
        // different kana counts
        assert!(!check_only_kana_letters_in_strings(&nfc("\u{304b}"), &nfc("\u{304b}\u{304b}")));
    }

    #[test]
    fn test_decomposed_input_normalizes() {
        assert!(check_only_kana_letters_in_strings(&nfc("\u{304b}\u{3099}"), &nfc("\u{304c}")));
    }

    #[test]
    fn test_contains_kana() {
        assert!(contains_kana_letters(&['a', '\u{30ab}']));
        assert!(!contains_kana_letters(&['a', '\u{4e2d}']));
    }
}
