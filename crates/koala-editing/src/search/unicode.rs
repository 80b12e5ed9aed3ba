//! Character classes used by find-in-page.

use unicode_segmentation::UnicodeSegmentation;

/// Characters treated as not being there at all when comparing text.
pub(crate) const fn is_ignorable(c: char) -> bool {
    matches!(
        c,
        '\0' | '\u{ad}' | '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}'
    )
}

/// Fold typographic quotes to their ASCII forms and make soft hyphens
/// ignorable, so that `it's` finds `it’s`.
pub(crate) fn fold_quote_marks_and_soft_hyphens(chars: &mut [char]) {
    for c in chars {
        *c = match *c {
            '\u{5f3}' | '\u{2018}' | '\u{2019}' => '\'',
            '\u{5f4}' | '\u{201c}' | '\u{201d}' => '"',
            '\u{ad}' => '\0',
            other => other,
        };
    }
}

/// Punctuation, symbols, spaces and format characters: characters that do
/// not occur at the start of a word.
pub(crate) fn is_separator(c: char) -> bool {
    match c {
        '\0'..='\u{1f}' | '\u{7f}'..='\u{9f}' => false,
        ' ' => true,
        _ if c.is_ascii() => c.is_ascii_punctuation(),
        // Latin-1: everything in A0..BF except the feminine and masculine
        // ordinals, superscript digits, micro sign and vulgar fractions.
        '\u{a0}'..='\u{bf}' => !matches!(c, '\u{aa}' | '\u{b2}' | '\u{b3}' | '\u{b5}' | '\u{b9}'..='\u{ba}' | '\u{bc}'..='\u{be}'),
        '\u{d7}' | '\u{f7}' => true,
        '\u{c0}'..='\u{ff}' => false,
        _ if c.is_whitespace() => true,
        _ => matches!(
            c,
            '\u{589}'
                | '\u{5be}'
                | '\u{5c0}'
                | '\u{5c3}'
                | '\u{5f3}'
                | '\u{5f4}'
                | '\u{60c}'
                | '\u{61b}'
                | '\u{61f}'
                | '\u{66a}'..='\u{66d}'
                | '\u{6d4}'
                | '\u{964}'
                | '\u{965}'
                | '\u{e5a}'
                | '\u{e5b}'
                | '\u{2000}'..='\u{206f}'
                | '\u{20a0}'..='\u{20cf}'
                | '\u{2190}'..='\u{2bff}'
                | '\u{2e00}'..='\u{2e7f}'
                | '\u{2ff0}'..='\u{2fff}'
                | '\u{3000}'..='\u{3004}'
                | '\u{3008}'..='\u{3020}'
                | '\u{3030}'
                | '\u{3036}'
                | '\u{3037}'
                | '\u{303d}'..='\u{303f}'
                | '\u{fe10}'..='\u{fe1f}'
                | '\u{fe30}'..='\u{fe6f}'
                | '\u{feff}'
                | '\u{ff01}'..='\u{ff0f}'
                | '\u{ff1a}'..='\u{ff20}'
                | '\u{ff3b}'..='\u{ff40}'
                | '\u{ff5b}'..='\u{ff65}'
                | '\u{ffe0}'..='\u{ffee}'
                | '\u{1f000}'..='\u{1faff}'
        ),
    }
}

/// Ideographs, kana, and the symbols used mostly in CJK text. Scripts without
/// word separators, where any character may start a word.
pub(crate) fn is_cjk_ideograph_or_symbol(c: char) -> bool {
    if c < '\u{2c7}' {
        return false;
    }
    matches!(
        c,
        '\u{2c7}'
            | '\u{2ca}'
            | '\u{2cb}'
            | '\u{2d9}'
            | '\u{2ea}'
            | '\u{2eb}'
            | '\u{2015}'
            | '\u{2016}'
            | '\u{2018}'
            | '\u{2019}'
            | '\u{201c}'
            | '\u{201d}'
            | '\u{2020}'
            | '\u{2021}'
            | '\u{2025}'
            | '\u{2030}'
            | '\u{2032}'
            | '\u{2033}'
            | '\u{2035}'
            | '\u{203b}'
            | '\u{203e}'
            | '\u{2103}'
            | '\u{2116}'
            | '\u{2121}'
            | '\u{2156}'..='\u{215a}'
            | '\u{2160}'..='\u{216b}'
            | '\u{2170}'..='\u{217b}'
            | '\u{2460}'..='\u{2492}'
            | '\u{249c}'..='\u{24ff}'
            | '\u{25a0}'
            | '\u{25a1}'
            | '\u{25b2}'
            | '\u{25b3}'
            | '\u{25c6}'
            | '\u{25c7}'
            | '\u{25cb}'
            | '\u{25ce}'..='\u{25d3}'
            | '\u{2605}'
            | '\u{2606}'
            | '\u{2776}'..='\u{277f}'
            // Radicals and strokes.
            | '\u{2e80}'..='\u{2fdf}'
            // Ideographic description, CJK punctuation (not the wavy dash),
            // hiragana, katakana and bopomofo.
            | '\u{2ff0}'..='\u{302f}'
            | '\u{3031}'..='\u{312f}'
            | '\u{3190}'..='\u{31ef}'
            // Enclosed letters and CJK compatibility.
            | '\u{3200}'..='\u{33ff}'
            | '\u{3400}'..='\u{4dbf}'
            | '\u{4e00}'..='\u{9fff}'
            | '\u{f900}'..='\u{faff}'
            | '\u{fe30}'..='\u{fe4f}'
            | '\u{ff00}'..='\u{ff0c}'
            | '\u{ff0e}'..='\u{ff1a}'
            | '\u{ff1f}'..='\u{ffef}'
            | '\u{1f110}'..='\u{1f129}'
            | '\u{1f130}'..='\u{1f149}'
            | '\u{1f150}'..='\u{1f169}'
            | '\u{1f170}'..='\u{1f189}'
            | '\u{1f200}'..='\u{1f6ff}'
            | '\u{20000}'..='\u{2fa1f}'
    )
}

/// [UAX #14 class SA](https://www.unicode.org/reports/tr14/#SA)
///
/// Scripts whose word boundaries can only be found from surrounding text
/// (Thai, Lao, Myanmar, Khmer and the Tai scripts).
pub(crate) const fn requires_context_for_word_boundary(c: char) -> bool {
    matches!(
        c,
        '\u{e00}'..='\u{eff}'
            | '\u{1000}'..='\u{109f}'
            | '\u{1780}'..='\u{17ff}'
            | '\u{1950}'..='\u{19df}'
            | '\u{1a20}'..='\u{1aaf}'
            | '\u{a9e0}'..='\u{a9ff}'
            | '\u{aa60}'..='\u{aadf}'
    )
}

/// Start of the run of context-dependent characters that ends `chars`, or
/// `chars.len()` when the last character is not context dependent.
pub(crate) fn start_of_last_word_boundary_context(chars: &[char]) -> usize {
    chars
        .iter()
        .rposition(|&c| !requires_context_for_word_boundary(c))
        .map_or(0, |i| i + 1)
}

/// [UAX #29 word boundaries](https://www.unicode.org/reports/tr29/#Word_Boundaries)
/// of `chars`, as character offsets, `0` and `chars.len()` included.
pub(crate) fn word_boundaries(chars: &[char]) -> Vec<usize> {
    let text: String = chars.iter().collect();
    let mut boundaries = Vec::with_capacity(chars.len() / 4 + 2);
    let mut offset = 0;
    boundaries.push(0);
    for word in text.split_word_bounds() {
        offset += word.chars().count();
        boundaries.push(offset);
    }
    boundaries
}

/// The last word start strictly before `position`: a boundary followed by an
/// alphanumeric character. `0` if there is none.
pub(crate) fn previous_word_start(chars: &[char], boundaries: &[usize], position: usize) -> usize {
    boundaries
        .iter()
        .rev()
        .filter(|&&b| b < position)
        .find(|&&b| chars.get(b).is_some_and(|&c| c.is_alphanumeric()))
        .copied()
        .unwrap_or(0)
}

/// Hiragana, katakana and halfwidth katakana letters.
pub(crate) const fn is_kana_letter(c: char) -> bool {
    matches!(
        c,
        '\u{3041}'..='\u{3096}' | '\u{30a1}'..='\u{30fa}' | '\u{31f0}'..='\u{31ff}' | '\u{ff66}'..='\u{ff6f}' | '\u{ff71}'..='\u{ff9d}'
    )
}

/// Small forms of kana letters (the small `tsu` of a geminate, the small
/// vowels of a contracted sound).
pub(crate) const fn is_small_kana_letter(c: char) -> bool {
    matches!(
        c,
        '\u{3041}'
            | '\u{3043}'
            | '\u{3045}'
            | '\u{3047}'
            | '\u{3049}'
            | '\u{3063}'
            | '\u{3083}'
            | '\u{3085}'
            | '\u{3087}'
            | '\u{308e}'
            | '\u{3095}'
            | '\u{3096}'
            | '\u{30a1}'
            | '\u{30a3}'
            | '\u{30a5}'
            | '\u{30a7}'
            | '\u{30a9}'
            | '\u{30c3}'
            | '\u{30e3}'
            | '\u{30e5}'
            | '\u{30e7}'
            | '\u{30ee}'
            | '\u{30f5}'
            | '\u{30f6}'
            | '\u{31f0}'..='\u{31ff}'
            | '\u{ff67}'..='\u{ff6f}'
    )
}

/// The full-size kana for a small one.
pub(crate) const fn full_size_kana(c: char) -> char {
    match c {
        '\u{3041}' => '\u{3042}',
        '\u{3043}' => '\u{3044}',
        '\u{3045}' => '\u{3046}',
        '\u{3047}' => '\u{3048}',
        '\u{3049}' => '\u{304a}',
        '\u{3063}' => '\u{3064}',
        '\u{3083}' => '\u{3084}',
        '\u{3085}' => '\u{3086}',
        '\u{3087}' => '\u{3088}',
        '\u{308e}' => '\u{308f}',
        '\u{3095}' => '\u{304b}',
        '\u{3096}' => '\u{3051}',
        _ => c,
    }
}

/// Combining (semi-)voiced sound marks, as left by canonical decomposition of
/// `ga`, `pa` and the like.
pub(crate) const fn is_combining_voiced_sound_mark(c: char) -> bool {
    matches!(c, '\u{3099}' | '\u{309a}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_separators() {
        assert!(is_separator(' '));
        assert!(is_separator('.'));
        assert!(is_separator('\u{a0}'));
        assert!(is_separator('\u{2014}'));
        assert!(is_separator('\u{3001}'));
        assert!(!is_separator('a'));
        assert!(!is_separator('7'));
        assert!(!is_separator('\u{e9}'));
        assert!(!is_separator('\u{3042}'));
        assert!(!is_separator('\n'));
    }

    #[test]
    fn test_fold_quote_marks() {
        let mut text = chars("\u{2018}it\u{2019}s\u{ad}\u{201c}");
        fold_quote_marks_and_soft_hyphens(&mut text);
        assert_eq!(text, chars("'it's\0\""));
    }

    #[test]
    fn test_cjk() {
        assert!(is_cjk_ideograph_or_symbol('\u{4e2d}'));
        assert!(is_cjk_ideograph_or_symbol('\u{3042}'));
        assert!(is_cjk_ideograph_or_symbol('\u{30ab}'));
        assert!(!is_cjk_ideograph_or_symbol('a'));
        assert!(!is_cjk_ideograph_or_symbol('\u{3030}'));
    }

    #[test]
    fn test_word_boundary_context() {
        assert_eq!(start_of_last_word_boundary_context(&chars("abc")), 3);
        assert_eq!(start_of_last_word_boundary_context(&chars("ab\u{e01}\u{e02}")), 2);
        assert_eq!(start_of_last_word_boundary_context(&chars("\u{e01}\u{e02}")), 0);
        assert_eq!(start_of_last_word_boundary_context(&[]), 0);
    }

    #[test]
    fn test_previous_word_start() {
        let text = chars("hello big world");
        let boundaries = word_boundaries(&text);
        assert_eq!(boundaries, vec![0, 5, 6, 9, 10, 15]);
        assert_eq!(previous_word_start(&text, &boundaries, 15), 10);
        assert_eq!(previous_word_start(&text, &boundaries, 10), 6);
        assert_eq!(previous_word_start(&text, &boundaries, 3), 0);

        // A word led by an underscore does not start at the underscore.
        let text = chars("a _b");
        let boundaries = word_boundaries(&text);
        assert_eq!(boundaries, vec![0, 1, 2, 4]);
        assert_eq!(previous_word_start(&text, &boundaries, 4), 0);
    }

    #[test]
    fn test_kana_classes() {
        assert!(is_kana_letter('\u{3042}'));
        assert!(is_kana_letter('\u{30ab}'));
        assert!(!is_kana_letter('\u{30fc}'));
        assert!(is_small_kana_letter('\u{3063}'));
        assert!(!is_small_kana_letter('\u{3064}'));
        assert_eq!(full_size_kana('\u{3063}'), '\u{3064}');
        assert_eq!(full_size_kana('\u{3041}'), '\u{3042}');
        assert_eq!(full_size_kana('\u{3042}'), '\u{3042}');
    }
}
