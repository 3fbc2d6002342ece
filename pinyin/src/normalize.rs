//! Query normalization for typed pinyin.
//!
//! Users sometimes type (or paste) tone-marked pinyin such as `nǐhǎo`.
//! Readings produced by the romanizer are tone-less, so the query is folded
//! to plain letters before matching.

use phf::phf_map;

/// Tone-marked letters and their plain forms. The ü family folds to `ü`
/// and is spelled afterwards.
static TONE_MARKS: phf::Map<char, char> = phf_map! {
    'ā' => 'a', 'á' => 'a', 'ǎ' => 'a', 'à' => 'a',
    'ē' => 'e', 'é' => 'e', 'ě' => 'e', 'è' => 'e',
    'ī' => 'i', 'í' => 'i', 'ǐ' => 'i', 'ì' => 'i',
    'ō' => 'o', 'ó' => 'o', 'ǒ' => 'o', 'ò' => 'o',
    'ū' => 'u', 'ú' => 'u', 'ǔ' => 'u', 'ù' => 'u',
    'ǖ' => 'ü', 'ǘ' => 'ü', 'ǚ' => 'ü', 'ǜ' => 'ü',
    'ń' => 'n', 'ň' => 'n', 'ǹ' => 'n', 'ḿ' => 'm',
    'Ā' => 'A', 'Á' => 'A', 'Ǎ' => 'A', 'À' => 'A',
    'Ē' => 'E', 'É' => 'E', 'Ě' => 'E', 'È' => 'E',
    'Ī' => 'I', 'Í' => 'I', 'Ǐ' => 'I', 'Ì' => 'I',
    'Ō' => 'O', 'Ó' => 'O', 'Ǒ' => 'O', 'Ò' => 'O',
    'Ū' => 'U', 'Ú' => 'U', 'Ǔ' => 'U', 'Ù' => 'U',
    'Ǖ' => 'Ü', 'Ǘ' => 'Ü', 'Ǚ' => 'Ü', 'Ǜ' => 'Ü',
};

/// Combining diacritics left over from decomposed input.
fn is_combining_mark(ch: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&ch)
}

/// Spell `ü` the way readings are spelled: `v` or plain `u`.
pub fn spell_umlaut(text: &str, umlaut_as_v: bool) -> String {
    text.chars()
        .map(|ch| match ch {
            'ü' if umlaut_as_v => 'v',
            'Ü' if umlaut_as_v => 'V',
            'ü' => 'u',
            'Ü' => 'U',
            other => other,
        })
        .collect()
}

/// Fold tone marks out of a raw query.
///
/// Everything that is not a tone-marked letter passes through unchanged,
/// Han characters included.
pub fn normalize_query(raw: &str, umlaut_as_v: bool) -> String {
    let folded: String = raw
        .chars()
        .filter(|&ch| !is_combining_mark(ch))
        .map(|ch| TONE_MARKS.get(&ch).copied().unwrap_or(ch))
        .collect();
    spell_umlaut(&folded, umlaut_as_v)
}
