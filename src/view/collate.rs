//! Locale-aware label ordering.
//!
//! Labels compare first by their letters with case and common Latin accents
//! folded away, then by accents (unaccented first), then by case (lowercase
//! first), and finally by the raw string so the order is total.

use std::cmp::Ordering;

/// Compares two display labels for ascending, human-friendly ordering.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let a_keys = keys(a);
    let b_keys = keys(b);

    a_keys
        .iter()
        .map(|k| k.base)
        .cmp(b_keys.iter().map(|k| k.base))
        .then_with(|| {
            a_keys
                .iter()
                .map(|k| k.accented)
                .cmp(b_keys.iter().map(|k| k.accented))
        })
        .then_with(|| {
            a_keys
                .iter()
                .map(|k| k.upper)
                .cmp(b_keys.iter().map(|k| k.upper))
        })
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy)]
struct Key {
    base: char,
    accented: bool,
    upper: bool,
}

fn keys(s: &str) -> Vec<Key> {
    s.chars()
        .map(|c| {
            let lower = c.to_lowercase().next().unwrap_or(c);
            let base = strip_accent(lower);
            Key {
                base,
                accented: base != lower,
                upper: lower != c,
            }
        })
        .collect()
}

const fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
