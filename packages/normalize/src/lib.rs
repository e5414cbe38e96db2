#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Text normalization for Vietnamese address matching.
//!
//! Two stages, both pure:
//!
//! 1. [`normalize_display`] cleans the human-readable text (composed
//!    Unicode, straight quotes, spaced hyphens, single spaces, canonical
//!    tone placement). Street names are later cut out of this form.
//! 2. [`keys`] derives the two match keys from display text: the
//!    **loose** key (lowercase, accents folded) and the **accented** key
//!    (lowercase, accents kept). Everything except letters, digits and
//!    commas is dropped.
//!
//! Every source character contributes either nothing or exactly one
//! character to *both* keys, so character offsets line up: a keyword
//! found at `[start, end)` in one key occupies `[start, end)` in the
//! other.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Separator that survives key normalization.
pub const SEPARATOR: char = ',';

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static APOSTROPHE_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'\s+").expect("valid regex"));

/// Old-style tone placement rewritten to the modern form.
static TONE_PLACEMENT: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("Hoà", "Hòa"),
        ("Hoá", "Hóa"),
        ("Hoả", "Hỏa"),
        ("Hoè", "Hòe"),
        ("Thuỷ", "Thủy"),
        ("Thuỵ", "Thụy"),
        ("Uý", "Úy"),
        ("Khoá", "Khóa"),
    ]
    .into_iter()
    .map(|(from, to)| {
        (
            Regex::new(&format!(r"\b{from}\b")).expect("valid regex"),
            to,
        )
    })
    .collect()
});

/// Cleans raw address text for display and street extraction.
///
/// Composes Unicode (NFC), straightens curly quotes, pads hyphens with
/// spaces, collapses whitespace, drops spaces after apostrophes, trims, and
/// rewrites old-style tone marks (`Hoà` becomes `Hòa`).
#[must_use]
pub fn normalize_display(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let quoted = composed
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('-', " - ");
    let spaced = WHITESPACE_RE.replace_all(&quoted, " ");
    let mut text = APOSTROPHE_SPACE_RE
        .replace_all(&spaced, "'")
        .trim()
        .to_string();

    for (pattern, replacement) in TONE_PLACEMENT.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
    }

    text
}

/// The pair of match keys derived from one display string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressKeys {
    /// Accent-folded key, e.g. `"hanoi"`.
    pub loose: String,
    /// Accent-preserving key, e.g. `"hànội"`.
    pub accented: String,
}

/// Builds both match keys in one pass.
#[must_use]
pub fn keys(text: &str) -> AddressKeys {
    let mut keys = AddressKeys::default();
    for c in text.nfc() {
        if let Some(accented) = accented_char(c) {
            keys.accented.push(accented);
            keys.loose.push(fold_char(accented));
        }
    }
    keys
}

/// Accent-folded match key.
#[must_use]
pub fn loose_key(text: &str) -> String {
    text.nfc().filter_map(accented_char).map(fold_char).collect()
}

/// Accent-preserving match key.
#[must_use]
pub fn accented_key(text: &str) -> String {
    text.nfc().filter_map(accented_char).collect()
}

/// Loose key contribution of a single display character.
///
/// Keys are built character by character, so the loose key of any prefix
/// of a text is the concatenation of this function over the prefix.
#[must_use]
pub fn loose_char(c: char) -> Option<char> {
    accented_char(c).map(fold_char)
}

/// Lowercased key character, or `None` for characters keys drop.
fn accented_char(c: char) -> Option<char> {
    if c == SEPARATOR {
        return Some(c);
    }
    if !c.is_alphanumeric() {
        return None;
    }
    Some(c.to_lowercase().next().unwrap_or(c))
}

/// Strips diacritics from one lowercase character.
///
/// `đ` has no decomposition and is mapped explicitly.
#[must_use]
pub fn fold_char(c: char) -> char {
    if c == 'đ' || c == 'Đ' {
        return 'd';
    }
    std::iter::once(c)
        .nfd()
        .find(|d| !is_combining_mark(*d))
        .unwrap_or(c)
}

/// Title-cases text the way address books print it: the first letter of
/// every run of letters is uppercased and the rest lowercased.
///
/// `"52 đường số 4"` becomes `"52 Đường Số 4"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Removes whitespace, commas and periods from both ends.
#[must_use]
pub fn trim_punctuation(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
}
