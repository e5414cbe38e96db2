//! Multi-keyword matcher with rightmost-occurrence selection.
//!
//! Keywords are compiled longest first into a leftmost-first
//! Aho-Corasick automaton, so at any start position a longer keyword wins
//! over a shorter one it contains (`"thanhphohue"` over `"hue"`). The scan
//! yields non-overlapping matches left to right; callers take the last.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::DictionaryError;

/// A keyword occurrence in a haystack. Offsets are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    /// Canonical key of the entry owning the keyword.
    pub key: &'a str,
    pub keyword: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Compiled keyword set for one scope (all provinces, the districts of one
/// province, the wards of one district, ...).
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    automaton: Option<AhoCorasick>,
    keywords: Vec<String>,
    owners: Vec<String>,
}

impl KeywordMatcher {
    /// Compiles the keywords of every `(key, keywords)` pair.
    ///
    /// A keyword claimed by two keys in the same scope is a data defect:
    /// it is logged and the first key in iteration order keeps it.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Matcher`] if the automaton cannot be
    /// built.
    pub fn new<'a, I, K>(scope: &str, entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (&'a str, K)>,
        K: IntoIterator<Item = &'a String>,
    {
        let mut owned: BTreeMap<String, &'a str> = BTreeMap::new();
        let mut ordered: Vec<(String, &'a str)> = Vec::new();

        for (key, keywords) in entries {
            for keyword in keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    continue;
                }
                match owned.get(&keyword) {
                    Some(owner) if *owner != key => {
                        log::warn!(
                            "Keyword '{keyword}' in {scope} claimed by both '{owner}' and '{key}'; keeping '{owner}'"
                        );
                    }
                    Some(_) => {}
                    None => {
                        owned.insert(keyword.clone(), key);
                        ordered.push((keyword, key));
                    }
                }
            }
        }

        ordered.sort_by_key(|(keyword, _)| Reverse(keyword.chars().count()));

        let (keywords, owners): (Vec<String>, Vec<String>) = ordered
            .into_iter()
            .map(|(keyword, key)| (keyword, key.to_string()))
            .unzip();

        let automaton = if keywords.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostFirst)
                    .build(&keywords)
                    .map_err(|source| DictionaryError::Matcher {
                        scope: scope.to_string(),
                        source,
                    })?,
            )
        };

        Ok(Self {
            automaton,
            keywords,
            owners,
        })
    }

    /// Number of distinct keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Last non-overlapping keyword occurrence in `haystack`.
    #[must_use]
    pub fn rightmost(&self, haystack: &str) -> Option<KeywordMatch<'_>> {
        let found = self.automaton.as_ref()?.find_iter(haystack).last()?;
        let index = found.pattern().as_usize();
        Some(KeywordMatch {
            key: &self.owners[index],
            keyword: &self.keywords[index],
            start: found.start(),
            end: found.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn matcher(entries: &[(&str, Vec<String>)]) -> KeywordMatcher {
        KeywordMatcher::new("test", entries.iter().map(|(k, v)| (*k, v.iter()))).unwrap()
    }

    #[test]
    fn picks_rightmost_occurrence() {
        let m = matcher(&[
            ("thanhphohanoi", s(&["thanhphohanoi", "hanoi"])),
            ("thanhphohue", s(&["thanhphohue", "hue"])),
        ]);
        let found = m.rightmost("hoankiem,hanoi,duongtranphu,hue").unwrap();
        assert_eq!(found.key, "thanhphohue");
        assert_eq!(found.keyword, "hue");
        assert_eq!((found.start, found.end), (28, 31));
    }

    #[test]
    fn longer_keyword_wins_at_same_position() {
        let m = matcher(&[
            ("thanhphohue", s(&["hue", "thuathienhue"])),
            ("x", s(&["thua"])),
        ]);
        let found = m.rightmost("abc,thuathienhue").unwrap();
        assert_eq!(found.keyword, "thuathienhue");
        assert_eq!(found.start, 4);
    }

    #[test]
    fn later_match_beats_earlier_longer_match() {
        let m = matcher(&[
            ("thixahuongthuy", s(&["thixahuongthuy", "huongthuy"])),
            ("quanthuanhoa", s(&["thuanhoa"])),
        ]);
        let found = m.rightmost("phuongthuyxuan,thuanhoa").unwrap();
        assert_eq!(found.key, "quanthuanhoa");
    }

    #[test]
    fn duplicate_keyword_keeps_first_owner() {
        let m = matcher(&[("a", s(&["dup"])), ("b", s(&["dup", "bee"]))]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.rightmost("xdupx").unwrap().key, "a");
        assert_eq!(m.rightmost("xbeex").unwrap().key, "b");
    }

    #[test]
    fn empty_matcher_never_matches() {
        let m = matcher(&[("a", s(&["", "  "]))]);
        assert!(m.is_empty());
        assert!(m.rightmost("anything").is_none());
    }

    #[test]
    fn keywords_are_lowercased() {
        let m = matcher(&[("thanhphohanoi", s(&["HaNoi"]))]);
        assert_eq!(m.rightmost("hanoi").unwrap().keyword, "hanoi");
    }

    #[test]
    fn matches_accented_keywords_on_char_boundaries() {
        let m = matcher(&[("xasapa", s(&["sapả"])), ("phuongsapa", s(&["sapa"]))]);
        let found = m.rightmost("sapả,").unwrap();
        assert_eq!(found.key, "xasapa");
        assert_eq!(found.end, "sapả".len());
    }
}
