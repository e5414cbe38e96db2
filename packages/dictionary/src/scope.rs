//! Compiled lookup scopes shared by both schemes.

use std::collections::BTreeMap;

use crate::DictionaryError;
use crate::document::{Entry, UniqueEntry, WardTiers};
use crate::matcher::{KeywordMatch, KeywordMatcher};

/// Which ward table, and therefore which key, a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WardTier {
    NoAccented,
    Accented,
    ShortAccented,
}

impl WardTier {
    /// Search order.
    pub const ALL: [Self; 3] = [Self::NoAccented, Self::Accented, Self::ShortAccented];

    /// Whether keywords of this tier are matched against the accented key.
    #[must_use]
    pub const fn uses_accented_key(self) -> bool {
        !matches!(self, Self::NoAccented)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAccented => "no-accented",
            Self::Accented => "accented",
            Self::ShortAccented => "short-accented",
        }
    }

    /// Selects this tier's table.
    #[must_use]
    pub const fn select<T>(self, tiers: &WardTiers<T>) -> &T {
        match self {
            Self::NoAccented => &tiers.no_accented,
            Self::Accented => &tiers.accented,
            Self::ShortAccented => &tiers.short_accented,
        }
    }
}

/// Entries of one scope plus the matcher over their keywords.
#[derive(Debug, Clone)]
pub struct Scope {
    entries: BTreeMap<String, Entry>,
    matcher: KeywordMatcher,
}

impl Scope {
    /// # Errors
    ///
    /// Returns [`DictionaryError::Matcher`] if the keywords cannot be
    /// compiled.
    pub fn new(label: &str, entries: BTreeMap<String, Entry>) -> Result<Self, DictionaryError> {
        let matcher = KeywordMatcher::new(
            label,
            entries.iter().map(|(key, entry)| (key.as_str(), &entry.keywords)),
        )?;
        Ok(Self { entries, matcher })
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Rightmost keyword occurrence together with its entry.
    #[must_use]
    pub fn rightmost(&self, haystack: &str) -> Option<(KeywordMatch<'_>, &Entry)> {
        let found = self.matcher.rightmost(haystack)?;
        let entry = self.entries.get(found.key)?;
        Some((found, entry))
    }
}

/// The ward tables of one parent unit, in search order. Empty tiers are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct TieredScope {
    tiers: Vec<(WardTier, Scope)>,
}

impl TieredScope {
    pub(crate) fn push(&mut self, tier: WardTier, scope: Scope) {
        if !scope.is_empty() {
            self.tiers.push((tier, scope));
            self.tiers.sort_by_key(|(tier, _)| *tier);
        }
    }

    /// Tiers in search order.
    pub fn tiers(&self) -> impl Iterator<Item = (WardTier, &Scope)> {
        self.tiers.iter().map(|(tier, scope)| (*tier, scope))
    }

    /// Table of one tier.
    #[must_use]
    pub fn tier(&self, tier: WardTier) -> Option<&Scope> {
        self.tiers.iter().find(|(t, _)| *t == tier).map(|(_, s)| s)
    }

    /// `true` if any tier holds `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.tiers.iter().any(|(_, scope)| scope.contains(key))
    }

    /// Number of distinct units across tiers.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        let mut keys: Vec<&str> = self.tiers.iter().flat_map(|(_, s)| s.keys()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

/// Country-wide index of units whose name alone pins their province.
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    tier: WardTier,
    matcher: KeywordMatcher,
    provinces: BTreeMap<String, String>,
}

impl UniqueIndex {
    /// # Errors
    ///
    /// Returns [`DictionaryError::Matcher`] if the keywords cannot be
    /// compiled.
    pub fn new(
        label: &str,
        tier: WardTier,
        entries: &BTreeMap<String, UniqueEntry>,
    ) -> Result<Self, DictionaryError> {
        let matcher = KeywordMatcher::new(
            label,
            entries.iter().map(|(key, e)| (key.as_str(), &e.keywords)),
        )?;
        let provinces = entries
            .iter()
            .map(|(key, e)| (key.clone(), e.province_key.clone()))
            .collect();
        Ok(Self {
            tier,
            matcher,
            provinces,
        })
    }

    #[must_use]
    pub const fn tier(&self) -> WardTier {
        self.tier
    }

    /// Unit key → province key pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.provinces
            .iter()
            .map(|(unit, province)| (unit.as_str(), province.as_str()))
    }

    /// Rightmost unique keyword occurrence and the province it implies.
    #[must_use]
    pub fn rightmost(&self, haystack: &str) -> Option<(KeywordMatch<'_>, &str)> {
        let found = self.matcher.rightmost(haystack)?;
        let province = self.provinces.get(found.key)?;
        Some((found, province.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}
