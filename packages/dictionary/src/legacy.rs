//! Compiled 63-province dictionary.

use std::collections::{BTreeMap, BTreeSet};

use crate::DictionaryError;
use crate::document::{ConditionalMask, Entry, LegacyDocument};
use crate::matcher::{KeywordMatch, KeywordMatcher};
use crate::scope::{Scope, TieredScope, UniqueIndex, WardTier};

/// An obsolete district, compiled.
#[derive(Debug, Clone)]
pub struct DividedDistrictScope {
    successors: KeywordMatcher,
    default_successor: String,
}

impl DividedDistrictScope {
    /// Successor district owning the rightmost absorbed-ward keyword.
    #[must_use]
    pub fn successor_for(&self, haystack: &str) -> Option<KeywordMatch<'_>> {
        self.successors.rightmost(haystack)
    }

    #[must_use]
    pub fn default_successor(&self) -> &str {
        &self.default_successor
    }
}

/// Obsolete districts of one province.
#[derive(Debug, Clone)]
pub struct DividedScope {
    matcher: KeywordMatcher,
    districts: BTreeMap<String, DividedDistrictScope>,
}

impl DividedScope {
    #[must_use]
    pub fn rightmost(&self, haystack: &str) -> Option<KeywordMatch<'_>> {
        self.matcher.rightmost(haystack)
    }

    #[must_use]
    pub fn district(&self, key: &str) -> Option<&DividedDistrictScope> {
        self.districts.get(key)
    }
}

/// Ward keywords hidden while matching districts of one province.
#[derive(Debug, Clone, Default)]
pub struct MaskRule {
    keywords: Vec<String>,
    conditional: Vec<ConditionalMask>,
}

impl MaskRule {
    /// Keywords to hide given the current accented key.
    #[must_use]
    pub fn active_keywords(&self, accented: &str) -> Vec<&str> {
        let conditional = self
            .conditional
            .iter()
            .filter(|c| c.accented_triggers.iter().any(|t| accented.contains(t.as_str())))
            .map(|c| c.keyword.as_str());
        self.keywords
            .iter()
            .map(String::as_str)
            .chain(conditional)
            .collect()
    }
}

/// Read-only lookups over the legacy layout.
#[derive(Debug, Clone)]
pub struct LegacyDictionary {
    version: String,
    provinces: Scope,
    unique_districts: UniqueIndex,
    districts: BTreeMap<String, Scope>,
    divided: BTreeMap<String, DividedScope>,
    masks: BTreeMap<String, MaskRule>,
    wards: BTreeMap<String, BTreeMap<String, TieredScope>>,
    special_zones: BTreeSet<String>,
}

impl LegacyDictionary {
    /// Compiles and validates a [`LegacyDocument`].
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Integrity`] if the document references
    /// units it does not define, or a divided district does not have
    /// exactly one default successor.
    pub fn compile(document: LegacyDocument) -> Result<Self, DictionaryError> {
        let LegacyDocument {
            version,
            provinces,
            districts,
            unique_districts,
            wards,
            divided_districts,
            district_masks,
            special_zones,
        } = document;

        let provinces = Scope::new("legacy provinces", provinces)?;

        let mut district_scopes = BTreeMap::new();
        for (province, entries) in districts {
            ensure_province(&provinces, &province, "district table")?;
            let scope = Scope::new(&format!("legacy districts of {province}"), entries)?;
            district_scopes.insert(province, scope);
        }

        let mut divided = BTreeMap::new();
        for (province, obsolete) in divided_districts {
            let Some(current) = district_scopes.get(&province) else {
                return Err(DictionaryError::integrity(format!(
                    "divided districts reference province '{province}' with no districts"
                )));
            };
            let matcher = KeywordMatcher::new(
                &format!("legacy divided districts of {province}"),
                obsolete.iter().map(|(key, d)| (key.as_str(), &d.keywords)),
            )?;
            let mut compiled = BTreeMap::new();
            for (key, district) in &obsolete {
                let defaults: Vec<&String> = district
                    .successors
                    .iter()
                    .filter(|(_, s)| s.is_default)
                    .map(|(k, _)| k)
                    .collect();
                let [default_successor] = defaults.as_slice() else {
                    return Err(DictionaryError::integrity(format!(
                        "divided district '{province}/{key}' must have exactly one default successor, found {}",
                        defaults.len()
                    )));
                };
                if let Some(missing) = district.successors.keys().find(|k| !current.contains(k)) {
                    return Err(DictionaryError::integrity(format!(
                        "divided district '{province}/{key}' names unknown successor '{missing}'"
                    )));
                }
                let successors = KeywordMatcher::new(
                    &format!("successors of {province}/{key}"),
                    district
                        .successors
                        .iter()
                        .map(|(k, s)| (k.as_str(), &s.ward_keywords)),
                )?;
                compiled.insert(
                    key.clone(),
                    DividedDistrictScope {
                        successors,
                        default_successor: (*default_successor).clone(),
                    },
                );
            }
            divided.insert(
                province,
                DividedScope {
                    matcher,
                    districts: compiled,
                },
            );
        }

        let unique_districts = UniqueIndex::new(
            "legacy unique districts",
            WardTier::NoAccented,
            &unique_districts,
        )?;
        for (district, province) in unique_districts.entries() {
            ensure_province(&provinces, province, "unique district index")?;
            let direct = district_scopes
                .get(province)
                .is_some_and(|s| s.contains(district));
            let obsolete = divided
                .get(province)
                .is_some_and(|d| d.district(district).is_some());
            if !direct && !obsolete {
                return Err(DictionaryError::integrity(format!(
                    "unique district '{district}' is not a district of '{province}'"
                )));
            }
        }

        let mut ward_scopes: BTreeMap<String, BTreeMap<String, TieredScope>> = BTreeMap::new();
        for tier in WardTier::ALL {
            for (province, by_district) in tier.select(&wards) {
                for (district, entries) in by_district {
                    if !district_scopes
                        .get(province)
                        .is_some_and(|s| s.contains(district))
                    {
                        return Err(DictionaryError::integrity(format!(
                            "{} ward table references unknown district '{province}/{district}'",
                            tier.as_str()
                        )));
                    }
                    let scope = Scope::new(
                        &format!("{} wards of {province}/{district}", tier.as_str()),
                        entries.clone(),
                    )?;
                    ward_scopes
                        .entry(province.clone())
                        .or_default()
                        .entry(district.clone())
                        .or_default()
                        .push(tier, scope);
                }
            }
        }

        let mut masks = BTreeMap::new();
        for (province, mask) in district_masks {
            ensure_province(&provinces, &province, "district masks")?;
            masks.insert(
                province,
                MaskRule {
                    keywords: mask.keywords,
                    conditional: mask.conditional,
                },
            );
        }

        let dictionary = Self {
            version,
            provinces,
            unique_districts,
            districts: district_scopes,
            divided,
            masks,
            wards: ward_scopes,
            special_zones,
        };

        log::info!(
            "Loaded legacy reference data v{}: {} provinces, {} districts, {} wards",
            dictionary.version,
            dictionary.provinces.len(),
            dictionary.districts.values().map(Scope::len).sum::<usize>(),
            dictionary.ward_count(),
        );

        Ok(dictionary)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub const fn provinces(&self) -> &Scope {
        &self.provinces
    }

    #[must_use]
    pub const fn unique_districts(&self) -> &UniqueIndex {
        &self.unique_districts
    }

    #[must_use]
    pub fn districts(&self, province: &str) -> Option<&Scope> {
        self.districts.get(province)
    }

    #[must_use]
    pub fn district(&self, province: &str, district: &str) -> Option<&Entry> {
        self.districts.get(province)?.entry(district)
    }

    #[must_use]
    pub fn divided(&self, province: &str) -> Option<&DividedScope> {
        self.divided.get(province)
    }

    #[must_use]
    pub fn mask(&self, province: &str) -> Option<&MaskRule> {
        self.masks.get(province)
    }

    #[must_use]
    pub fn wards(&self, province: &str, district: &str) -> Option<&TieredScope> {
        self.wards.get(province)?.get(district)
    }

    /// Island districts that have no ward tier.
    #[must_use]
    pub fn is_special_zone(&self, district: &str) -> bool {
        self.special_zones.contains(district)
    }

    #[must_use]
    pub fn district_count(&self) -> usize {
        self.districts.values().map(Scope::len).sum()
    }

    #[must_use]
    pub fn ward_count(&self) -> usize {
        self.wards
            .values()
            .flat_map(BTreeMap::values)
            .map(TieredScope::unit_count)
            .sum()
    }
}

fn ensure_province(provinces: &Scope, province: &str, context: &str) -> Result<(), DictionaryError> {
    if provinces.contains(province) {
        Ok(())
    } else {
        Err(DictionaryError::integrity(format!(
            "{context} references unknown province '{province}'"
        )))
    }
}
