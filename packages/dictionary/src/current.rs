//! Compiled 34-province dictionary.

use std::collections::BTreeMap;

use crate::DictionaryError;
use crate::document::{CurrentDocument, Entry};
use crate::scope::{Scope, TieredScope, UniqueIndex, WardTier};

/// Read-only lookups over the 2025 layout.
#[derive(Debug, Clone)]
pub struct CurrentDictionary {
    version: String,
    provinces: Scope,
    wards: BTreeMap<String, TieredScope>,
    unique_wards: Vec<UniqueIndex>,
}

impl CurrentDictionary {
    /// Compiles and validates a [`CurrentDocument`].
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Integrity`] if a ward table or unique
    /// index references a unit the document does not define.
    pub fn compile(document: CurrentDocument) -> Result<Self, DictionaryError> {
        let CurrentDocument {
            version,
            provinces,
            wards,
            unique_wards,
        } = document;

        let provinces = Scope::new("current provinces", provinces)?;

        let mut ward_scopes: BTreeMap<String, TieredScope> = BTreeMap::new();
        for tier in WardTier::ALL {
            for (province, entries) in tier.select(&wards) {
                if !provinces.contains(province) {
                    return Err(DictionaryError::integrity(format!(
                        "{} ward table references unknown province '{province}'",
                        tier.as_str()
                    )));
                }
                let scope = Scope::new(
                    &format!("{} wards of {province}", tier.as_str()),
                    entries.clone(),
                )?;
                ward_scopes
                    .entry(province.clone())
                    .or_default()
                    .push(tier, scope);
            }
        }

        let mut unique = Vec::new();
        for tier in [WardTier::NoAccented, WardTier::Accented] {
            let index = UniqueIndex::new(
                &format!("{} unique wards", tier.as_str()),
                tier,
                tier.select(&unique_wards),
            )?;
            for (ward, province) in index.entries() {
                let known = ward_scopes
                    .get(province)
                    .and_then(|w| w.tier(tier))
                    .is_some_and(|s| s.contains(ward));
                if !known {
                    return Err(DictionaryError::integrity(format!(
                        "{} unique ward '{ward}' is not in the {} ward table of '{province}'",
                        tier.as_str(),
                        tier.as_str()
                    )));
                }
            }
            if !index.is_empty() {
                unique.push(index);
            }
        }

        let dictionary = Self {
            version,
            provinces,
            wards: ward_scopes,
            unique_wards: unique,
        };

        log::info!(
            "Loaded current reference data v{}: {} provinces, {} wards",
            dictionary.version,
            dictionary.provinces.len(),
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
    pub fn province(&self, key: &str) -> Option<&Entry> {
        self.provinces.entry(key)
    }

    #[must_use]
    pub fn wards(&self, province: &str) -> Option<&TieredScope> {
        self.wards.get(province)
    }

    /// Unique-ward indexes in search order (unaccented first).
    #[must_use]
    pub fn unique_wards(&self) -> &[UniqueIndex] {
        &self.unique_wards
    }

    #[must_use]
    pub fn ward_count(&self) -> usize {
        self.wards.values().map(TieredScope::unit_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> serde_json::Value {
        serde_json::json!({
            "version": "test",
            "provinces": {
                "tinhlaocai": {"name": "Tỉnh Lào Cai", "shortName": "Lào Cai", "keywords": ["laocai"]}
            },
            "wards": {
                "noAccented": {
                    "tinhlaocai": {
                        "phuongsapa": {"name": "Phường Sa Pa", "shortName": "Sa Pa", "keywords": ["phuongsapa"]},
                        "xasapa": {"name": "Xã Sa Pả", "shortName": "Sa Pả", "keywords": ["xasapa"]}
                    }
                },
                "accented": {
                    "tinhlaocai": {
                        "xasapa": {"name": "Xã Sa Pả", "shortName": "Sa Pả", "keywords": ["sapả"]}
                    }
                }
            },
            "uniqueWards": {
                "accented": {"xasapa": {"provinceKey": "tinhlaocai", "keywords": ["sapả"]}}
            }
        })
    }

    #[test]
    fn compiles_tiers_in_search_order() {
        let dict = CurrentDictionary::compile(serde_json::from_value(base()).unwrap()).unwrap();
        let wards = dict.wards("tinhlaocai").unwrap();
        let tiers: Vec<WardTier> = wards.tiers().map(|(t, _)| t).collect();
        assert_eq!(tiers, vec![WardTier::NoAccented, WardTier::Accented]);
        assert_eq!(dict.ward_count(), 2);
        assert_eq!(dict.unique_wards().len(), 1);
        assert_eq!(dict.unique_wards()[0].tier(), WardTier::Accented);
    }

    #[test]
    fn rejects_unique_ward_missing_from_its_tier() {
        let mut json = base();
        json["uniqueWards"]["noAccented"] =
            serde_json::json!({"xaban": {"provinceKey": "tinhlaocai", "keywords": ["xaban"]}});
        let err = CurrentDictionary::compile(serde_json::from_value(json).unwrap()).unwrap_err();
        assert!(matches!(err, DictionaryError::Integrity { .. }));
    }

    #[test]
    fn rejects_wards_of_unknown_province() {
        let mut json = base();
        json["wards"]["noAccented"]["tinhyenbai"] = serde_json::json!({});
        assert!(CurrentDictionary::compile(serde_json::from_value(json).unwrap()).is_err());
    }
}
