//! Legacy → 2025 conversion tables.
//!
//! Legacy wards are identified by a composite key
//! `province|district|ward`. Island districts without wards use an empty
//! ward part (`tinhquangngai|huyenlyson|`).

use std::collections::BTreeMap;

use crate::DictionaryError;
use crate::current::CurrentDictionary;
use crate::document::{CandidateWard, ConversionDocument};

/// Separator between the parts of a composite legacy key.
pub const COMPOSITE_SEPARATOR: char = '|';

/// Builds the composite key of a legacy unit.
#[must_use]
pub fn composite_key(province: &str, district: &str, ward: Option<&str>) -> String {
    format!(
        "{province}{COMPOSITE_SEPARATOR}{district}{COMPOSITE_SEPARATOR}{}",
        ward.unwrap_or_default()
    )
}

/// Read-only conversion lookups.
#[derive(Debug, Clone)]
pub struct ConversionTable {
    version: String,
    /// legacy province → new province
    provinces: BTreeMap<String, String>,
    /// new province → composite → new ward
    undivided: BTreeMap<String, BTreeMap<String, String>>,
    /// new province → composite → candidates
    divided: BTreeMap<String, BTreeMap<String, Vec<CandidateWard>>>,
}

impl ConversionTable {
    /// Compiles a [`ConversionDocument`] and checks every target against
    /// the 2025 dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Integrity`] if a legacy province maps to
    /// two new provinces, a legacy ward maps to two new wards, a target is
    /// unknown to `current`, or a divided ward does not flag exactly one
    /// default candidate.
    pub fn compile(
        document: ConversionDocument,
        current: &CurrentDictionary,
    ) -> Result<Self, DictionaryError> {
        let ConversionDocument {
            version,
            provinces: by_new_province,
            wards,
        } = document;

        let mut provinces = BTreeMap::new();
        for (new_province, legacy) in by_new_province {
            if current.province(&new_province).is_none() {
                return Err(DictionaryError::integrity(format!(
                    "conversion targets unknown province '{new_province}'"
                )));
            }
            for old in legacy {
                if let Some(previous) = provinces.insert(old.clone(), new_province.clone()) {
                    return Err(DictionaryError::integrity(format!(
                        "legacy province '{old}' maps to both '{previous}' and '{new_province}'"
                    )));
                }
            }
        }

        let ensure_ward = |province: &str, ward: &str| {
            if current.wards(province).is_some_and(|w| w.contains(ward)) {
                Ok(())
            } else {
                Err(DictionaryError::integrity(format!(
                    "conversion targets unknown ward '{province}/{ward}'"
                )))
            }
        };

        let mut undivided: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (new_province, by_ward) in wards.undivided {
            let table = undivided.entry(new_province.clone()).or_default();
            for (new_ward, composites) in by_ward {
                ensure_ward(&new_province, &new_ward)?;
                for composite in composites {
                    if let Some(previous) = table.insert(composite.clone(), new_ward.clone()) {
                        return Err(DictionaryError::integrity(format!(
                            "legacy ward '{composite}' maps to both '{previous}' and '{new_ward}'"
                        )));
                    }
                }
            }
        }

        for (new_province, by_composite) in &wards.divided {
            for (composite, candidates) in by_composite {
                let defaults = candidates.iter().filter(|c| c.is_default).count();
                if defaults != 1 {
                    return Err(DictionaryError::integrity(format!(
                        "divided legacy ward '{composite}' must flag exactly one default candidate, found {defaults}"
                    )));
                }
                for candidate in candidates {
                    ensure_ward(new_province, &candidate.ward_key)?;
                }
            }
        }

        let table = Self {
            version,
            provinces,
            undivided,
            divided: wards.divided,
        };

        log::info!(
            "Loaded conversion data v{}: {} legacy provinces, {} undivided and {} divided legacy wards",
            table.version,
            table.provinces.len(),
            table.undivided.values().map(BTreeMap::len).sum::<usize>(),
            table.divided.values().map(BTreeMap::len).sum::<usize>(),
        );

        Ok(table)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 2025 province that absorbed a legacy province.
    #[must_use]
    pub fn new_province(&self, legacy_province: &str) -> Option<&str> {
        self.provinces.get(legacy_province).map(String::as_str)
    }

    /// The single 2025 ward a legacy ward maps onto, if it was not split.
    #[must_use]
    pub fn undivided_ward(&self, new_province: &str, composite: &str) -> Option<&str> {
        self.undivided
            .get(new_province)?
            .get(composite)
            .map(String::as_str)
    }

    /// Candidate 2025 wards of a split legacy ward, in data order.
    #[must_use]
    pub fn divided_candidates(&self, new_province: &str, composite: &str) -> Option<&[CandidateWard]> {
        self.divided
            .get(new_province)?
            .get(composite)
            .map(Vec::as_slice)
    }
}
