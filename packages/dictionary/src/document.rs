//! On-disk reference data documents.
//!
//! These mirror the JSON layout of `legacy.json`, `current.json` and
//! `conversion.json` one-to-one. They are compiled into the lookup
//! structures in [`crate::legacy`], [`crate::current`] and
//! [`crate::conversion`] and then dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use vn_admin_resolver_models::{Coordinates, UnitComponent};

/// One administrative unit at any tier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub short_name: String,
    #[serde(rename = "type", default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub area_km2: Option<f64>,
    /// Normalized spellings that identify this unit in text.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Entry {
    /// Builds the resolver output component for this entry.
    #[must_use]
    pub fn component(&self, key: &str) -> UnitComponent {
        UnitComponent {
            key: key.to_string(),
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            unit_type: self.unit_type.clone(),
            code: self.code.clone(),
        }
    }

    /// Centroid, when both coordinates are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.lat?,
            longitude: self.lon?,
        })
    }
}

/// A unit whose keywords identify its province on their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueEntry {
    pub province_key: String,
    pub keywords: Vec<String>,
}

/// Ward tables split by how their keywords must be searched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct WardTiers<T> {
    /// Searched against the loose key.
    #[serde(default)]
    pub no_accented: T,
    /// Searched against the accented key; names that differ only by
    /// diacritics.
    #[serde(default)]
    pub accented: T,
    /// Searched against the accented key; names that collide once the
    /// type prefix is dropped.
    #[serde(default)]
    pub short_accented: T,
}

/// `legacy.json`: the 63-province layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    pub version: String,
    pub provinces: BTreeMap<String, Entry>,
    /// province → district → entry
    pub districts: BTreeMap<String, BTreeMap<String, Entry>>,
    /// district → owning province
    #[serde(default)]
    pub unique_districts: BTreeMap<String, UniqueEntry>,
    /// tier → province → district → ward → entry
    pub wards: WardTiers<BTreeMap<String, BTreeMap<String, BTreeMap<String, Entry>>>>,
    /// province → obsolete district → successors
    #[serde(default)]
    pub divided_districts: BTreeMap<String, BTreeMap<String, DividedDistrict>>,
    /// province → ward keywords hidden from district matching
    #[serde(default)]
    pub district_masks: BTreeMap<String, DistrictMask>,
    /// Island districts without a ward tier.
    #[serde(default)]
    pub special_zones: BTreeSet<String>,
}

/// An obsolete district whose wards were spread over several successors.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividedDistrict {
    pub keywords: Vec<String>,
    /// successor district key → wards it absorbed
    pub successors: BTreeMap<String, Successor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Successor {
    #[serde(default)]
    pub ward_keywords: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictMask {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub conditional: Vec<ConditionalMask>,
}

/// A keyword masked only when one of the accented triggers occurs in the
/// accented key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalMask {
    pub keyword: String,
    pub accented_triggers: Vec<String>,
}

/// `current.json`: the 2025 34-province layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDocument {
    pub version: String,
    pub provinces: BTreeMap<String, Entry>,
    /// tier → province → ward → entry
    pub wards: WardTiers<BTreeMap<String, BTreeMap<String, Entry>>>,
    /// tier → ward → owning province
    #[serde(default)]
    pub unique_wards: WardTiers<BTreeMap<String, UniqueEntry>>,
}

/// `conversion.json`: legacy → 2025 mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionDocument {
    pub version: String,
    /// new province → legacy provinces merged into it
    pub provinces: BTreeMap<String, Vec<String>>,
    pub wards: ConversionWards,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionWards {
    /// new province → new ward → legacy composite keys
    #[serde(default)]
    pub undivided: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// new province → legacy composite key → candidate new wards
    #[serde(default)]
    pub divided: BTreeMap<String, BTreeMap<String, Vec<CandidateWard>>>,
}

/// A 2025 ward that may have absorbed part of a divided legacy ward.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateWard {
    pub ward_key: String,
    pub lat: f64,
    pub lon: f64,
    pub area_km2: f64,
    #[serde(default)]
    pub is_default: bool,
}

impl CandidateWard {
    #[must_use]
    pub const fn centroid(&self) -> Coordinates {
        Coordinates {
            latitude: self.lat,
            longitude: self.lon,
        }
    }
}
