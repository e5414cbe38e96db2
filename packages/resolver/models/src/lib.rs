#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative unit value types for Vietnamese address resolution.
//!
//! Two national schemes coexist: the [`Scheme::Legacy`] 63-province layout
//! (province, district, ward) and the [`Scheme::Current`] 34-province
//! layout introduced in 2025 (province, ward). An [`AddressUnit`] is the
//! immutable result of resolving one free-text address under one scheme.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The administrative scheme an address is written in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Scheme {
    /// Pre-2025 layout: 63 provinces, then districts, then wards.
    Legacy,
    /// 2025 layout: 34 provinces, then wards. No district tier.
    Current,
}

impl Scheme {
    /// Finest resolution level accepted by this scheme.
    #[must_use]
    pub const fn max_level(self) -> u8 {
        match self {
            Self::Legacy => 3,
            Self::Current => 2,
        }
    }

    /// Maps a numeric resolution level to the finest [`Granularity`] it
    /// reaches under this scheme.
    ///
    /// Returns `None` when the level is outside `1..=max_level()`.
    #[must_use]
    pub const fn granularity(self, level: u8) -> Option<Granularity> {
        match (self, level) {
            (_, 1) => Some(Granularity::Province),
            (Self::Legacy, 2) => Some(Granularity::District),
            (Self::Legacy, 3) | (Self::Current, 2) => Some(Granularity::Ward),
            _ => None,
        }
    }

    /// Whether units of this scheme carry a district tier.
    #[must_use]
    pub const fn has_districts(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// A tier of the administrative hierarchy, ordered coarse to fine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    Province,
    District,
    Ward,
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One resolved administrative tier of an [`AddressUnit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitComponent {
    /// Canonical, accent-free key used for joins (e.g. `"phuongcuanam"`).
    pub key: String,
    /// Full display name (e.g. `"Phường Cửa Nam"`).
    pub name: String,
    /// Display name without the type prefix (e.g. `"Cửa Nam"`).
    pub short_name: String,
    /// Free-form unit type label preserved from the reference data.
    pub unit_type: Option<String>,
    /// Official administrative code.
    pub code: Option<String>,
}

/// The result of resolving one address.
///
/// Every tier is optional: resolution stops at the first tier with no
/// match, and an unmatched address yields a unit with nothing set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUnit {
    pub scheme: Scheme,
    pub province: Option<UnitComponent>,
    /// Only ever set for [`Scheme::Legacy`] units.
    pub district: Option<UnitComponent>,
    pub ward: Option<UnitComponent>,
    /// Leading street-level text, title-cased.
    pub street: Option<String>,
    /// Centroid of the finest resolved tier.
    pub coordinates: Option<Coordinates>,
}

impl AddressUnit {
    /// An unresolved unit.
    #[must_use]
    pub const fn empty(scheme: Scheme) -> Self {
        Self {
            scheme,
            province: None,
            district: None,
            ward: None,
            street: None,
            coordinates: None,
        }
    }

    /// `true` when no tier and no street was resolved.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.province.is_none()
            && self.district.is_none()
            && self.ward.is_none()
            && self.street.is_none()
    }

    /// Per-tier accessor.
    #[must_use]
    pub const fn component(&self, granularity: Granularity) -> Option<&UnitComponent> {
        match granularity {
            Granularity::Province => self.province.as_ref(),
            Granularity::District => self.district.as_ref(),
            Granularity::Ward => self.ward.as_ref(),
        }
    }

    /// Canonical key of a tier, if resolved.
    #[must_use]
    pub fn key(&self, granularity: Granularity) -> Option<&str> {
        self.component(granularity).map(|c| c.key.as_str())
    }

    /// Display name of a tier, full or short.
    #[must_use]
    pub fn name(&self, granularity: Granularity, short: bool) -> Option<&str> {
        self.component(granularity).map(|c| {
            if short {
                c.short_name.as_str()
            } else {
                c.name.as_str()
            }
        })
    }

    /// Finest tier that was resolved.
    #[must_use]
    pub fn finest(&self) -> Option<Granularity> {
        [Granularity::Ward, Granularity::District, Granularity::Province]
            .into_iter()
            .find(|g| self.component(*g).is_some())
    }

    /// Renders the unit as a comma-joined address, finest tier first.
    ///
    /// Resolving this string again under the same scheme and level
    /// reproduces the unit.
    #[must_use]
    pub fn address(&self, short: bool) -> String {
        let parts = [
            self.street.as_deref(),
            self.name(Granularity::Ward, short),
            self.name(Granularity::District, short),
            self.name(Granularity::Province, short),
        ];
        parts
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AddressUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: Option<&str>) -> &str {
            value.unwrap_or("")
        }

        let tiers: &[Granularity] = if self.scheme.has_districts() {
            &[Granularity::Province, Granularity::District, Granularity::Ward]
        } else {
            &[Granularity::Province, Granularity::Ward]
        };

        writeln!(f, "Admin Unit: {}", self.address(false))?;
        writeln!(f, "{:<15} | {:<25}", "Attribute", "Value")?;
        writeln!(f, "{}", "-".repeat(40))?;

        let mut rows: Vec<(String, String)> = Vec::new();
        for tier in tiers {
            rows.push((tier.to_string(), opt(self.name(*tier, false)).to_string()));
        }
        rows.push(("street".to_string(), opt(self.street.as_deref()).to_string()));
        for tier in tiers {
            rows.push((
                format!("short_{tier}"),
                opt(self.name(*tier, true)).to_string(),
            ));
        }
        for tier in tiers.iter().filter(|t| **t != Granularity::Province) {
            let unit_type = self.component(*tier).and_then(|c| c.unit_type.as_deref());
            rows.push((format!("{tier}_type"), opt(unit_type).to_string()));
        }
        for tier in tiers {
            let code = self.component(*tier).and_then(|c| c.code.as_deref());
            rows.push((format!("{tier}_code"), opt(code).to_string()));
        }
        let (lat, lon) = self.coordinates.map_or_else(
            || (String::new(), String::new()),
            |c| (c.latitude.to_string(), c.longitude.to_string()),
        );
        rows.push(("latitude".to_string(), lat));
        rows.push(("longitude".to_string(), lon));

        for (i, (attribute, value)) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{attribute:<15} | {value:<25}")?;
        }
        Ok(())
    }
}
