#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Legacy → 2025 conversion of Vietnamese addresses.
//!
//! The address is first resolved under the legacy scheme. Its province is
//! mapped to the 2025 province, and its `province|district|ward` composite
//! key is looked up in the conversion tables:
//!
//! * **undivided**: the legacy ward went to exactly one 2025 ward.
//! * **divided**: the legacy ward was split. Without a street the flagged
//!   default candidate is used; with one, the legacy address is geocoded
//!   and [`split::choose`] picks the candidate geometrically.
//!
//! The result is rendered back to text (`street, new ward, new province`)
//! and resolved again under the 2025 scheme, so display names and aliases
//! always come from the 2025 dictionary.

pub mod progress;
pub mod split;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::StreamExt as _;
use thiserror::Error;
use vn_admin_dictionary::{CandidateWard, composite_key};
use vn_admin_geocoder::{GeocodeError, Geolocator};
use vn_admin_resolver::{ResolveError, Resolver};
use vn_admin_resolver_models::{AddressUnit, Coordinates, Granularity, Scheme};

use crate::progress::ProgressCallback;

/// Errors from [`Converter::convert`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The legacy address had to be located to pick among split wards and
    /// the lookup failed.
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    /// The legacy address had to be located to pick among split wards and
    /// no provider found it.
    #[error("Could not locate '{address}' to choose among split wards")]
    LocationNotFound { address: String },
}

/// Converts legacy addresses to the 2025 scheme.
#[derive(Clone)]
pub struct Converter {
    resolver: Resolver,
    geolocator: Arc<dyn Geolocator>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Converter {
    #[must_use]
    pub fn new(resolver: Resolver, geolocator: Arc<dyn Geolocator>) -> Self {
        Self {
            resolver,
            geolocator,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Converts one legacy address to its 2025 [`AddressUnit`].
    ///
    /// Text that names no legacy province converts to an empty unit. A
    /// legacy ward missing from the conversion tables converts to its
    /// province only.
    ///
    /// # Errors
    ///
    /// * [`ConvertError::Geocode`] if the address had to be located and the
    ///   lookup failed.
    /// * [`ConvertError::LocationNotFound`] if the address had to be located
    ///   and no provider found it.
    pub async fn convert(&self, address: &str) -> Result<AddressUnit, ConvertError> {
        let legacy = self.resolver.resolve(
            address,
            Scheme::Legacy,
            true,
            Scheme::Legacy.max_level(),
        )?;

        let Some(legacy_province) = legacy.key(Granularity::Province) else {
            return Ok(AddressUnit::empty(Scheme::Current));
        };

        let conversion = &self.resolver.data().conversion;
        let Some(province) = conversion.new_province(legacy_province) else {
            log::warn!("Legacy province '{legacy_province}' has no 2025 successor");
            return Ok(AddressUnit::empty(Scheme::Current));
        };

        let ward = match self.composite(&legacy) {
            Some(composite) => self.new_ward(&legacy, province, &composite).await?,
            None => None,
        };

        let rendered = [legacy.street.as_deref(), ward, Some(province)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(",");
        let level = if ward.is_some() {
            Scheme::Current.max_level()
        } else {
            1
        };
        log::debug!("Converted '{address}' to '{rendered}'");

        Ok(self.resolver.resolve(&rendered, Scheme::Current, true, level)?)
    }

    /// Composite legacy key, when the unit is fine enough to be mapped to a
    /// ward.
    fn composite(&self, legacy: &AddressUnit) -> Option<String> {
        let province = legacy.key(Granularity::Province)?;
        let district = legacy.key(Granularity::District)?;
        match legacy.key(Granularity::Ward) {
            Some(ward) => Some(composite_key(province, district, Some(ward))),
            None if self.resolver.data().legacy.is_special_zone(district) => {
                Some(composite_key(province, district, None))
            }
            None => None,
        }
    }

    async fn new_ward(
        &self,
        legacy: &AddressUnit,
        province: &str,
        composite: &str,
    ) -> Result<Option<&str>, ConvertError> {
        let conversion = &self.resolver.data().conversion;

        if let Some(ward) = conversion.undivided_ward(province, composite) {
            return Ok(Some(ward));
        }

        let Some(candidates) = conversion.divided_candidates(province, composite) else {
            log::debug!("No 2025 ward mapped from '{composite}'");
            return Ok(None);
        };

        if legacy.street.is_none() {
            return Ok(default_candidate(candidates).map(|c| c.ward_key.as_str()));
        }

        let query = legacy.address(false);
        let location = self
            .geolocator
            .locate(&query)
            .await?
            .ok_or_else(|| ConvertError::LocationNotFound {
                address: query.clone(),
            })?;
        log::debug!(
            "Located '{query}' at ({}, {})",
            location.latitude,
            location.longitude
        );

        let point = Coordinates {
            latitude: location.latitude,
            longitude: location.longitude,
        };
        Ok(split::choose(candidates, point).map(|c| c.ward_key.as_str()))
    }

    /// Converts many addresses, each unique value once, with at most
    /// `concurrency` conversions in flight.
    ///
    /// Returns one result per unique input address.
    pub async fn convert_many<'a, I>(
        &self,
        addresses: I,
        concurrency: usize,
        progress: &Arc<dyn ProgressCallback>,
    ) -> BTreeMap<String, Result<AddressUnit, ConvertError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = addresses.into_iter().collect();
        progress.started(unique.len() as u64);

        let results: BTreeMap<String, Result<AddressUnit, ConvertError>> =
            futures::stream::iter(unique)
                .map(|address| async move {
                    let result = self.convert(address).await;
                    if let Err(e) = &result {
                        log::warn!("Failed to convert '{address}': {e}");
                    }
                    progress.converted(address, result.is_ok());
                    (address.to_string(), result)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        let failed = results.values().filter(|r| r.is_err()).count() as u64;
        progress.done(results.len() as u64 - failed, failed);

        results
    }
}

fn default_candidate(candidates: &[CandidateWard]) -> Option<&CandidateWard> {
    candidates
        .iter()
        .find(|c| c.is_default)
        .or_else(|| candidates.first())
}
