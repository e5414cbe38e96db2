#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forward geocoding for Vietnamese addresses.
//!
//! Converts a rendered address to a WGS84 point using the providers
//! configured via TOML files in `services/`:
//!
//! 1. **Nominatim / OpenStreetMap** (priority 1): free, 1 req/sec rate
//!    limit, restricted to Vietnam via `countrycodes`.
//! 2. **`ArcGIS` World Geocoding Service** (priority 2): single-line
//!    `findAddressCandidates` restricted to `VNM`.
//!
//! Every provider implements [`Geolocator`]. [`ChainGeolocator`] tries them
//! in priority order and [`CachedGeolocator`] memoizes answers per query.

pub mod arcgis;
pub mod cache;
pub mod chain;
pub mod nominatim;
pub mod retry;
pub mod service_registry;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use arcgis::ArcGisGeolocator;
pub use cache::CachedGeolocator;
pub use chain::ChainGeolocator;
pub use nominatim::NominatimGeolocator;
pub use service_registry::{GeocodingService, ProviderConfig, ServiceRegistry};

/// User agent sent when none is configured. Nominatim's usage policy
/// rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = "vn-admin-units/0.1";

/// Per-request timeout applied by [`build_client`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
    /// Which provider resolved this address.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Nominatim / `OpenStreetMap`.
    Nominatim,
    /// `ArcGIS` World Geocoding Service.
    ArcGis,
    /// Anything outside this crate (fixtures, custom lookups).
    Other,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed or the server refused the request.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// No usable provider configuration.
    #[error("Geocoder configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

/// Looks up a point for a free-form address.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Returns the best match for `query`, or `None` when the provider
    /// answered but found nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider could not be queried.
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError>;
}

#[async_trait]
impl<G: Geolocator + ?Sized> Geolocator for Arc<G> {
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        (**self).locate(query).await
    }
}

/// Builds the shared HTTP client used by every provider.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the client cannot be built.
pub fn build_client(user_agent: Option<&str>) -> Result<reqwest::Client, GeocodeError> {
    reqwest::Client::builder()
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(Into::into)
}

/// Instantiates the provider described by `service`.
#[must_use]
pub fn geolocator_for(client: &reqwest::Client, service: &GeocodingService) -> Arc<dyn Geolocator> {
    match &service.provider {
        ProviderConfig::Nominatim {
            base_url,
            rate_limit_ms,
            country_code,
        } => Arc::new(NominatimGeolocator::new(
            client.clone(),
            base_url,
            country_code,
            Duration::from_millis(*rate_limit_ms),
        )),
        ProviderConfig::ArcGis {
            base_url,
            country_code,
        } => Arc::new(ArcGisGeolocator::new(client.clone(), base_url, country_code)),
    }
}

/// Builds the default geocoding pipeline: the selected service, or every
/// enabled service in priority order, behind a per-query cache.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if `only` names an unknown service or
/// no service is enabled, and [`GeocodeError::Http`] if the HTTP client
/// cannot be built.
pub fn default_geolocator(
    only: Option<&str>,
    user_agent: Option<&str>,
) -> Result<CachedGeolocator<ChainGeolocator>, GeocodeError> {
    let registry = ServiceRegistry::load()?;
    let services: Vec<&GeocodingService> = match only {
        Some(id) => {
            let service = registry.get(id).ok_or_else(|| GeocodeError::Config {
                message: format!("Unknown geocoding service '{id}'"),
            })?;
            vec![service]
        }
        None => registry.enabled().collect(),
    };

    if services.is_empty() {
        return Err(GeocodeError::Config {
            message: "No geocoding service is enabled".to_string(),
        });
    }

    let client = build_client(user_agent)?;
    let providers = services
        .iter()
        .map(|service| {
            log::debug!("Using geocoding service '{}' ({})", service.id, service.name);
            (service.id.clone(), geolocator_for(&client, service))
        })
        .collect();

    Ok(CachedGeolocator::new(ChainGeolocator::new(providers)))
}
