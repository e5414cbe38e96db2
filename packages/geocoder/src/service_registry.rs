//! Geocoding providers available to the converter.
//!
//! Providers are described by TOML files in `services/`, embedded into the
//! binary. Parsing happens once per [`ServiceRegistry::load`]; a malformed
//! file surfaces as [`GeocodeError::Config`].

use serde::Deserialize;

use crate::GeocodeError;

/// One configured provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Stable id used by `--geocoder`, e.g. `"nominatim"`.
    pub id: String,
    pub name: String,
    /// Disabled services are only used when asked for by id.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Lower runs first.
    pub priority: u32,
    pub provider: ProviderConfig,
}

/// Connection settings, keyed by the `type` field of the `[provider]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// `OpenStreetMap` Nominatim free-form search.
    Nominatim {
        /// Search endpoint.
        base_url: String,
        /// Spacing enforced between two calls.
        rate_limit_ms: u64,
        /// `countrycodes` filter (ISO 3166-1 alpha-2).
        country_code: String,
    },
    /// `ArcGIS` World Geocoding Service.
    ArcGis {
        /// `GeocodeServer` URL, without the operation path.
        base_url: String,
        /// `countryCode` filter (ISO 3166-1 alpha-3).
        country_code: String,
    },
}

impl ProviderConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Self::Nominatim { base_url, .. } | Self::ArcGis { base_url, .. } => base_url,
        }
    }

    #[must_use]
    pub fn country_code(&self) -> &str {
        match self {
            Self::Nominatim { country_code, .. } | Self::ArcGis { country_code, .. } => {
                country_code
            }
        }
    }
}

const fn enabled_by_default() -> bool {
    true
}

const SERVICE_FILES: [(&str, &str); 2] = [
    ("nominatim.toml", include_str!("../services/nominatim.toml")),
    ("arcgis.toml", include_str!("../services/arcgis.toml")),
];

/// Every embedded service, ordered by priority.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<GeocodingService>,
}

impl ServiceRegistry {
    /// Parses the embedded service files.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Config`] if a file does not parse or two
    /// files share an id.
    pub fn load() -> Result<Self, GeocodeError> {
        let mut services: Vec<GeocodingService> = Vec::with_capacity(SERVICE_FILES.len());
        for (file, text) in SERVICE_FILES {
            let service: GeocodingService =
                toml::de::from_str(text).map_err(|e| GeocodeError::Config {
                    message: format!("Invalid geocoding service file {file}: {e}"),
                })?;
            if services.iter().any(|s| s.id == service.id) {
                return Err(GeocodeError::Config {
                    message: format!("Duplicate geocoding service id '{}'", service.id),
                });
            }
            services.push(service);
        }
        services.sort_by_key(|s| s.priority);
        Ok(Self { services })
    }

    /// All services, enabled or not.
    #[must_use]
    pub fn services(&self) -> &[GeocodingService] {
        &self.services
    }

    /// Services that take part in the default chain.
    pub fn enabled(&self) -> impl Iterator<Item = &GeocodingService> {
        self.services.iter().filter(|s| s.enabled)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GeocodingService> {
        self.services.iter().find(|s| s.id == id)
    }
}
