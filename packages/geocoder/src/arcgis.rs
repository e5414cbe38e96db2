//! `ArcGIS` World Geocoding Service client.
//!
//! Uses the single-line `findAddressCandidates` operation, restricted to
//! one country. No API key is needed for non-stored geocodes.
//!
//! See <https://developers.arcgis.com/rest/geocode/api-reference/geocoding-find-address-candidates.htm>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodedLocation, GeocodingProvider, Geolocator, retry};

/// Geocodes a single-line address with `findAddressCandidates`.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn find_address_candidates(
    client: &reqwest::Client,
    base_url: &str,
    country_code: &str,
    query: &str,
) -> Result<Option<GeocodedLocation>, GeocodeError> {
    let url = format!("{}/findAddressCandidates", base_url.trim_end_matches('/'));
    let body = retry::send_json(|| {
        client.get(&url).query(&[
            ("SingleLine", query),
            ("countryCode", country_code),
            ("maxLocations", "1"),
            ("outFields", "Match_addr"),
            ("f", "json"),
        ])
    })
    .await?;

    parse_response(&body)
}

/// Parses an `ArcGIS` candidates response. Errors are reported in-band with
/// HTTP 200.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedLocation>, GeocodeError> {
    if let Some(error) = body.get("error") {
        return Err(GeocodeError::Parse {
            message: format!(
                "ArcGIS error: {}",
                error["message"].as_str().unwrap_or("unknown")
            ),
        });
    }

    let candidates = body["candidates"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "ArcGIS response has no candidates array".to_string(),
        })?;

    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let location = &first["location"];
    let (Some(x), Some(y)) = (location["x"].as_f64(), location["y"].as_f64()) else {
        return Err(GeocodeError::Parse {
            message: "Missing location in ArcGIS candidate".to_string(),
        });
    };

    Ok(Some(GeocodedLocation {
        latitude: y,
        longitude: x,
        matched_address: first["address"].as_str().map(String::from),
        provider: GeocodingProvider::ArcGis,
    }))
}

/// [`Geolocator`] over an `ArcGIS` `GeocodeServer`.
#[derive(Debug, Clone)]
pub struct ArcGisGeolocator {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
}

impl ArcGisGeolocator {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, country_code: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            country_code: country_code.to_string(),
        }
    }
}

#[async_trait]
impl Geolocator for ArcGisGeolocator {
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        find_address_candidates(&self.client, &self.base_url, &self.country_code, query).await
    }
}
