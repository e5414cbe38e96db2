//! Nominatim (OpenStreetMap) free-form search.
//!
//! The public instance allows one request per second, so
//! [`NominatimGeolocator`] spaces its calls by the configured
//! `rate_limit_ms`. Search API:
//! <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{GeocodeError, GeocodedLocation, GeocodingProvider, Geolocator, retry};

/// One `jsonv2` search hit. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Runs one search restricted to `country_code`, without rate limiting.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails or the answer is not a
/// `jsonv2` result list.
pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    country_code: &str,
    query: &str,
) -> Result<Option<GeocodedLocation>, GeocodeError> {
    let body = retry::send_json(|| {
        client.get(base_url).query(&[
            ("q", query),
            ("countrycodes", country_code),
            ("accept-language", "vi"),
            ("format", "jsonv2"),
            ("limit", "1"),
        ])
    })
    .await?;

    parse_response(&body)
}

fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedLocation>, GeocodeError> {
    let places = Vec::<Place>::deserialize(body).map_err(|e| GeocodeError::Parse {
        message: format!("Unexpected Nominatim answer: {e}"),
    })?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let coordinate = |value: &str, axis: &str| {
        value.parse::<f64>().map_err(|_| GeocodeError::Parse {
            message: format!("Nominatim {axis} '{value}' is not a number"),
        })
    };

    Ok(Some(GeocodedLocation {
        latitude: coordinate(&place.lat, "lat")?,
        longitude: coordinate(&place.lon, "lon")?,
        matched_address: place.display_name,
        provider: GeocodingProvider::Nominatim,
    }))
}

/// Rate-limited [`Geolocator`] over a Nominatim instance.
#[derive(Debug)]
pub struct NominatimGeolocator {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
    rate_limit: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeolocator {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        country_code: &str,
        rate_limit: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            country_code: country_code.to_string(),
            rate_limit,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the rate limit allows another request. Holding the lock
    /// for the wait serializes concurrent callers.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.rate_limit).await;
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Geolocator for NominatimGeolocator {
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        self.throttle().await;
        search(&self.client, &self.base_url, &self.country_code, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_hit() {
        let body = serde_json::json!([{
            "lat": "21.0245",
            "lon": "105.8412",
            "display_name": "Phố Hàng Bài, Phường Cửa Nam, Hà Nội, Việt Nam"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - 21.0245).abs() < 1e-4);
        assert!((result.longitude - 105.8412).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Nominatim);
        assert!(result.matched_address.unwrap().contains("Cửa Nam"));
    }

    #[test]
    fn empty_list_is_not_found() {
        assert!(parse_response(&serde_json::json!([])).unwrap().is_none());
    }

    #[test]
    fn rejects_unparseable_coordinates() {
        let body = serde_json::json!([{ "lat": "north", "lon": "105.8" }]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { message }) if message.contains("north")
        ));
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({"error": "Bad request"});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_spaces_requests() {
        let geolocator = NominatimGeolocator::new(
            reqwest::Client::new(),
            "http://localhost",
            "vn",
            Duration::from_millis(1000),
        );
        let start = Instant::now();
        geolocator.throttle().await;
        geolocator.throttle().await;
        geolocator.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }
}
