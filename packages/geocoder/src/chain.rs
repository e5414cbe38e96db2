//! Priority-ordered fallback across several providers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{GeocodeError, GeocodedLocation, Geolocator};

/// Tries each provider in order and returns the first point found.
///
/// A provider that answers "not found" or fails is skipped. The chain
/// reports "not found" if any provider answered, and the last error only
/// when every provider failed.
pub struct ChainGeolocator {
    providers: Vec<(String, Arc<dyn Geolocator>)>,
}

impl ChainGeolocator {
    #[must_use]
    pub fn new(providers: Vec<(String, Arc<dyn Geolocator>)>) -> Self {
        Self { providers }
    }

    /// Provider identifiers in the order they are tried.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|(id, _)| id.clone()).collect()
    }
}

impl std::fmt::Debug for ChainGeolocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainGeolocator")
            .field("providers", &self.provider_ids())
            .finish()
    }
}

#[async_trait]
impl Geolocator for ChainGeolocator {
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        let mut answered = false;
        let mut last_error = None;

        for (id, provider) in &self.providers {
            match provider.locate(query).await {
                Ok(Some(location)) => {
                    log::debug!("{id}: located '{query}'");
                    return Ok(Some(location));
                }
                Ok(None) => {
                    log::debug!("{id}: no match for '{query}'");
                    answered = true;
                }
                Err(e) => {
                    log::warn!("{id} error for '{query}': {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::GeocodingProvider;

    enum Answer {
        Found(f64),
        NotFound,
        Fails,
    }

    struct Fixed {
        answer: Answer,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Geolocator for Fixed {
        async fn locate(&self, _query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Found(latitude) => Ok(Some(GeocodedLocation {
                    latitude,
                    longitude: 105.0,
                    matched_address: None,
                    provider: GeocodingProvider::Other,
                })),
                Answer::NotFound => Ok(None),
                Answer::Fails => Err(GeocodeError::RateLimited),
            }
        }
    }

    fn chain(providers: &[Arc<Fixed>]) -> ChainGeolocator {
        ChainGeolocator::new(
            providers
                .iter()
                .enumerate()
                .map(|(i, p)| (format!("p{i}"), Arc::clone(p) as Arc<dyn Geolocator>))
                .collect(),
        )
    }

    #[tokio::test]
    async fn first_hit_wins_and_stops_the_chain() {
        let first = Fixed::new(Answer::Found(21.0));
        let second = Fixed::new(Answer::Found(10.0));
        let result = chain(&[Arc::clone(&first), Arc::clone(&second)])
            .locate("q")
            .await
            .unwrap()
            .unwrap();
        assert!((result.latitude - 21.0).abs() < f64::EPSILON);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_misses_and_errors() {
        let result = chain(&[
            Fixed::new(Answer::NotFound),
            Fixed::new(Answer::Fails),
            Fixed::new(Answer::Found(10.0)),
        ])
        .locate("q")
        .await
        .unwrap()
        .unwrap();
        assert!((result.latitude - 10.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn miss_beats_error_when_nothing_found() {
        let result = chain(&[Fixed::new(Answer::Fails), Fixed::new(Answer::NotFound)])
            .locate("q")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn all_failures_surface_the_error() {
        let err = chain(&[Fixed::new(Answer::Fails), Fixed::new(Answer::Fails)])
            .locate("q")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::RateLimited));
    }
}
