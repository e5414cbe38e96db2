//! In-memory memoization of geocoding answers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{GeocodeError, GeocodedLocation, Geolocator};

/// Caches found and not-found answers per normalized query. Errors are not
/// cached so the query is retried next time.
#[derive(Debug)]
pub struct CachedGeolocator<G> {
    inner: G,
    entries: RwLock<BTreeMap<String, Option<GeocodedLocation>>>,
}

impl<G> CachedGeolocator<G> {
    #[must_use]
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of cached answers.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn cache_key(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[async_trait]
impl<G: Geolocator> Geolocator for CachedGeolocator<G> {
    async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        let key = cache_key(query);
        if let Some(cached) = self.entries.read().await.get(&key) {
            log::trace!("Geocode cache hit for '{key}'");
            return Ok(cached.clone());
        }

        let answer = self.inner.locate(query).await?;
        self.entries.write().await.insert(key, answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::GeocodingProvider;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl Geolocator for Counting {
        async fn locate(&self, query: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(GeocodeError::RateLimited);
            }
            Ok(query.contains("Hà Nội").then(|| GeocodedLocation {
                latitude: 21.0,
                longitude: 105.8,
                matched_address: None,
                provider: GeocodingProvider::Other,
            }))
        }
    }

    #[tokio::test]
    async fn repeats_are_served_from_cache() {
        let cached = CachedGeolocator::new(Counting::default());
        let first = cached.locate("Phố Huế, Hà Nội").await.unwrap();
        let second = cached.locate("  phố huế,   hà nội ").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_is_cached() {
        let cached = CachedGeolocator::new(Counting::default());
        assert!(cached.locate("nowhere").await.unwrap().is_none());
        assert!(cached.locate("nowhere").await.unwrap().is_none());
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedGeolocator::new(Counting::default());
        cached.inner().fail.store(true, Ordering::SeqCst);
        assert!(cached.locate("Hà Nội").await.is_err());
        assert!(cached.is_empty().await);

        cached.inner().fail.store(false, Ordering::SeqCst);
        assert!(cached.locate("Hà Nội").await.unwrap().is_some());
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }
}
