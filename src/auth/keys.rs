use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::error::AuthError;

/// Supplies trusted signing keys by key id (`kid`)
#[async_trait]
pub trait KeySource: Send + Sync {
    /// `Ok(None)` means the key is not trusted.
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError>;
}

/// Fixed key set, loaded once from configuration
pub struct StaticKeySet {
    keys: JwkSet,
}

impl StaticKeySet {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    /// Parse a JWKS document (`{"keys": [...]}`)
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.keys.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.keys.is_empty()
    }
}

#[async_trait]
impl KeySource for StaticKeySet {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        Ok(self.keys.find(kid).cloned())
    }
}

/// JWKS document fetched over HTTP.
///
/// Keys are cached. A `kid` missing from the cache triggers one re-fetch so
/// rotated keys are picked up, but no more often than `min_refresh`, whether
/// or not the previous fetch succeeded.
pub struct RemoteJwks {
    url: String,
    client: reqwest::Client,
    min_refresh: Duration,
    cache: RwLock<CachedKeys>,
}

#[derive(Default)]
struct CachedKeys {
    keys: Option<JwkSet>,
    attempted_at: Option<Instant>,
}

impl CachedKeys {
    fn find(&self, kid: &str) -> Option<Jwk> {
        self.keys.as_ref().and_then(|set| set.find(kid)).cloned()
    }
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>, timeout: Duration, min_refresh: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
            min_refresh,
            cache: RwLock::new(CachedKeys::default()),
        })
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let unavailable = |e: reqwest::Error| {
            warn!("Failed to fetch signing keys from {}: {}", self.url, e);
            AuthError::KeySetUnavailable(e.to_string())
        };

        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        // Fast path: try read lock
        if let Some(jwk) = self.cache.read().await.find(kid) {
            return Ok(Some(jwk));
        }

        // Holding the write lock across the fetch keeps concurrent misses
        // down to a single request.
        let mut cache = self.cache.write().await;
        if let Some(jwk) = cache.find(kid) {
            return Ok(Some(jwk));
        }
        if let Some(attempted_at) = cache.attempted_at {
            if attempted_at.elapsed() < self.min_refresh {
                return match cache.keys {
                    Some(_) => Ok(None),
                    None => Err(AuthError::KeySetUnavailable(format!(
                        "no key set loaded from {}, retrying later",
                        self.url
                    ))),
                };
            }
        }

        // Failed attempts count against the refresh interval too
        cache.attempted_at = Some(Instant::now());
        let keys = self.fetch().await?;
        info!("Loaded {} signing keys from {}", keys.keys.len(), self.url);
        cache.keys = Some(keys);

        Ok(cache.find(kid))
    }
}
