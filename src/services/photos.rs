//! The fetch-enrich-cache pipeline behind `/api/photos` and `/api/collections`.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{ResponseCache, cache_key};
use super::enricher::Enricher;
use super::pacer::Pacer;
use crate::clients::{PhotoSource, UpstreamError};
use crate::config::Config;
use crate::constants::cache::{COLLECTIONS_KIND, PHOTOS_KIND};
use crate::models::{Collection, EnrichedPhoto};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStatus {
    pub photo_pages: u64,
    pub collection_pages: u64,
    pub ttl_seconds: u64,
}

/// Whether a page came from the cache or from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// One page of results plus how it was served.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Arc<Vec<T>>,
    pub cache: CacheOutcome,
}

impl<T> Page<T> {
    fn hit(items: Arc<Vec<T>>) -> Self {
        Self {
            items,
            cache: CacheOutcome::Hit,
        }
    }

    fn miss(items: Arc<Vec<T>>) -> Self {
        Self {
            items,
            cache: CacheOutcome::Miss,
        }
    }
}

pub struct PhotoService {
    source: Arc<dyn PhotoSource>,
    enricher: Enricher,
    photos: ResponseCache<Vec<EnrichedPhoto>>,
    collections: ResponseCache<Vec<Collection>>,
    photos_per_page: u32,
    collections_per_page: u32,
}

impl PhotoService {
    #[must_use]
    pub fn new(source: Arc<dyn PhotoSource>, config: &Config) -> Self {
        let upstream = &config.upstream;
        let ttl = config.cache.ttl();
        let max_pages = config.cache.max_pages;

        let enricher = Enricher::new(
            source.clone(),
            Pacer::new(upstream.stats_spacing()),
            upstream.stats_timeout(),
            upstream.app_name.clone(),
        );

        Self {
            source,
            enricher,
            photos: ResponseCache::new(ttl, max_pages),
            collections: ResponseCache::new(ttl, max_pages),
            photos_per_page: upstream.photos_per_page,
            collections_per_page: upstream.collections_per_page,
        }
    }

    /// One enriched page of photos, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns the list call's [`UpstreamError`] unchanged; nothing is cached
    /// in that case.
    pub async fn photos(&self, page: u32) -> Result<Page<EnrichedPhoto>, UpstreamError> {
        let key = cache_key(PHOTOS_KIND, page, self.photos_per_page);

        if let Some(cached) = self.photos.get(&key).await {
            debug!(key = %key, "Serving photos from cache");
            metrics::counter!("cache_hits_total", "kind" => PHOTOS_KIND).increment(1);
            return Ok(Page::hit(cached));
        }
        metrics::counter!("cache_misses_total", "kind" => PHOTOS_KIND).increment(1);

        let start = Instant::now();
        let listed = self
            .source
            .list_photos(page, self.photos_per_page)
            .await
            .inspect_err(|e| warn!(page, error = %e, "Photo list request failed"))?;

        let count = listed.len();
        let enriched = self.enricher.enrich(listed).await;

        info!(
            page,
            photos = count,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Fetched and enriched photo page"
        );

        Ok(Page::miss(self.photos.put(key, enriched).await))
    }

    /// One page of collections, from cache when fresh. No enrichment.
    ///
    /// # Errors
    ///
    /// Returns the list call's [`UpstreamError`] unchanged.
    pub async fn collections(&self, page: u32) -> Result<Page<Collection>, UpstreamError> {
        let key = cache_key(COLLECTIONS_KIND, page, self.collections_per_page);

        if let Some(cached) = self.collections.get(&key).await {
            debug!(key = %key, "Serving collections from cache");
            metrics::counter!("cache_hits_total", "kind" => COLLECTIONS_KIND).increment(1);
            return Ok(Page::hit(cached));
        }
        metrics::counter!("cache_misses_total", "kind" => COLLECTIONS_KIND).increment(1);

        let collections = self
            .source
            .list_collections(page, self.collections_per_page)
            .await
            .inspect_err(|e| warn!(page, error = %e, "Collection list request failed"))?;

        info!(page, collections = collections.len(), "Fetched collection page");

        Ok(Page::miss(self.collections.put(key, collections).await))
    }

    pub async fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            photo_pages: self.photos.len().await,
            collection_pages: self.collections.len().await,
            ttl_seconds: self.photos.ttl().as_secs(),
        }
    }

    #[must_use]
    pub const fn photos_per_page(&self) -> u32 {
        self.photos_per_page
    }
}
