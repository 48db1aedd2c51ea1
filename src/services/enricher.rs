use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::pacer::Pacer;
use crate::clients::PhotoSource;
use crate::models::{EnrichedPhoto, Photo, PhotoStatistics};

/// Merges listed photos with their statistics and attribution.
pub struct Enricher {
    source: Arc<dyn PhotoSource>,
    pacer: Pacer,
    stats_timeout: Duration,
    app_name: String,
}

impl Enricher {
    #[must_use]
    pub fn new(
        source: Arc<dyn PhotoSource>,
        pacer: Pacer,
        stats_timeout: Duration,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            pacer,
            stats_timeout,
            app_name: app_name.into(),
        }
    }

    /// Fetches statistics for every photo concurrently, paced on issuance,
    /// and returns the enriched photos in input order.
    ///
    /// A statistics call that fails or times out only zeroes that photo.
    pub async fn enrich(&self, photos: Vec<Photo>) -> Vec<EnrichedPhoto> {
        if photos.is_empty() {
            return Vec::new();
        }

        let batch = self.pacer.start();
        let batch = &batch;

        let fetches = photos.iter().enumerate().map(|(index, photo)| async move {
            batch.pace(index).await;
            let stats = self.fetch_statistics(&photo.id).await;
            (photo.id.clone(), stats)
        });

        let stats_by_id: HashMap<String, PhotoStatistics> =
            join_all(fetches).await.into_iter().collect();

        debug!(photos = photos.len(), "Statistics batch complete");

        photos
            .into_iter()
            .map(|photo| {
                let stats = stats_by_id.get(&photo.id).copied().unwrap_or_default();
                EnrichedPhoto::new(photo, stats, &self.app_name)
            })
            .collect()
    }

    async fn fetch_statistics(&self, photo_id: &str) -> PhotoStatistics {
        match tokio::time::timeout(self.stats_timeout, self.source.photo_statistics(photo_id))
            .await
        {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                warn!(photo_id, error = %e, "Statistics unavailable, using zeros");
                metrics::counter!("stats_unavailable_total", "reason" => "error").increment(1);
                PhotoStatistics::default()
            }
            Err(_) => {
                warn!(
                    photo_id,
                    timeout_ms = u64::try_from(self.stats_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Statistics request timed out, using zeros"
                );
                metrics::counter!("stats_unavailable_total", "reason" => "timeout").increment(1);
                PhotoStatistics::default()
            }
        }
    }
}
