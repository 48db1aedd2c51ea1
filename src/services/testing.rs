//! In-memory `PhotoSource` used by unit tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::clients::{PhotoSource, UpstreamError};
use crate::models::{Collection, Photo, PhotoStatistics, PhotoUser};

pub fn photo(id: &str, name: &str) -> Photo {
    Photo {
        id: id.to_string(),
        urls: BTreeMap::from([(
            "small".to_string(),
            format!("https://images.example/{id}/small"),
        )]),
        user: PhotoUser {
            name: name.to_string(),
            username: name.to_lowercase(),
            ..PhotoUser::default()
        },
        likes: 1,
        ..Photo::default()
    }
}

pub enum StatsReply {
    Ok(PhotoStatistics),
    Fail,
    Hang,
}

#[derive(Default)]
pub struct StubSource {
    pub photos: Vec<Photo>,
    pub list_error: Mutex<Option<UpstreamError>>,
    pub stats: HashMap<String, StatsReply>,
    /// Artificial latency per photo id, to force out-of-order completion.
    pub latency: HashMap<String, Duration>,
    pub collections: Vec<Collection>,
    pub list_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub collection_calls: AtomicUsize,
    pub stats_issued_at: Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl StubSource {
    pub fn with_photos(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for StubSource {
    async fn list_photos(&self, _page: u32, _per_page: u32) -> Result<Vec<Photo>, UpstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.photos.clone())
    }

    async fn photo_statistics(&self, photo_id: &str) -> Result<PhotoStatistics, UpstreamError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.stats_issued_at
            .lock()
            .unwrap()
            .push((photo_id.to_string(), tokio::time::Instant::now()));

        if let Some(delay) = self.latency.get(photo_id) {
            tokio::time::sleep(*delay).await;
        }

        match self.stats.get(photo_id) {
            Some(StatsReply::Ok(stats)) => Ok(*stats),
            Some(StatsReply::Fail) => Err(UpstreamError::Malformed("boom".to_string())),
            Some(StatsReply::Hang) => std::future::pending().await,
            None => Ok(PhotoStatistics::default()),
        }
    }

    async fn list_collections(
        &self,
        _page: u32,
        _per_page: u32,
    ) -> Result<Vec<Collection>, UpstreamError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.collections.clone())
    }
}
