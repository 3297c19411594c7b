//! A scripted [`PhotoSource`] that counts calls, for tests.

use super::{PhotoSource, SearchPage, SearchQuery};
use crate::error::{Result, TouristError};
use crate::model::RemotePhoto;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeSource {
    batches: Mutex<VecDeque<Vec<RemotePhoto>>>,
    queries: Mutex<Vec<SearchQuery>>,
    searches: AtomicUsize,
    downloads: AtomicUsize,
    fail_searches: AtomicBool,
    fail_downloads: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the photos the next search returns. Searches past the end of the
    /// queue return an empty page.
    pub fn with_batch(self, photos: Vec<RemotePhoto>) -> Self {
        self.push_batch(photos);
        self
    }

    pub fn push_batch(&self, photos: Vec<RemotePhoto>) {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(photos);
    }

    /// `count` photos with IDs `{prefix}0..`.
    pub fn batch(prefix: &str, count: usize) -> Vec<RemotePhoto> {
        (0..count)
            .map(|i| RemotePhoto::new(format!("{}{}", prefix, i), "65535", format!("secret{}", i)))
            .collect()
    }

    pub fn fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The bytes the fake serves for a photo.
    pub fn image_for(photo: &RemotePhoto) -> Vec<u8> {
        format!("jpeg:{}", photo.id()).into_bytes()
    }
}

impl PhotoSource for FakeSource {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        // Suspend once so concurrent callers interleave like real network calls.
        tokio::task::yield_now().await;

        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(TouristError::Flickr {
                code: 100,
                message: "Invalid API Key".to_string(),
            });
        }

        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.clone());
        let photos = self
            .batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_default();

        Ok(SearchPage {
            page: query.page,
            pages: 10,
            per_page: query.per_page,
            total: photos.len() as u64,
            photos,
        })
    }

    async fn download_image(&self, photo: &RemotePhoto) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(TouristError::Status {
                status: 404,
                url: format!("fake://{}", photo.id()),
            });
        }
        Ok(Self::image_for(photo))
    }
}
