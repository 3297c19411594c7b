//! # Remote photo source
//!
//! [`PhotoSource`] is the seam between the cache and the network. The cache only
//! ever asks two things of it: search a bounding box for one page of photo
//! identifiers, and fetch the image bytes for one identifier triple.
//!
//! [`client::FlickrClient`] is the production implementation. Tests swap in
//! counting fakes.

use crate::config::TouristConfig;
use crate::error::Result;
use crate::model::RemotePhoto;
use rand::Rng;
use std::future::Future;

pub mod client;
#[cfg(any(test, feature = "test_utils"))]
pub mod fake;
pub mod responses;

pub use client::FlickrClient;

/// The search rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    pub fn around(latitude: f64, longitude: f64, half_size: f64) -> Self {
        Self {
            min_longitude: longitude - half_size,
            min_latitude: latitude - half_size,
            max_longitude: longitude + half_size,
            max_latitude: latitude + half_size,
        }
    }

    /// The query-string form, commas percent-encoded.
    pub fn encoded(&self) -> String {
        self.to_string().replace(',', "%2C")
    }
}

/// `minLon,minLat,maxLon,maxLat`, the order the search endpoint expects.
impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_longitude, self.min_latitude, self.max_longitude, self.max_latitude
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub bbox: BoundingBox,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(latitude: f64, longitude: f64, config: &TouristConfig, page: u32) -> Self {
        Self {
            latitude,
            longitude,
            bbox: BoundingBox::around(latitude, longitude, config.bbox_half_size),
            page,
            per_page: config.per_page,
        }
    }

    /// Picks a page uniformly from `1..=max_page` so repeated refreshes show
    /// different photos.
    pub fn with_random_page(latitude: f64, longitude: f64, config: &TouristConfig) -> Self {
        let page = rand::thread_rng().gen_range(1..=config.max_page.max(1));
        Self::new(latitude, longitude, config, page)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub total: u64,
    pub photos: Vec<RemotePhoto>,
}

/// A paginated, search-by-bounding-box photo service.
pub trait PhotoSource: Send + Sync {
    /// Fetch one page of photo identifiers inside the query's bounding box.
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchPage>> + Send;

    /// Fetch the image payload for one identifier triple.
    fn download_image(&self, photo: &RemotePhoto) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
