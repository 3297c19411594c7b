use super::responses::parse_search_response;
use super::{PhotoSource, SearchPage, SearchQuery};
use crate::config::{TouristConfig, API_KEY_ENV};
use crate::error::{Result, TouristError};
use crate::model::RemotePhoto;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, instrument};

/// Photo source backed by the Flickr REST API and static image host.
pub struct FlickrClient {
    api_key: String,
    search_base: String,
    photo_base: String,
    client: Client,
}

impl std::fmt::Debug for FlickrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrClient")
            .field("api_key", &"[REDACTED]")
            .field("search_base", &self.search_base)
            .field("photo_base", &self.photo_base)
            .finish()
    }
}

impl FlickrClient {
    /// Create a client with the configured timeout.
    pub fn new(config: &TouristConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(config: &TouristConfig, client: Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            search_base: config.search_base.trim_end_matches('/').to_string(),
            photo_base: config.photo_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Full search URL for a query.
    pub fn search_url(&self, query: &SearchQuery) -> Result<Url> {
        let params = [
            ("method", "flickr.photos.search".to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
            ("bbox", query.bbox.to_string()),
            ("lat", query.latitude.to_string()),
            ("lon", query.longitude.to_string()),
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ];
        Url::parse_with_params(&self.search_base, &params)
            .map_err(|e| TouristError::Config(format!("invalid search base URL: {}", e)))
    }

    /// `{photo_base}/{server}/{id}_{secret}_q.jpg`, the 150px square rendition.
    pub fn image_url(&self, photo: &RemotePhoto) -> String {
        format!(
            "{}/{}/{}_{}_q.jpg",
            self.photo_base,
            photo.server(),
            photo.id(),
            photo.secret()
        )
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TouristError::Status {
                status: status.as_u16(),
                url: redact(&url),
            });
        }
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(body.to_vec())
    }
}

/// Strips the query string so the API key never reaches logs or errors.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Transport errors carry the request URL, API key included. Drop it.
fn transport_error(err: reqwest::Error) -> TouristError {
    TouristError::Http(err.without_url())
}

impl PhotoSource for FlickrClient {
    #[instrument(skip(self, query), fields(lat = query.latitude, lon = query.longitude, page = query.page))]
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        if self.api_key.is_empty() {
            return Err(TouristError::Config(format!(
                "no Flickr API key configured; set {} or run `tourist config api-key <key>`",
                API_KEY_ENV
            )));
        }

        let url = self.search_url(query)?;
        debug!(bbox = %query.bbox, "searching photos");

        let result = match self.get_bytes(url).await {
            Ok(body) => parse_search_response(&body),
            Err(e) => Err(e),
        };

        match &result {
            Ok(page) => debug!(
                returned = page.photos.len(),
                total = page.total,
                "search complete"
            ),
            Err(e) => debug!(error = %e, "search request failed"),
        }
        result
    }

    #[instrument(skip(self, photo), fields(photo_id = photo.id()))]
    async fn download_image(&self, photo: &RemotePhoto) -> Result<Vec<u8>> {
        let url = Url::parse(&self.image_url(photo))
            .map_err(|e| TouristError::Config(format!("invalid photo base URL: {}", e)))?;

        match self.get_bytes(url).await {
            Ok(bytes) => {
                debug!(size = bytes.len(), "image downloaded");
                Ok(bytes)
            }
            Err(e) => {
                debug!(error = %e, "image request failed");
                Err(e)
            }
        }
    }
}
