//! Wire types for the `flickr.photos.search` JSON response.
//!
//! Success:
//! `{"stat":"ok","photos":{"page":1,"pages":10,"perpage":15,"total":150,"photo":[{"id":..,"server":..,"secret":..}]}}`
//!
//! Failure:
//! `{"stat":"fail","code":100,"message":"Invalid API Key"}`

use super::SearchPage;
use crate::error::{Result, TouristError};
use crate::model::RemotePhoto;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    stat: String,
    photos: Option<PhotosPage>,
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotosPage {
    #[serde(deserialize_with = "lenient_number")]
    page: u64,
    #[serde(deserialize_with = "lenient_number")]
    pages: u64,
    #[serde(rename = "perpage", deserialize_with = "lenient_number")]
    per_page: u64,
    #[serde(deserialize_with = "lenient_number")]
    total: u64,
    #[serde(rename = "photo", default)]
    photos: Vec<FlickrPhoto>,
}

#[derive(Debug, Deserialize)]
struct FlickrPhoto {
    id: String,
    server: String,
    secret: String,
}

/// Some Flickr responses encode counters as strings.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Decodes a search body into a [`SearchPage`], mapping `stat != "ok"` to
/// [`TouristError::Flickr`].
pub fn parse_search_response(body: &[u8]) -> Result<SearchPage> {
    let envelope: SearchEnvelope =
        serde_json::from_slice(body).map_err(|e| TouristError::Decode(e.to_string()))?;

    if envelope.stat != "ok" {
        return Err(TouristError::Flickr {
            code: envelope.code.unwrap_or_default(),
            message: envelope
                .message
                .unwrap_or_else(|| format!("search failed with stat {}", envelope.stat)),
        });
    }

    let page = envelope
        .photos
        .ok_or_else(|| TouristError::Decode("response has no photos object".to_string()))?;

    Ok(SearchPage {
        page: clamp_u32(page.page),
        pages: clamp_u32(page.pages),
        per_page: clamp_u32(page.per_page),
        total: page.total,
        photos: page
            .photos
            .into_iter()
            .map(|p| RemotePhoto::new(p.id, p.server, p.secret))
            .collect(),
    })
}

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
