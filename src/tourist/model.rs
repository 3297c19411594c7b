use crate::error::{Result, TouristError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved map coordinate. Pins are unique by their exact coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl Pin {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self {
            id: Uuid::new_v4(),
            latitude,
            longitude,
            created_at: Utc::now(),
        })
    }

    /// Exact match, no tolerance.
    pub fn is_at(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude == latitude && self.longitude == longitude
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(TouristError::InvalidCoordinate(format!(
            "latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(TouristError::InvalidCoordinate(format!(
            "longitude {} is outside [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

/// The identifier triple the remote source hands out for a photo.
///
/// Fields are private: once a record is created its remote identity never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePhoto {
    id: String,
    server: String,
    secret: String,
}

impl RemotePhoto {
    pub fn new(id: impl Into<String>, server: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            server: server.into(),
            secret: secret.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// The persisted part of a photo record. Read-only outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub(crate) id: Uuid,
    pub(crate) pin_id: Uuid,
    pub(crate) remote: RemotePhoto,
    pub(crate) created_at: DateTime<Utc>,
}

impl PhotoMetadata {
    pub fn new(pin_id: Uuid, remote: RemotePhoto) -> Self {
        Self {
            id: Uuid::new_v4(),
            pin_id,
            remote,
            created_at: Utc::now(),
        }
    }
}

/// A photo record: metadata plus the downloaded image, once there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    metadata: PhotoMetadata,
    image: Option<Vec<u8>>,
}

impl Photo {
    pub fn new(pin_id: Uuid, remote: RemotePhoto) -> Self {
        Self {
            metadata: PhotoMetadata::new(pin_id, remote),
            image: None,
        }
    }

    /// Rebuilds a record from its persisted parts.
    pub(crate) fn from_parts(metadata: PhotoMetadata, image: Option<Vec<u8>>) -> Self {
        Self { metadata, image }
    }

    pub fn id(&self) -> Uuid {
        self.metadata.id
    }

    pub fn metadata(&self) -> &PhotoMetadata {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.metadata.created_at
    }

    pub fn pin_id(&self) -> Uuid {
        self.metadata.pin_id
    }

    pub fn remote(&self) -> &RemotePhoto {
        &self.metadata.remote
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Attaches image bytes. Returns `false` and leaves the record untouched
    /// when an image is already present.
    pub fn attach_image(&mut self, bytes: Vec<u8>) -> bool {
        if self.image.is_some() {
            return false;
        }
        self.image = Some(bytes);
        true
    }
}
