//! # Storage Layer
//!
//! This module defines the storage abstraction for tourist. The [`DataStore`] trait
//! lets the cache work against different persistence backends.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production file-based storage
//!   - Pin and photo metadata stored in `data.json`
//!   - Image payloads in individual files: `images/photo-{uuid}.jpg`
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data-dir>/
//! ├── data.json              # Pins and photo metadata, in insertion order
//! ├── images/
//! │   └── photo-{uuid}.jpg   # Downloaded image bytes
//! └── config.json            # Configuration
//! ```
//!
//! Metadata and image bytes are stored separately so counting a pin's photos
//! never touches image files.
//!
//! ## Ownership
//!
//! A photo belongs to exactly one pin. Deleting a pin deletes its photos. Every
//! mutating call is a single save: a batch of photos lands together or not at all.

use crate::error::Result;
use crate::model::{Photo, Pin};
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Photo records whose pin no longer exists
    pub removed_orphan_photos: usize,
    /// Image files with no matching photo record
    pub removed_stray_images: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.removed_orphan_photos == 0 && self.removed_stray_images == 0
    }
}

/// Abstract interface for pin and photo storage.
pub trait DataStore {
    /// Save a pin (create or update)
    fn save_pin(&mut self, pin: &Pin) -> Result<()>;

    /// Get a pin by ID
    fn get_pin(&self, id: &Uuid) -> Result<Pin>;

    /// List all pins, oldest first
    fn list_pins(&self) -> Result<Vec<Pin>>;

    /// Delete a pin and every photo it owns. Returns the removed photo IDs.
    fn delete_pin(&mut self, id: &Uuid) -> Result<Vec<Uuid>>;

    /// Insert or update photos in one save
    fn save_photos(&mut self, photos: &[Photo]) -> Result<()>;

    /// Get a photo by ID, including its image if downloaded
    fn get_photo(&self, id: &Uuid) -> Result<Photo>;

    /// List a pin's photos in insertion order
    fn list_photos(&self, pin_id: &Uuid) -> Result<Vec<Photo>>;

    /// Number of photo records owned by a pin
    fn count_photos(&self, pin_id: &Uuid) -> Result<usize>;

    /// Delete a single photo record
    fn delete_photo(&mut self, id: &Uuid) -> Result<()>;

    /// Delete every photo a pin owns. Returns the removed photo IDs.
    fn delete_photos_for_pin(&mut self, pin_id: &Uuid) -> Result<Vec<Uuid>>;

    /// Verify and fix consistency issues
    fn doctor(&mut self) -> Result<DoctorReport>;
}
