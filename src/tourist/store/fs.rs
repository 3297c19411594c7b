use super::{DataStore, DoctorReport};
use crate::error::{Result, TouristError};
use crate::model::{Photo, PhotoMetadata, Pin};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const DATA_FILENAME: &str = "data.json";
const IMAGES_DIR: &str = "images";
const TMP_EXTENSION: &str = "tmp";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreIndex {
    #[serde(default)]
    pins: Vec<Pin>,
    #[serde(default)]
    photos: Vec<PhotoMetadata>,
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    fn image_path(&self, id: &Uuid) -> PathBuf {
        self.images_dir().join(format!("photo-{}.jpg", id))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(TouristError::Io)?;
        }
        Ok(())
    }

    fn load_index(&self) -> Result<StoreIndex> {
        let data_file = self.root.join(DATA_FILENAME);
        if !data_file.exists() {
            return Ok(StoreIndex::default());
        }
        let content = fs::read_to_string(data_file).map_err(TouristError::Io)?;
        let index: StoreIndex =
            serde_json::from_str(&content).map_err(TouristError::Serialization)?;
        Ok(index)
    }

    /// Writes to a sibling temp file, then renames it over `data.json`.
    fn save_index(&self, index: &StoreIndex) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let data_file = self.root.join(DATA_FILENAME);
        let tmp_file = self.root.join(format!("{}.{}", DATA_FILENAME, TMP_EXTENSION));
        let content = serde_json::to_string_pretty(index).map_err(TouristError::Serialization)?;
        fs::write(&tmp_file, content).map_err(TouristError::Io)?;
        fs::rename(tmp_file, data_file).map_err(TouristError::Io)?;
        Ok(())
    }

    fn read_image(&self, id: &Uuid) -> Result<Option<Vec<u8>>> {
        let path = self.image_path(id);
        if !path.exists() {
            return Ok(None);
        }
        fs::read(path).map(Some).map_err(TouristError::Io)
    }

    fn write_image(&self, id: &Uuid, bytes: &[u8]) -> Result<()> {
        let path = self.image_path(id);
        let tmp_path = path.with_extension(format!("jpg.{}", TMP_EXTENSION));
        fs::write(&tmp_path, bytes).map_err(TouristError::Io)?;
        fs::rename(tmp_path, path).map_err(TouristError::Io)
    }

    fn remove_image(&self, id: &Uuid) -> Result<()> {
        let path = self.image_path(id);
        if path.exists() {
            fs::remove_file(path).map_err(TouristError::Io)?;
        }
        Ok(())
    }

    fn load_photo(&self, metadata: PhotoMetadata) -> Result<Photo> {
        let image = self.read_image(&metadata.id)?;
        Ok(Photo::from_parts(metadata, image))
    }
}

impl DataStore for FileStore {
    fn save_pin(&mut self, pin: &Pin) -> Result<()> {
        let mut index = self.load_index()?;
        match index.pins.iter_mut().find(|p| p.id == pin.id) {
            Some(existing) => *existing = pin.clone(),
            None => index.pins.push(pin.clone()),
        }
        self.save_index(&index)
    }

    fn get_pin(&self, id: &Uuid) -> Result<Pin> {
        let index = self.load_index()?;
        index
            .pins
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or(TouristError::PinNotFound(*id))
    }

    fn list_pins(&self) -> Result<Vec<Pin>> {
        Ok(self.load_index()?.pins)
    }

    fn delete_pin(&mut self, id: &Uuid) -> Result<Vec<Uuid>> {
        let mut index = self.load_index()?;
        let before = index.pins.len();
        index.pins.retain(|p| &p.id != id);
        if index.pins.len() == before {
            return Err(TouristError::PinNotFound(*id));
        }

        let removed: Vec<Uuid> = index
            .photos
            .iter()
            .filter(|m| &m.pin_id == id)
            .map(|m| m.id)
            .collect();
        index.photos.retain(|m| &m.pin_id != id);
        self.save_index(&index)?;

        for photo_id in &removed {
            self.remove_image(photo_id)?;
        }
        Ok(removed)
    }

    fn save_photos(&mut self, photos: &[Photo]) -> Result<()> {
        if photos.is_empty() {
            return Ok(());
        }

        // Image files go first, each through a temp file and a rename. A file at
        // `image_path` is always a complete payload.
        for photo in photos {
            if let Some(bytes) = photo.image() {
                self.ensure_dir(&self.images_dir())?;
                self.write_image(&photo.id(), bytes)?;
            }
        }

        let mut index = self.load_index()?;
        for photo in photos {
            match index.photos.iter_mut().find(|m| m.id == photo.id()) {
                Some(existing) => *existing = photo.metadata().clone(),
                None => index.photos.push(photo.metadata().clone()),
            }
        }
        self.save_index(&index)
    }

    fn get_photo(&self, id: &Uuid) -> Result<Photo> {
        let index = self.load_index()?;
        let metadata = index
            .photos
            .into_iter()
            .find(|m| &m.id == id)
            .ok_or(TouristError::PhotoNotFound(*id))?;
        self.load_photo(metadata)
    }

    fn list_photos(&self, pin_id: &Uuid) -> Result<Vec<Photo>> {
        let index = self.load_index()?;
        index
            .photos
            .into_iter()
            .filter(|m| &m.pin_id == pin_id)
            .map(|m| self.load_photo(m))
            .collect()
    }

    fn count_photos(&self, pin_id: &Uuid) -> Result<usize> {
        let index = self.load_index()?;
        Ok(index.photos.iter().filter(|m| &m.pin_id == pin_id).count())
    }

    fn delete_photo(&mut self, id: &Uuid) -> Result<()> {
        let mut index = self.load_index()?;
        let before = index.photos.len();
        index.photos.retain(|m| &m.id != id);
        if index.photos.len() == before {
            return Err(TouristError::PhotoNotFound(*id));
        }
        self.save_index(&index)?;
        self.remove_image(id)
    }

    fn delete_photos_for_pin(&mut self, pin_id: &Uuid) -> Result<Vec<Uuid>> {
        let mut index = self.load_index()?;
        let removed: Vec<Uuid> = index
            .photos
            .iter()
            .filter(|m| &m.pin_id == pin_id)
            .map(|m| m.id)
            .collect();
        if removed.is_empty() {
            return Ok(removed);
        }
        index.photos.retain(|m| &m.pin_id != pin_id);
        self.save_index(&index)?;

        for photo_id in &removed {
            self.remove_image(photo_id)?;
        }
        Ok(removed)
    }

    fn doctor(&mut self) -> Result<DoctorReport> {
        let mut report = DoctorReport::default();
        let mut index = self.load_index()?;

        let pin_ids: HashSet<Uuid> = index.pins.iter().map(|p| p.id).collect();
        let before = index.photos.len();
        index.photos.retain(|m| pin_ids.contains(&m.pin_id));
        report.removed_orphan_photos = before - index.photos.len();
        if report.removed_orphan_photos > 0 {
            self.save_index(&index)?;
        }

        let images_dir = self.images_dir();
        if images_dir.exists() {
            // Anything else, leftover temp files included, is stray.
            let known: HashSet<PathBuf> =
                index.photos.iter().map(|m| self.image_path(&m.id)).collect();
            for entry in fs::read_dir(&images_dir).map_err(TouristError::Io)? {
                let path = entry.map_err(TouristError::Io)?.path();
                if !path.is_file() {
                    continue;
                }
                if !known.contains(&path) {
                    debug!(path = %path.display(), "removing stray image file");
                    fs::remove_file(&path).map_err(TouristError::Io)?;
                    report.removed_stray_images += 1;
                }
            }
        }

        Ok(report)
    }
}
