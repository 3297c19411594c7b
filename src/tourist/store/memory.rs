use super::{DataStore, DoctorReport};
use crate::error::{Result, TouristError};
use crate::model::{Photo, Pin};
use std::collections::HashSet;
use uuid::Uuid;

/// Non-persistent store. Keeps insertion order like `FileStore`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pins: Vec<Pin>,
    photos: Vec<Photo>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_pin(&mut self, pin: &Pin) -> Result<()> {
        match self.pins.iter_mut().find(|p| p.id == pin.id) {
            Some(existing) => *existing = pin.clone(),
            None => self.pins.push(pin.clone()),
        }
        Ok(())
    }

    fn get_pin(&self, id: &Uuid) -> Result<Pin> {
        self.pins
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or(TouristError::PinNotFound(*id))
    }

    fn list_pins(&self) -> Result<Vec<Pin>> {
        Ok(self.pins.clone())
    }

    fn delete_pin(&mut self, id: &Uuid) -> Result<Vec<Uuid>> {
        let before = self.pins.len();
        self.pins.retain(|p| &p.id != id);
        if self.pins.len() == before {
            return Err(TouristError::PinNotFound(*id));
        }
        self.delete_photos_for_pin(id)
    }

    fn save_photos(&mut self, photos: &[Photo]) -> Result<()> {
        for photo in photos {
            match self.photos.iter_mut().find(|p| p.id() == photo.id()) {
                Some(existing) => *existing = photo.clone(),
                None => self.photos.push(photo.clone()),
            }
        }
        Ok(())
    }

    fn get_photo(&self, id: &Uuid) -> Result<Photo> {
        self.photos
            .iter()
            .find(|p| &p.id() == id)
            .cloned()
            .ok_or(TouristError::PhotoNotFound(*id))
    }

    fn list_photos(&self, pin_id: &Uuid) -> Result<Vec<Photo>> {
        Ok(self
            .photos
            .iter()
            .filter(|p| &p.pin_id() == pin_id)
            .cloned()
            .collect())
    }

    fn count_photos(&self, pin_id: &Uuid) -> Result<usize> {
        Ok(self.photos.iter().filter(|p| &p.pin_id() == pin_id).count())
    }

    fn delete_photo(&mut self, id: &Uuid) -> Result<()> {
        let before = self.photos.len();
        self.photos.retain(|p| &p.id() != id);
        if self.photos.len() == before {
            return Err(TouristError::PhotoNotFound(*id));
        }
        Ok(())
    }

    fn delete_photos_for_pin(&mut self, pin_id: &Uuid) -> Result<Vec<Uuid>> {
        let removed: Vec<Uuid> = self
            .photos
            .iter()
            .filter(|p| &p.pin_id() == pin_id)
            .map(|p| p.id())
            .collect();
        self.photos.retain(|p| &p.pin_id() != pin_id);
        Ok(removed)
    }

    fn doctor(&mut self) -> Result<DoctorReport> {
        let pin_ids: HashSet<Uuid> = self.pins.iter().map(|p| p.id).collect();
        let before = self.photos.len();
        self.photos.retain(|p| pin_ids.contains(&p.pin_id()));
        Ok(DoctorReport {
            removed_orphan_photos: before - self.photos.len(),
            removed_stray_images: 0,
        })
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::RemotePhoto;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_pin(mut self, latitude: f64, longitude: f64) -> Self {
            let pin = Pin::new(latitude, longitude).unwrap();
            self.store.save_pin(&pin).unwrap();
            self
        }

        /// Adds `count` imageless photos to the pin at `index` (insertion order).
        pub fn with_photos(mut self, index: usize, count: usize) -> Self {
            let pin_id = self.store.pins[index].id;
            let photos: Vec<Photo> = (0..count)
                .map(|i| {
                    Photo::new(
                        pin_id,
                        RemotePhoto::new(format!("{}", 1000 + i), "65535", format!("sec{}", i)),
                    )
                })
                .collect();
            self.store.save_photos(&photos).unwrap();
            self
        }

        pub fn pin(&self, index: usize) -> Pin {
            self.store.pins[index].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn test_delete_not_found() {
        let mut store = InMemoryStore::new();
        let id = Uuid::new_v4();
        match store.delete_pin(&id) {
            Err(TouristError::PinNotFound(err_id)) => assert_eq!(err_id, id),
            _ => panic!("Expected PinNotFound"),
        }
    }

    #[test]
    fn test_save_photos_updates_in_place() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 3);
        let pin = fixture.pin(0);

        let mut second = fixture.store.list_photos(&pin.id).unwrap()[1].clone();
        second.attach_image(vec![7]);
        fixture.store.save_photos(&[second.clone()]).unwrap();

        let photos = fixture.store.list_photos(&pin.id).unwrap();
        assert_eq!(photos.len(), 3);
        assert_eq!(photos[1], second);
    }

    #[test]
    fn test_doctor_removes_orphans() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 2);
        let pin = fixture.pin(0);
        fixture.store.pins.clear();

        let report = fixture.store.doctor().unwrap();
        assert_eq!(report.removed_orphan_photos, 2);
        assert_eq!(fixture.store.count_photos(&pin.id).unwrap(), 0);
    }
}
