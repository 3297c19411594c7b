use crate::error::{Result, TouristError};
use crate::index::{index_photos, DisplayIndex};
use crate::model::{Photo, Pin};
use crate::store::DataStore;
use uuid::Uuid;

/// Resolves a pin display index (oldest first) to the pin.
pub fn resolve_pin<S: DataStore>(store: &S, index: DisplayIndex) -> Result<Pin> {
    let mut pins = store.list_pins()?;
    pins.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    index
        .0
        .checked_sub(1)
        .and_then(|i| pins.into_iter().nth(i))
        .ok_or_else(|| TouristError::Api(format!("Pin {} not found", index)))
}

/// Resolves a photo display index within a pin to the photo.
pub fn resolve_photo<S: DataStore>(store: &S, pin_id: &Uuid, index: DisplayIndex) -> Result<Photo> {
    store.get_pin(pin_id)?;
    index_photos(store.list_photos(pin_id)?)
        .into_iter()
        .find(|dp| dp.index == index)
        .map(|dp| dp.photo)
        .ok_or_else(|| TouristError::Api(format!("Photo {} not found on this pin", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn resolves_pin_by_position() {
        let fixture = StoreFixture::new().with_pin(1.0, 1.0).with_pin(2.0, 2.0);
        let pin = resolve_pin(&fixture.store, DisplayIndex(1)).unwrap();
        assert!(pin.is_at(1.0, 1.0) || pin.is_at(2.0, 2.0));
        assert!(resolve_pin(&fixture.store, DisplayIndex(3)).is_err());
    }

    #[test]
    fn resolves_photo_by_position() {
        let fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 2);
        let pin = fixture.pin(0);
        let photo = resolve_photo(&fixture.store, &pin.id, DisplayIndex(2)).unwrap();
        assert_eq!(photo.remote().id(), "1001");
        assert!(resolve_photo(&fixture.store, &pin.id, DisplayIndex(3)).is_err());
    }
}
