//! Attaching downloaded image payloads to photo records.

use crate::commands::{CmdResult, SyncOutcome};
use crate::error::{Result, TouristError};
use crate::events::ChangeEvent;
use crate::model::Photo;
use crate::store::DataStore;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub enum ImagePlan {
    /// Image already attached, nothing to download.
    Present(CmdResult),
    Download(Photo),
}

pub fn plan<S: DataStore>(store: &S, photo_id: &Uuid) -> Result<ImagePlan> {
    let photo = store.get_photo(photo_id)?;
    if photo.has_image() {
        return Ok(ImagePlan::Present(
            CmdResult::default().with_outcome(SyncOutcome::ImagePresent),
        ));
    }
    Ok(ImagePlan::Download(photo))
}

/// Photos of a pin that still have no image, in listing order.
pub fn pending<S: DataStore>(store: &S, pin_id: &Uuid) -> Result<Vec<Photo>> {
    store.get_pin(pin_id)?;
    Ok(store
        .list_photos(pin_id)?
        .into_iter()
        .filter(|p| !p.has_image())
        .collect())
}

/// Attaches `bytes` if the record still exists and has no image yet.
///
/// A record that was deleted mid-download is dropped; one that already has an
/// image keeps it.
pub fn attach<S: DataStore>(store: &mut S, photo_id: &Uuid, bytes: Vec<u8>) -> Result<CmdResult> {
    let mut photo = match store.get_photo(photo_id) {
        Ok(photo) => photo,
        Err(TouristError::PhotoNotFound(_)) => {
            debug!(%photo_id, "photo removed during download, dropping image");
            return Ok(CmdResult::default().with_outcome(SyncOutcome::Dropped));
        }
        Err(e) => return Err(e),
    };

    if !photo.attach_image(bytes) {
        return Ok(CmdResult::default().with_outcome(SyncOutcome::ImagePresent));
    }
    store.save_photos(std::slice::from_ref(&photo))?;

    let mut result = CmdResult::default().with_outcome(SyncOutcome::ImageAttached);
    result.add_event(ChangeEvent::ImageAttached {
        pin_id: photo.pin_id(),
        photo_id: photo.id(),
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn attach_sets_image_once() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 1);
        let photo = fixture.store.list_photos(&fixture.pin(0).id).unwrap()[0].clone();

        let first = attach(&mut fixture.store, &photo.id(), vec![1, 2]).unwrap();
        assert_eq!(first.outcome, Some(SyncOutcome::ImageAttached));
        assert_eq!(first.events.len(), 1);

        let second = attach(&mut fixture.store, &photo.id(), vec![3, 4]).unwrap();
        assert_eq!(second.outcome, Some(SyncOutcome::ImagePresent));
        assert!(second.events.is_empty());

        let stored = fixture.store.get_photo(&photo.id()).unwrap();
        assert_eq!(stored.image(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn attach_to_deleted_photo_is_dropped() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 1);
        let photo = fixture.store.list_photos(&fixture.pin(0).id).unwrap()[0].clone();
        fixture.store.delete_photo(&photo.id()).unwrap();

        let result = attach(&mut fixture.store, &photo.id(), vec![1]).unwrap();
        assert_eq!(result.outcome, Some(SyncOutcome::Dropped));
        assert!(result.events.is_empty());
    }

    #[test]
    fn pending_skips_photos_with_images() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 3);
        let pin = fixture.pin(0);
        let first = fixture.store.list_photos(&pin.id).unwrap()[0].clone();
        attach(&mut fixture.store, &first.id(), vec![9]).unwrap();

        let waiting = pending(&fixture.store, &pin.id).unwrap();
        assert_eq!(waiting.len(), 2);
        assert!(waiting.iter().all(|p| p.id() != first.id()));
    }

    #[test]
    fn plan_reports_present_image() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 1);
        let photo = fixture.store.list_photos(&fixture.pin(0).id).unwrap()[0].clone();
        assert!(matches!(
            plan(&fixture.store, &photo.id()).unwrap(),
            ImagePlan::Download(_)
        ));

        attach(&mut fixture.store, &photo.id(), vec![1]).unwrap();
        assert!(matches!(
            plan(&fixture.store, &photo.id()).unwrap(),
            ImagePlan::Present(_)
        ));
    }
}
