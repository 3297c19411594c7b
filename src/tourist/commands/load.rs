//! Deciding when a pin's photos must be fetched, and merging search results.

use crate::commands::{CmdMessage, CmdResult, SyncOutcome};
use crate::error::{Result, TouristError};
use crate::events::ChangeEvent;
use crate::flickr::SearchPage;
use crate::index::index_photos;
use crate::model::{Photo, Pin};
use crate::store::DataStore;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub enum LoadPlan {
    /// The pin already owns photos. Holds the listing.
    Cached(CmdResult),
    /// The pin owns no photos and must be searched.
    Fetch(Pin),
}

pub fn plan<S: DataStore>(store: &S, pin_id: &Uuid) -> Result<LoadPlan> {
    let pin = store.get_pin(pin_id)?;
    let photos = store.list_photos(pin_id)?;
    if photos.is_empty() {
        return Ok(LoadPlan::Fetch(pin));
    }
    Ok(LoadPlan::Cached(
        CmdResult::default()
            .with_listed_photos(index_photos(photos))
            .with_outcome(SyncOutcome::Cached),
    ))
}

/// Deletes every photo the pin owns, ahead of a refetch.
pub fn clear<S: DataStore>(store: &mut S, pin_id: &Uuid) -> Result<CmdResult> {
    store.get_pin(pin_id)?;
    let removed = store.delete_photos_for_pin(pin_id)?;
    let mut result = CmdResult::default();
    if !removed.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Removed {} photos",
            removed.len()
        )));
        result.add_event(ChangeEvent::PhotosRemoved {
            pin_id: *pin_id,
            photo_ids: removed,
        });
    }
    Ok(result)
}

/// Inserts one imageless record per search result, in a single save.
///
/// If the pin was deleted while the search was running, the page is dropped.
pub fn apply<S: DataStore>(store: &mut S, pin_id: &Uuid, page: SearchPage) -> Result<CmdResult> {
    match store.get_pin(pin_id) {
        Ok(_) => {}
        Err(TouristError::PinNotFound(_)) => {
            debug!(%pin_id, "pin removed during search, dropping results");
            return Ok(CmdResult::default().with_outcome(SyncOutcome::Dropped));
        }
        Err(e) => return Err(e),
    }

    let photos: Vec<Photo> = page
        .photos
        .into_iter()
        .map(|remote| Photo::new(*pin_id, remote))
        .collect();
    let inserted = photos.len();
    store.save_photos(&photos)?;

    let mut result = CmdResult::default().with_outcome(SyncOutcome::Fetched(inserted));
    if inserted == 0 {
        result.add_message(CmdMessage::warning("No photos found near this pin"));
    } else {
        result.add_event(ChangeEvent::PhotosInserted {
            pin_id: *pin_id,
            photo_ids: photos.iter().map(|p| p.id()).collect(),
        });
        result.add_message(CmdMessage::success(format!(
            "Fetched {} photos (page {} of {})",
            inserted, page.page, page.pages
        )));
    }

    let listed = store.list_photos(pin_id)?;
    Ok(result.with_listed_photos(index_photos(listed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RemotePhoto;
    use crate::store::memory::fixtures::StoreFixture;

    fn page_of(n: usize) -> SearchPage {
        SearchPage {
            page: 2,
            pages: 10,
            per_page: 15,
            total: 150,
            photos: (0..n)
                .map(|i| RemotePhoto::new(format!("{}", i), "1", "s"))
                .collect(),
        }
    }

    #[test]
    fn empty_pin_plans_fetch() {
        let fixture = StoreFixture::new().with_pin(1.0, 1.0);
        let pin = fixture.pin(0);
        assert!(matches!(plan(&fixture.store, &pin.id).unwrap(), LoadPlan::Fetch(p) if p.id == pin.id));
    }

    #[test]
    fn populated_pin_is_cached() {
        let fixture = StoreFixture::new().with_pin(1.0, 1.0).with_photos(0, 2);
        match plan(&fixture.store, &fixture.pin(0).id).unwrap() {
            LoadPlan::Cached(result) => {
                assert_eq!(result.listed_photos.len(), 2);
                assert_eq!(result.outcome, Some(SyncOutcome::Cached));
            }
            LoadPlan::Fetch(_) => panic!("expected cached plan"),
        }
    }

    #[test]
    fn apply_inserts_one_record_per_result() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0);
        let pin = fixture.pin(0);

        let result = apply(&mut fixture.store, &pin.id, page_of(4)).unwrap();
        assert_eq!(result.outcome, Some(SyncOutcome::Fetched(4)));
        assert_eq!(result.listed_photos.len(), 4);
        assert!(result
            .listed_photos
            .iter()
            .all(|dp| !dp.photo.has_image() && dp.photo.pin_id() == pin.id));
        assert!(matches!(
            &result.events[..],
            [ChangeEvent::PhotosInserted { photo_ids, .. }] if photo_ids.len() == 4
        ));
    }

    #[test]
    fn apply_empty_page_emits_nothing() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0);
        let pin_id = fixture.pin(0).id;
        let result = apply(&mut fixture.store, &pin_id, page_of(0)).unwrap();
        assert_eq!(result.outcome, Some(SyncOutcome::Fetched(0)));
        assert!(result.events.is_empty());
    }

    #[test]
    fn apply_for_deleted_pin_is_dropped() {
        let mut fixture = StoreFixture::new().with_pin(1.0, 1.0);
        let pin = fixture.pin(0);
        fixture.store.delete_pin(&pin.id).unwrap();

        let result = apply(&mut fixture.store, &pin.id, page_of(3)).unwrap();
        assert_eq!(result.outcome, Some(SyncOutcome::Dropped));
        assert_eq!(fixture.store.count_photos(&pin.id).unwrap(), 0);
    }

    #[test]
    fn clear_removes_all_photos_of_pin_only() {
        let mut fixture = StoreFixture::new()
            .with_pin(1.0, 1.0)
            .with_pin(2.0, 2.0)
            .with_photos(0, 3)
            .with_photos(1, 2);
        let pin = fixture.pin(0);

        let result = clear(&mut fixture.store, &pin.id).unwrap();
        assert_eq!(fixture.store.count_photos(&pin.id).unwrap(), 0);
        assert_eq!(fixture.store.count_photos(&fixture.pin(1).id).unwrap(), 2);
        assert_eq!(result.events.len(), 1);
    }
}
