use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::events::ChangeEvent;
use crate::index::index_photos;
use crate::store::DataStore;
use uuid::Uuid;

pub fn list<S: DataStore>(store: &S, pin_id: &Uuid) -> Result<CmdResult> {
    store.get_pin(pin_id)?;
    let photos = store.list_photos(pin_id)?;
    Ok(CmdResult::default().with_listed_photos(index_photos(photos)))
}

/// Deletes exactly one photo record. Siblings under the same pin are untouched.
pub fn delete<S: DataStore>(store: &mut S, photo_id: &Uuid) -> Result<CmdResult> {
    let photo = store.get_photo(photo_id)?;
    store.delete_photo(photo_id)?;

    let mut result = CmdResult::default();
    result.add_event(ChangeEvent::PhotosRemoved {
        pin_id: photo.pin_id(),
        photo_ids: vec![photo.id()],
    });
    result.add_message(CmdMessage::success(format!(
        "Photo deleted: {}",
        photo.remote().id()
    )));
    Ok(result)
}
