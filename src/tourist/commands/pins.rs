use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::events::ChangeEvent;
use crate::index::index_pins;
use crate::model::Pin;
use crate::store::DataStore;
use uuid::Uuid;

/// Drops a pin. Coordinates already pinned return the existing pin unchanged.
pub fn add<S: DataStore>(store: &mut S, latitude: f64, longitude: f64) -> Result<CmdResult> {
    let candidate = Pin::new(latitude, longitude)?;
    let mut result = CmdResult::default();

    if let Some(existing) = store
        .list_pins()?
        .into_iter()
        .find(|p| p.is_at(latitude, longitude))
    {
        result.add_message(CmdMessage::info(format!("Already pinned: {}", existing)));
        return Ok(result.with_affected_pins(vec![existing]));
    }

    store.save_pin(&candidate)?;
    result.add_message(CmdMessage::success(format!("Pin added: {}", candidate)));
    result.add_event(ChangeEvent::PinAdded {
        pin_id: candidate.id,
    });
    Ok(result.with_affected_pins(vec![candidate]))
}

pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    let mut counted = Vec::new();
    for pin in store.list_pins()? {
        let count = store.count_photos(&pin.id)?;
        counted.push((pin, count));
    }
    Ok(CmdResult::default().with_listed_pins(index_pins(counted)))
}

/// Deletes a pin along with every photo it owns.
pub fn delete<S: DataStore>(store: &mut S, pin_id: &Uuid) -> Result<CmdResult> {
    let pin = store.get_pin(pin_id)?;
    let removed = store.delete_pin(pin_id)?;
    let mut result = CmdResult::default();

    if !removed.is_empty() {
        result.add_event(ChangeEvent::PhotosRemoved {
            pin_id: pin.id,
            photo_ids: removed.clone(),
        });
    }
    result.add_event(ChangeEvent::PinRemoved { pin_id: pin.id });
    result.add_message(CmdMessage::success(format!(
        "Pin deleted: {} ({} photos)",
        pin,
        removed.len()
    )));
    Ok(result.with_affected_pins(vec![pin]))
}
