//! # Photo Cache
//!
//! [`PhotoCache`] is the single entry point for every tourist operation, whatever
//! the UI. It is a facade over the command layer that adds the three things
//! commands deliberately do not do:
//!
//! - **Network**: it owns the [`PhotoSource`] and runs searches and downloads.
//! - **Locking**: the store sits behind a mutex that is only held for the
//!   synchronous command steps, never across a network await. A fetch is
//!   `plan` (locked), then the request (unlocked), then `apply` (locked, one save).
//! - **Notifications**: events reported by commands are published on the
//!   [`EventBus`] once the command has succeeded.
//!
//! ## At most one fetch per key
//!
//! Searches are keyed by pin, downloads by photo. A call whose key is already in
//! flight returns [`SyncOutcome::AlreadyInFlight`] without touching the network
//! or the store. The key is released when the owning call finishes, including
//! on error, so a failed fetch can be retried straight away.
//!
//! ## Generic over DataStore and PhotoSource
//!
//! - Production: `PhotoCache<FileStore, FlickrClient>`
//! - Testing: `PhotoCache<InMemoryStore, FakeSource>`

use crate::commands::{self, CmdMessage, CmdResult, SyncOutcome};
use crate::commands::images::ImagePlan;
use crate::commands::load::LoadPlan;
use crate::config::TouristConfig;
use crate::error::{Result, TouristError};
use crate::events::{ChangeEvent, EventBus};
use crate::flickr::{PhotoSource, SearchQuery};
use crate::index::DisplayIndex;
use crate::model::{Photo, Pin};
use crate::store::DataStore;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlightKey {
    Search(Uuid),
    Image(Uuid),
}

#[derive(Debug, Default)]
struct InFlight {
    keys: Mutex<HashSet<FlightKey>>,
}

impl InFlight {
    fn claim(&self, key: FlightKey) -> Option<FlightGuard<'_>> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key) {
            return None;
        }
        Some(FlightGuard { owner: self, key })
    }
}

/// Releases its key on drop.
struct FlightGuard<'a> {
    owner: &'a InFlight,
    key: FlightKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

pub struct PhotoCache<S: DataStore, R: PhotoSource> {
    store: Mutex<S>,
    source: R,
    config: TouristConfig,
    in_flight: InFlight,
    events: EventBus,
}

impl<S: DataStore, R: PhotoSource> PhotoCache<S, R> {
    pub fn new(store: S, source: R, config: TouristConfig) -> Self {
        Self {
            store: Mutex::new(store),
            source,
            config,
            in_flight: InFlight::default(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &TouristConfig {
        &self.config
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Receive every [`ChangeEvent`] published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Runs a synchronous step with the store locked.
    fn with_store<T>(&self, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| TouristError::Store("store lock poisoned".to_string()))?;
        f(&mut *store)
    }

    fn publish(&self, result: &CmdResult) {
        for event in &result.events {
            self.events.publish(event.clone());
        }
    }

    /// Runs a store-only command and publishes its events.
    fn run_command(&self, f: impl FnOnce(&mut S) -> Result<CmdResult>) -> Result<CmdResult> {
        let result = self.with_store(f)?;
        self.publish(&result);
        Ok(result)
    }

    pub fn add_pin(&self, latitude: f64, longitude: f64) -> Result<CmdResult> {
        self.run_command(|s| commands::pins::add(s, latitude, longitude))
    }

    pub fn list_pins(&self) -> Result<CmdResult> {
        self.with_store(|s| commands::pins::list(s))
    }

    pub fn delete_pin(&self, pin_id: Uuid) -> Result<CmdResult> {
        self.run_command(|s| commands::pins::delete(s, &pin_id))
    }

    pub fn list_photos(&self, pin_id: Uuid) -> Result<CmdResult> {
        self.with_store(|s| commands::photos::list(s, &pin_id))
    }

    pub fn delete_photo(&self, photo_id: Uuid) -> Result<CmdResult> {
        self.run_command(|s| commands::photos::delete(s, &photo_id))
    }

    pub fn photo(&self, photo_id: Uuid) -> Result<Photo> {
        self.with_store(|s| s.get_photo(&photo_id))
    }

    pub fn doctor(&self) -> Result<CmdResult> {
        self.with_store(|s| commands::doctor::run(s))
    }

    pub fn pin_at(&self, index: DisplayIndex) -> Result<Pin> {
        self.with_store(|s| commands::helpers::resolve_pin(s, index))
    }

    pub fn photo_at(&self, pin_id: Uuid, index: DisplayIndex) -> Result<Photo> {
        self.with_store(|s| commands::helpers::resolve_photo(s, &pin_id, index))
    }

    /// Searches for photos if, and only if, the pin owns none.
    #[instrument(skip(self))]
    pub async fn ensure_photos_loaded(&self, pin_id: Uuid) -> Result<CmdResult> {
        let Some(_guard) = self.in_flight.claim(FlightKey::Search(pin_id)) else {
            debug!("search already in flight");
            return Ok(CmdResult::default().with_outcome(SyncOutcome::AlreadyInFlight));
        };

        let pin = match self.with_store(|s| commands::load::plan(s, &pin_id))? {
            LoadPlan::Cached(result) => return Ok(result),
            LoadPlan::Fetch(pin) => pin,
        };
        self.fetch_into(&pin).await
    }

    /// Replaces every photo of the pin with a fresh search page.
    #[instrument(skip(self))]
    pub async fn refresh_collection(&self, pin_id: Uuid) -> Result<CmdResult> {
        let Some(_guard) = self.in_flight.claim(FlightKey::Search(pin_id)) else {
            debug!("search already in flight");
            return Ok(CmdResult::default().with_outcome(SyncOutcome::AlreadyInFlight));
        };

        let (pin, cleared) = self.with_store(|s| {
            let pin = s.get_pin(&pin_id)?;
            let cleared = commands::load::clear(s, &pin_id)?;
            Ok((pin, cleared))
        })?;
        self.publish(&cleared);

        let fetched = self.fetch_into(&pin).await?;
        Ok(fetched.after(cleared))
    }

    async fn fetch_into(&self, pin: &Pin) -> Result<CmdResult> {
        let query = SearchQuery::with_random_page(pin.latitude, pin.longitude, &self.config);
        let page = self.source.search(&query).await.inspect_err(|e| {
            warn!(pin_id = %pin.id, error = %e, "photo search failed");
        })?;

        let result = self.run_command(|s| commands::load::apply(s, &pin.id, page))?;
        if let Some(SyncOutcome::Fetched(count)) = result.outcome {
            info!(pin_id = %pin.id, count, "photos inserted");
        }
        Ok(result)
    }

    /// Downloads and attaches a photo's image. No-op when it already has one.
    #[instrument(skip(self))]
    pub async fn resolve_image(&self, photo_id: Uuid) -> Result<CmdResult> {
        let Some(_guard) = self.in_flight.claim(FlightKey::Image(photo_id)) else {
            debug!("download already in flight");
            return Ok(CmdResult::default().with_outcome(SyncOutcome::AlreadyInFlight));
        };

        let photo = match self.with_store(|s| commands::images::plan(s, &photo_id))? {
            ImagePlan::Present(result) => return Ok(result),
            ImagePlan::Download(photo) => photo,
        };

        let bytes = self
            .source
            .download_image(photo.remote())
            .await
            .inspect_err(|e| warn!(error = %e, "image download failed"))?;

        self.run_command(|s| commands::images::attach(s, &photo_id, bytes))
    }

    /// Resolves every imageless photo of a pin concurrently.
    ///
    /// Individual download failures are reported in the result, not returned
    /// as an error.
    #[instrument(skip(self))]
    pub async fn resolve_images(&self, pin_id: Uuid) -> Result<CmdResult> {
        let pending = self.with_store(|s| commands::images::pending(s, &pin_id))?;
        let outcomes = join_all(pending.iter().map(|p| self.resolve_image(p.id()))).await;

        let mut result = CmdResult::default();
        let mut attached = 0;
        let mut failed = 0;
        for (photo, outcome) in pending.iter().zip(outcomes) {
            match outcome {
                Ok(r) => {
                    if r.outcome == Some(SyncOutcome::ImageAttached) {
                        attached += 1;
                    }
                    result.events.extend(r.events);
                }
                Err(e) => {
                    failed += 1;
                    result.add_message(CmdMessage::warning(format!(
                        "Photo {} failed to download: {}",
                        photo.remote().id(),
                        e
                    )));
                }
            }
        }

        if pending.is_empty() {
            result.add_message(CmdMessage::info("All images already downloaded"));
        } else {
            result.add_message(CmdMessage::success(format!(
                "Downloaded {} of {} images",
                attached,
                pending.len()
            )));
        }
        Ok(result.with_outcome(SyncOutcome::Images { attached, failed }))
    }
}
