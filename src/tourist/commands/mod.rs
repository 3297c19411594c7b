//! # Command Layer
//!
//! Pure business logic over a [`DataStore`](crate::store::DataStore). Commands
//! never touch the network: operations that need the remote source are split into
//! a `plan` step (decide what to fetch) and an `apply` step (merge what came
//! back), and [`crate::cache::PhotoCache`] runs the fetch in between with the
//! store lock released.
//!
//! Commands report the rows they changed as [`ChangeEvent`]s in the returned
//! [`CmdResult`]. The cache publishes them once the command has succeeded.

use crate::config::TouristConfig;
use crate::events::ChangeEvent;
use crate::index::{DisplayPhoto, DisplayPin};
use crate::model::Pin;
use crate::store::DoctorReport;

pub mod config;
pub mod doctor;
pub mod helpers;
pub mod images;
pub mod load;
pub mod photos;
pub mod pins;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// What a sync operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The pin already had photos; nothing was fetched.
    Cached,
    /// A search ran and this many records were inserted.
    Fetched(usize),
    /// The same search or download was already running.
    AlreadyInFlight,
    /// The image was already present; nothing was downloaded.
    ImagePresent,
    ImageAttached,
    /// The target row disappeared while the fetch was running.
    Dropped,
    /// Batch image resolution for a pin.
    Images { attached: usize, failed: usize },
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_pins: Vec<Pin>,
    pub listed_pins: Vec<DisplayPin>,
    pub listed_photos: Vec<DisplayPhoto>,
    pub config: Option<TouristConfig>,
    pub report: Option<DoctorReport>,
    pub outcome: Option<SyncOutcome>,
    pub events: Vec<ChangeEvent>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn add_event(&mut self, event: ChangeEvent) {
        self.events.push(event);
    }

    pub fn with_affected_pins(mut self, pins: Vec<Pin>) -> Self {
        self.affected_pins = pins;
        self
    }

    pub fn with_listed_pins(mut self, pins: Vec<DisplayPin>) -> Self {
        self.listed_pins = pins;
        self
    }

    pub fn with_listed_photos(mut self, photos: Vec<DisplayPhoto>) -> Self {
        self.listed_photos = photos;
        self
    }

    pub fn with_config(mut self, config: TouristConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_report(mut self, report: DoctorReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_outcome(mut self, outcome: SyncOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Folds an earlier step's messages and events in front of this result's.
    pub fn after(mut self, earlier: CmdResult) -> Self {
        let mut messages = earlier.messages;
        messages.append(&mut self.messages);
        self.messages = messages;

        let mut events = earlier.events;
        events.append(&mut self.events);
        self.events = events;
        self
    }
}
