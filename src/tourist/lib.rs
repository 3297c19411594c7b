//! # Tourist Architecture
//!
//! Tourist keeps a local, lazily synchronized cache of photos taken near saved
//! map pins. It is a **UI-agnostic library** with a small CLI client on top: the
//! same core could sit behind a map view, a web page or a bot.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, installs logging       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Cache Layer (cache.rs)                                     │
//! │  - Facade over commands, owns the remote source             │
//! │  - At most one search per pin / download per photo          │
//! │  - Publishes change events after successful writes          │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Command Layer (commands/)    │ │  Remote Source (flickr/)  │
//! │  - Pure logic over DataStore  │ │  - PhotoSource trait      │
//! │  - plan / apply around fetch  │ │  - FlickrClient (reqwest) │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                 │
//!                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait                                          │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sync rules
//!
//! - A pin with no photos is searched once. A pin with photos is never searched
//!   again unless its collection is refreshed.
//! - A photo's image is downloaded at most once, then never replaced.
//! - Results that arrive for a pin or photo deleted in the meantime are dropped.
//!
//! ## Module Overview
//!
//! - [`cache`]: The facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Storage abstraction and implementations
//! - [`flickr`]: Remote photo source and its wire format
//! - [`events`]: Change notifications
//! - [`model`]: Core data types (`Pin`, `Photo`)
//! - [`index`]: 1-based display indexes
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod flickr;
pub mod index;
pub mod model;
pub mod store;
