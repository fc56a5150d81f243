//! # artifacts-core
//!
//! In-memory store for HTML artifacts: pages created by an agent, previewed in
//! a browser and discarded when the process exits.
//!
//! ## Architecture
//!
//! - **Store**: [`PageStore`] owns pages and tombstones, enforces the optional
//!   page cap and TTL, and notifies listeners after every mutation
//! - **Events**: [`ChangeEvent`] values delivered synchronously to listeners
//!   registered with [`PageStore::on_change`] or [`PageStore::subscribe`]
//! - **Sweeper**: a background tokio task that expires pages past their TTL
//! - **Clock**: [`Clock`] abstraction so expiry can be tested deterministically
//!
//! ## Quick Start
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use artifacts_core::{CreatePage, PageStore, StoreOptions};
//!
//! let options = StoreOptions::default().with_max_pages(NonZeroUsize::MIN);
//! let store = PageStore::new(options);
//!
//! let first = store.create(CreatePage::new("First", "<h1>1</h1>"));
//! let second = store.create(CreatePage::new("Second", "<h1>2</h1>"));
//!
//! // Capacity of one: the first page was evicted and tombstoned
//! assert!(store.get(&first.id).is_none());
//! assert_eq!(store.list()[0].id, second.id);
//! assert_eq!(store.list_tombstones()[0].id, first.id);
//! ```
//!
//! ## Error Handling
//!
//! Store operations do not fail: unknown ids yield `None` or `false`. The
//! [`Error`] type covers configuration validation.

/// Wall-clock abstraction
pub mod clock;
/// Error types and result aliases
pub mod error;
/// Change events and listener registration
pub mod events;
mod ordered;
/// The page store
pub mod store;
/// Background TTL sweeper
pub mod sweeper;
/// Page and tombstone records
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use events::{ChangeEvent, ChangeKind, ListenerId, Subscription};
pub use store::{PageStore, StoreOptions};
pub use types::*;
