//! Change notifications.
//!
//! Listeners are plain callbacks owned by the store instance. Delivery is
//! synchronous and in registration order; a listener that panics is logged and
//! skipped so the remaining listeners and the triggering mutation still run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Kind of mutation that produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A page was created.
    Create,
    /// A page was updated (fields, scripts or stylesheets).
    Update,
    /// A page was deleted, evicted or expired.
    Delete,
}

impl ChangeKind {
    /// Wire name, also used as the SSE event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification emitted after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// What happened.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// The affected page.
    pub page_id: String,
}

impl ChangeEvent {
    pub(crate) fn new(kind: ChangeKind, page_id: impl Into<String>) -> Self {
        Self {
            kind,
            page_id: page_id.into(),
        }
    }
}

/// Handle identifying one registration made with
/// [`PageStore::on_change`](crate::PageStore::on_change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Listeners {
    inner: Mutex<ListenerList>,
}

#[derive(Default)]
struct ListenerList {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Listener) -> ListenerId {
        let mut list = self.inner.lock();
        let id = ListenerId(list.next_id);
        list.next_id += 1;
        list.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut list = self.inner.lock();
        let before = list.entries.len();
        list.entries.retain(|(existing, _)| *existing != id);
        list.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Deliver `event` to a snapshot of the current listeners.
    ///
    /// The registry lock is not held while callbacks run, so a listener may
    /// register or unregister listeners (including itself).
    pub(crate) fn emit(&self, event: &ChangeEvent) {
        let snapshot: Vec<(ListenerId, Listener)> = self.inner.lock().entries.clone();
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!(
                    listener = ?id,
                    kind = %event.kind,
                    page_id = %event.page_id,
                    "change listener panicked; continuing with remaining listeners"
                );
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

/// Registration that unregisters its listener when dropped.
///
/// Returned by [`PageStore::subscribe`](crate::PageStore::subscribe). Keep it
/// alive for as long as events should be delivered, typically for the lifetime
/// of a streaming HTTP response.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
#[derive(Debug)]
pub struct Subscription {
    listeners: Weak<Listeners>,
    id: ListenerId,
}

impl Subscription {
    pub(crate) fn new(listeners: &Arc<Listeners>, id: ListenerId) -> Self {
        Self {
            listeners: Arc::downgrade(listeners),
            id,
        }
    }

    /// Id of the underlying registration.
    pub const fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}
