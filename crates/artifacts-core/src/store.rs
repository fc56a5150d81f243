//! The page store.
//!
//! ## Concurrency
//!
//! Every mutating operation holds a re-entrant mutation lock for its full
//! duration, including listener delivery, so mutations never interleave and
//! listeners observe events in mutation order. Collection data sits behind a
//! second lock that is released before listeners run; listeners can therefore
//! read the store, and a listener may even mutate it from the same thread.
//!
//! ## Eviction
//!
//! With `max_pages` set, `create` inserts first and then removes the oldest
//! live pages while the live count exceeds the cap. Every removal records a
//! tombstone; tombstones are capped by the same limit, oldest first.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::events::{ChangeEvent, ChangeKind, ListenerId, Listeners, Subscription};
use crate::ordered::InsertionOrdered;
use crate::sweeper;
use crate::types::{CreatePage, Page, Tombstone, UpdatePage};
use crate::{Error, Result};

/// Capacity and expiry settings, fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Cap on live pages and on retained tombstones. `None` is unbounded.
    pub max_pages: Option<NonZeroUsize>,
    /// Maximum age since last update before a page expires. `None` disables
    /// expiry and the background sweeper.
    pub ttl: Option<Duration>,
}

impl StoreOptions {
    /// Build options from raw values as they arrive from the command line or
    /// environment (`ttl` in milliseconds).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either value is zero.
    ///
    /// ```rust
    /// use artifacts_core::StoreOptions;
    ///
    /// let options = StoreOptions::from_raw(Some(20), Some(60_000))?;
    /// assert_eq!(options.max_pages.map(|n| n.get()), Some(20));
    /// assert!(StoreOptions::from_raw(Some(0), None).is_err());
    /// # Ok::<(), artifacts_core::Error>(())
    /// ```
    pub fn from_raw(max_pages: Option<usize>, ttl_ms: Option<u64>) -> Result<Self> {
        let max_pages = max_pages
            .map(|n| {
                NonZeroUsize::new(n)
                    .ok_or_else(|| Error::Config("max_pages must be at least 1".to_string()))
            })
            .transpose()?;
        let ttl = match ttl_ms {
            Some(0) => return Err(Error::Config("ttl must be at least 1ms".to_string())),
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };
        Ok(Self { max_pages, ttl })
    }

    /// Set the page cap using builder pattern.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: NonZeroUsize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set the TTL using builder pattern.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug, Default)]
struct State {
    pages: InsertionOrdered<Page>,
    tombstones: InsertionOrdered<Tombstone>,
}

impl State {
    /// Shared removal path for delete, eviction and expiry.
    fn remove_page(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        max_pages: Option<NonZeroUsize>,
        events: &mut Vec<ChangeEvent>,
    ) -> bool {
        let Some(page) = self.pages.get(id) else {
            return false;
        };
        let tombstone = Tombstone::for_page(page, now);
        self.tombstones.insert(tombstone.id.clone(), tombstone);
        self.pages.remove(id);
        events.push(ChangeEvent::new(ChangeKind::Delete, id));

        if let Some(max) = max_pages {
            while self.tombstones.len() > max.get() {
                if self.tombstones.pop_oldest().is_none() {
                    break;
                }
            }
        }
        true
    }
}

pub(crate) struct Shared {
    options: StoreOptions,
    clock: Arc<dyn Clock>,
    mutation: ReentrantMutex<()>,
    state: Mutex<State>,
    listeners: Arc<Listeners>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

/// In-memory store of HTML pages.
///
/// Cloning is cheap; clones share the same pages, tombstones and listeners.
///
/// ```rust
/// use artifacts_core::{CreatePage, PageStore, StoreOptions};
///
/// let store = PageStore::new(StoreOptions::default());
/// let page = store.create(CreatePage::new("A", "<p>a</p>"));
/// assert!(store.delete(&page.id));
/// assert!(store.get(&page.id).is_none());
/// assert_eq!(store.list_tombstones()[0].title, "A");
/// ```
#[derive(Clone)]
pub struct PageStore {
    pub(crate) shared: Arc<Shared>,
}

impl PageStore {
    /// Create a store using the system clock.
    ///
    /// When `options.ttl` is set and a tokio runtime is available, a background
    /// sweeper is started on it.
    #[must_use]
    pub fn new(options: StoreOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`.
    #[must_use]
    pub fn with_clock(options: StoreOptions, clock: Arc<dyn Clock>) -> Self {
        let store = Self {
            shared: Arc::new(Shared {
                options,
                clock,
                mutation: ReentrantMutex::new(()),
                state: Mutex::new(State::default()),
                listeners: Arc::new(Listeners::default()),
                sweeper: Mutex::new(None),
            }),
        };
        if let Some(ttl) = options.ttl {
            store.start_sweeper(ttl);
        }
        store
    }

    /// Options the store was built with.
    pub fn options(&self) -> StoreOptions {
        self.shared.options
    }

    fn start_sweeper(&self, ttl: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime available; expired pages will not be swept");
            return;
        };
        let period = sweeper::cleanup_interval(ttl);
        let handle = sweeper::spawn(&runtime, Arc::downgrade(&self.shared), period);
        *self.shared.sweeper.lock() = Some(handle);
        debug!(ttl_ms = ttl.as_millis(), period_ms = period.as_millis(), "sweeper started");
    }

    /// Run `f` against the collections, then deliver the events it queued.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut State, DateTime<Utc>, &mut Vec<ChangeEvent>) -> R,
    ) -> R {
        let _serialized = self.shared.mutation.lock();
        let mut events = Vec::new();
        let result = {
            let mut state = self.shared.state.lock();
            let now = self.shared.clock.now();
            f(&mut state, now, &mut events)
        };
        for event in &events {
            self.shared.listeners.emit(event);
        }
        result
    }

    /// Create a page, evicting the oldest pages if the cap is exceeded.
    pub fn create(&self, params: CreatePage) -> Page {
        let max_pages = self.shared.options.max_pages;
        self.mutate(|state, now, events| {
            let page = Page {
                id: Uuid::new_v4().to_string(),
                name: params.name,
                title: params.title,
                html: params.html,
                scripts: Vec::new(),
                stylesheets: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            state.pages.insert(page.id.clone(), page.clone());
            events.push(ChangeEvent::new(ChangeKind::Create, &page.id));
            debug!(page_id = %page.id, title = %page.title, "page created");

            if let Some(max) = max_pages {
                while state.pages.len() > max.get() {
                    let Some(oldest) = state.pages.oldest_key().map(str::to_owned) else {
                        break;
                    };
                    state.remove_page(&oldest, now, max_pages, events);
                    debug!(page_id = %oldest, max_pages = max.get(), "evicted oldest page");
                }
            }
            page
        })
    }

    /// Look up a live page.
    pub fn get(&self, id: &str) -> Option<Page> {
        self.shared.state.lock().pages.get(id).cloned()
    }

    /// All live pages, oldest first.
    pub fn list(&self) -> Vec<Page> {
        self.shared.state.lock().pages.values().cloned().collect()
    }

    /// All retained tombstones, oldest deletion first.
    pub fn list_tombstones(&self) -> Vec<Tombstone> {
        self.shared
            .state
            .lock()
            .tombstones
            .values()
            .cloned()
            .collect()
    }

    /// Apply the provided fields. `None` if the page does not exist.
    pub fn update(&self, id: &str, params: UpdatePage) -> Option<Page> {
        self.modify(id, |page| {
            if let Some(title) = params.title {
                page.title = title;
            }
            if let Some(html) = params.html {
                page.html = html;
            }
            if let Some(name) = params.name {
                page.name = Some(name);
            }
        })
    }

    /// Append script URLs that are not already present.
    pub fn add_scripts<I, S>(&self, id: &str, urls: I) -> Option<Page>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify(id, |page| append_unique(&mut page.scripts, urls))
    }

    /// Append stylesheet URLs that are not already present.
    pub fn add_stylesheets<I, S>(&self, id: &str, urls: I) -> Option<Page>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify(id, |page| append_unique(&mut page.stylesheets, urls))
    }

    fn modify(&self, id: &str, apply: impl FnOnce(&mut Page)) -> Option<Page> {
        self.mutate(|state, now, events| {
            let page = state.pages.get_mut(id)?;
            apply(page);
            page.updated_at = now.max(page.updated_at);
            events.push(ChangeEvent::new(ChangeKind::Update, id));
            debug!(page_id = %id, "page updated");
            Some(page.clone())
        })
    }

    /// Tombstone and remove a page. `false` if it does not exist.
    pub fn delete(&self, id: &str) -> bool {
        let max_pages = self.shared.options.max_pages;
        let removed =
            self.mutate(|state, now, events| state.remove_page(id, now, max_pages, events));
        if removed {
            debug!(page_id = %id, "page deleted");
        }
        removed
    }

    /// Delete every page whose last update is strictly older than the TTL.
    ///
    /// Returns the number of pages removed. Called by the background sweeper
    /// on each tick; a no-op when no TTL is configured.
    pub fn sweep_expired(&self) -> usize {
        let Some(ttl) = self.shared.options.ttl else {
            return 0;
        };
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let max_pages = self.shared.options.max_pages;

        let removed = self.mutate(|state, now, events| {
            let expired: Vec<String> = state
                .pages
                .values()
                .filter(|page| now - page.updated_at > ttl)
                .map(|page| page.id.clone())
                .collect();
            for id in &expired {
                state.remove_page(id, now, max_pages, events);
            }
            expired.len()
        });

        if removed > 0 {
            info!(removed, remaining = self.len(), "expired pages swept");
        }
        removed
    }

    /// Number of live pages.
    pub fn len(&self) -> usize {
        self.shared.state.lock().pages.len()
    }

    /// Whether the store holds no live pages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a change listener. Delivery order is registration order.
    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.add(Arc::new(listener))
    }

    /// Unregister a listener. Unknown ids are ignored and return `false`.
    pub fn off_change(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    /// Register a listener that is removed when the returned guard drops.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.on_change(listener);
        Subscription::new(&self.shared.listeners, id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    /// Stop the background sweeper. Safe to call repeatedly.
    pub fn dispose(&self) {
        if let Some(handle) = self.shared.sweeper.lock().take() {
            handle.abort();
            debug!("sweeper stopped");
        }
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("options", &self.shared.options)
            .field("pages", &self.len())
            .field("listeners", &self.shared.listeners)
            .finish_non_exhaustive()
    }
}

fn append_unique<I, S>(target: &mut Vec<String>, urls: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for url in urls {
        let url = url.into();
        if !target.contains(&url) {
            target.push(url);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const LIB_JS: &str = "https://cdn.example.com/lib.js";
    const OTHER_JS: &str = "https://cdn.example.com/other.js";
    const STYLE_CSS: &str = "https://cdn.example.com/style.css";

    fn cap(n: usize) -> StoreOptions {
        StoreOptions::default().with_max_pages(NonZeroUsize::new(n).expect("non-zero cap"))
    }

    fn manual(options: StoreOptions) -> (PageStore, ManualClock) {
        let clock = ManualClock::default();
        let store = PageStore::with_clock(options, Arc::new(clock.clone()));
        (store, clock)
    }

    fn record(store: &PageStore) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.on_change(move |e| sink.lock().push(e.clone()));
        events
    }

    mod create {
        use super::*;

        #[test]
        fn test_sets_fields_and_equal_timestamps() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test Page", "<h1>Hello</h1>"));

            assert_eq!(page.title, "Test Page");
            assert_eq!(page.html, "<h1>Hello</h1>");
            assert!(page.name.is_none());
            assert!(page.scripts.is_empty());
            assert!(page.stylesheets.is_empty());

            let fetched = store.get(&page.id).expect("page exists");
            assert_eq!(fetched.created_at, fetched.updated_at);
            assert_eq!(fetched, page);
        }

        #[test]
        fn test_assigns_unique_ids() {
            let store = PageStore::default();
            let a = store.create(CreatePage::new("Page 1", "<p>1</p>"));
            let b = store.create(CreatePage::new("Page 2", "<p>2</p>"));
            assert!(!a.id.is_empty());
            assert_ne!(a.id, b.id);
        }

        #[test]
        fn test_keeps_name() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Named", "").with_name("my-artifact"));
            assert_eq!(page.name.as_deref(), Some("my-artifact"));
        }

        #[test]
        fn test_emits_create_event() {
            let store = PageStore::default();
            let events = record(&store);
            let page = store.create(CreatePage::new("A", ""));
            assert_eq!(
                *events.lock(),
                vec![ChangeEvent::new(ChangeKind::Create, &page.id)]
            );
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn test_get_unknown_is_none() {
            let store = PageStore::default();
            assert!(store.get("non-existent").is_none());
        }

        #[test]
        fn test_list_empty_and_in_creation_order() {
            let store = PageStore::default();
            assert!(store.list().is_empty());
            assert!(store.is_empty());

            let ids: Vec<String> = (0..5)
                .map(|i| store.create(CreatePage::new(format!("P{i}"), "")).id)
                .collect();
            let listed: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
            assert_eq!(listed, ids);
        }
    }

    mod update {
        use super::*;

        #[test]
        fn test_applies_only_provided_fields() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Old Title", "<p>content</p>"));

            let updated = store
                .update(
                    &page.id,
                    UpdatePage {
                        title: Some("New Title".to_string()),
                        ..UpdatePage::default()
                    },
                )
                .expect("page exists");

            assert_eq!(updated.title, "New Title");
            assert_eq!(updated.html, "<p>content</p>");
            assert!(updated.name.is_none());
        }

        #[test]
        fn test_sets_name_and_html() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Title", "<p>old</p>"));

            store.update(
                &page.id,
                UpdatePage {
                    html: Some("<p>new</p>".to_string()),
                    name: Some("renamed".to_string()),
                    ..UpdatePage::default()
                },
            );

            let fetched = store.get(&page.id).expect("page exists");
            assert_eq!(fetched.title, "Title");
            assert_eq!(fetched.html, "<p>new</p>");
            assert_eq!(fetched.name.as_deref(), Some("renamed"));
        }

        #[test]
        fn test_advances_updated_at_only() {
            let (store, clock) = manual(StoreOptions::default());
            let page = store.create(CreatePage::new("Title", ""));
            clock.advance(chrono::Duration::seconds(2));

            let updated = store
                .update(
                    &page.id,
                    UpdatePage {
                        title: Some("Updated".to_string()),
                        ..UpdatePage::default()
                    },
                )
                .expect("page exists");

            assert_eq!(updated.created_at, page.created_at);
            assert_eq!(
                updated.updated_at - page.updated_at,
                chrono::Duration::seconds(2)
            );
        }

        #[test]
        fn test_updated_at_never_moves_backwards() {
            let (store, clock) = manual(StoreOptions::default());
            let page = store.create(CreatePage::new("Title", ""));
            clock.advance(chrono::Duration::seconds(-30));

            let updated = store.add_scripts(&page.id, [LIB_JS]).expect("page exists");

            assert!(updated.updated_at >= page.updated_at);
            assert!(updated.created_at <= updated.updated_at);
        }

        #[test]
        fn test_unknown_returns_none_without_event() {
            let store = PageStore::default();
            let events = record(&store);
            let result = store.update(
                "non-existent",
                UpdatePage {
                    title: Some("New".to_string()),
                    ..UpdatePage::default()
                },
            );
            assert!(result.is_none());
            assert!(events.lock().is_empty());
        }

        #[test]
        fn test_emits_update_event() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));
            let events = record(&store);

            store.update(
                &page.id,
                UpdatePage {
                    title: Some("Updated".to_string()),
                    ..UpdatePage::default()
                },
            );

            assert_eq!(
                *events.lock(),
                vec![ChangeEvent::new(ChangeKind::Update, &page.id)]
            );
        }
    }

    mod resources {
        use super::*;

        #[test]
        fn test_add_scripts_deduplicates_in_order() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));

            store.add_scripts(&page.id, [LIB_JS]);
            let updated = store
                .add_scripts(&page.id, [LIB_JS, OTHER_JS])
                .expect("page exists");

            assert_eq!(updated.scripts, vec![LIB_JS, OTHER_JS]);
        }

        #[test]
        fn test_add_scripts_twice_keeps_single_entry() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));

            store.add_scripts(&page.id, [LIB_JS]);
            store.add_scripts(&page.id, [LIB_JS]);

            let fetched = store.get(&page.id).expect("page exists");
            assert_eq!(fetched.scripts, vec![LIB_JS]);
        }

        #[test]
        fn test_duplicates_within_one_call_collapse() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));
            let updated = store
                .add_stylesheets(&page.id, vec![STYLE_CSS.to_string(), STYLE_CSS.to_string()])
                .expect("page exists");
            assert_eq!(updated.stylesheets, vec![STYLE_CSS]);
        }

        #[test]
        fn test_add_stylesheets_leaves_scripts_alone() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));

            let updated = store
                .add_stylesheets(&page.id, [STYLE_CSS])
                .expect("page exists");

            assert_eq!(updated.stylesheets, vec![STYLE_CSS]);
            assert!(updated.scripts.is_empty());
        }

        #[test]
        fn test_unknown_page_returns_none() {
            let store = PageStore::default();
            assert!(store.add_scripts("non-existent", [LIB_JS]).is_none());
            assert!(store.add_stylesheets("non-existent", [STYLE_CSS]).is_none());
        }

        #[test]
        fn test_each_call_emits_one_update() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));
            let events = record(&store);

            store.add_scripts(&page.id, [LIB_JS]);
            store.add_stylesheets(&page.id, [STYLE_CSS]);

            assert_eq!(
                *events.lock(),
                vec![
                    ChangeEvent::new(ChangeKind::Update, &page.id),
                    ChangeEvent::new(ChangeKind::Update, &page.id),
                ]
            );
        }
    }

    mod delete {
        use super::*;

        #[test]
        fn test_delete_tombstones_page() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("A", "<p>a</p>"));

            assert!(store.delete(&page.id));

            assert!(store.get(&page.id).is_none());
            assert!(store.list().is_empty());
            let tombstones = store.list_tombstones();
            assert_eq!(tombstones.len(), 1);
            assert_eq!(tombstones[0].id, page.id);
            assert_eq!(tombstones[0].title, "A");
            assert_eq!(tombstones[0].created_at, page.created_at);
        }

        #[test]
        fn test_delete_unknown_has_no_side_effects() {
            let store = PageStore::default();
            let events = record(&store);

            assert!(!store.delete("non-existent"));

            assert!(store.list_tombstones().is_empty());
            assert!(events.lock().is_empty());
        }

        #[test]
        fn test_delete_twice_only_tombstones_once() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("A", ""));
            assert!(store.delete(&page.id));
            assert!(!store.delete(&page.id));
            assert_eq!(store.list_tombstones().len(), 1);
        }

        #[test]
        fn test_delete_emits_delete_event() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));
            let events = record(&store);

            store.delete(&page.id);

            assert_eq!(
                *events.lock(),
                vec![ChangeEvent::new(ChangeKind::Delete, &page.id)]
            );
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn test_single_slot_keeps_newest() {
            let store = PageStore::new(cap(1));
            let page1 = store.create(CreatePage::new("Page 1", "<p>1</p>"));
            let page2 = store.create(CreatePage::new("Page 2", "<p>2</p>"));

            let live: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
            assert_eq!(live, vec![page2.id]);
            let tombstones = store.list_tombstones();
            assert_eq!(tombstones.len(), 1);
            assert_eq!(tombstones[0].id, page1.id);
            assert_eq!(tombstones[0].title, "Page 1");
        }

        #[test]
        fn test_oldest_k_pages_are_evicted() {
            let n = 3;
            let k = 4;
            let store = PageStore::new(cap(n));
            let created: Vec<Page> = (0..n + k)
                .map(|i| store.create(CreatePage::new(format!("P{i}"), "")))
                .collect();

            let live: Vec<&str> = created[k..].iter().map(|p| p.id.as_str()).collect();
            let listed: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
            assert_eq!(listed, live);

            // Tombstones are capped at n too, so only the most recent n evictions remain
            let tombstoned: Vec<String> =
                store.list_tombstones().into_iter().map(|t| t.id).collect();
            let expected: Vec<String> = created[k - n..k].iter().map(|p| p.id.clone()).collect();
            assert_eq!(tombstoned, expected);
        }

        #[test]
        fn test_eviction_follows_creation_not_update() {
            let store = PageStore::new(cap(2));
            let first = store.create(CreatePage::new("First", ""));
            let second = store.create(CreatePage::new("Second", ""));
            store.add_scripts(&first.id, [LIB_JS]);

            store.create(CreatePage::new("Third", ""));

            assert!(store.get(&first.id).is_none());
            assert!(store.get(&second.id).is_some());
        }

        #[test]
        fn test_create_event_precedes_eviction_delete() {
            let store = PageStore::new(cap(1));
            let page1 = store.create(CreatePage::new("Page 1", ""));
            let events = record(&store);

            let page2 = store.create(CreatePage::new("Page 2", ""));

            assert_eq!(
                *events.lock(),
                vec![
                    ChangeEvent::new(ChangeKind::Create, &page2.id),
                    ChangeEvent::new(ChangeKind::Delete, &page1.id),
                ]
            );
        }

        #[test]
        fn test_unbounded_without_cap() {
            let store = PageStore::default();
            for i in 0..10 {
                store.create(CreatePage::new(format!("Page {i}"), ""));
            }
            assert_eq!(store.len(), 10);
            assert!(store.list_tombstones().is_empty());
        }

        #[test]
        fn test_tombstones_capped_oldest_first() {
            let store = PageStore::new(cap(2));
            let page1 = store.create(CreatePage::new("P1", ""));
            let page2 = store.create(CreatePage::new("P2", ""));
            store.delete(&page1.id);
            store.delete(&page2.id);
            assert_eq!(store.list_tombstones().len(), 2);

            let page3 = store.create(CreatePage::new("P3", ""));
            store.delete(&page3.id);

            let ids: Vec<String> = store.list_tombstones().into_iter().map(|t| t.id).collect();
            assert_eq!(ids, vec![page2.id, page3.id]);
        }
    }

    mod expiry {
        use super::*;

        fn ttl(secs: u64) -> StoreOptions {
            StoreOptions::default().with_ttl(Duration::from_secs(secs))
        }

        #[test]
        fn test_boundary_is_exclusive() {
            let (store, clock) = manual(ttl(30));
            store.create(CreatePage::new("Expiring", "<p>bye</p>"));

            clock.advance(chrono::Duration::seconds(30));
            assert_eq!(store.sweep_expired(), 0);
            assert_eq!(store.len(), 1);

            clock.advance(chrono::Duration::milliseconds(1));
            assert_eq!(store.sweep_expired(), 1);
            assert!(store.is_empty());
            assert_eq!(store.list_tombstones().len(), 1);
        }

        #[test]
        fn test_uses_updated_at() {
            let (store, clock) = manual(ttl(30));
            let page = store.create(CreatePage::new("Updated", "<p>original</p>"));

            clock.advance(chrono::Duration::seconds(20));
            store.update(
                &page.id,
                UpdatePage {
                    html: Some("<p>updated</p>".to_string()),
                    ..UpdatePage::default()
                },
            );

            clock.advance(chrono::Duration::seconds(25));
            assert_eq!(store.sweep_expired(), 0);

            clock.advance(chrono::Duration::seconds(10));
            assert_eq!(store.sweep_expired(), 1);
            assert!(store.get(&page.id).is_none());
        }

        #[test]
        fn test_sweep_emits_delete_events() {
            let (store, clock) = manual(ttl(10));
            let old = store.create(CreatePage::new("Old", ""));
            clock.advance(chrono::Duration::seconds(8));
            let fresh = store.create(CreatePage::new("Fresh", ""));
            let events = record(&store);

            clock.advance(chrono::Duration::seconds(3));
            store.sweep_expired();

            assert_eq!(
                *events.lock(),
                vec![ChangeEvent::new(ChangeKind::Delete, &old.id)]
            );
            assert!(store.get(&fresh.id).is_some());
        }

        #[test]
        fn test_no_ttl_never_expires() {
            let (store, clock) = manual(StoreOptions::default());
            store.create(CreatePage::new("Forever", ""));
            clock.advance(chrono::Duration::days(365));
            assert_eq!(store.sweep_expired(), 0);
            assert_eq!(store.len(), 1);
        }
    }

    mod listeners {
        use super::*;

        #[test]
        fn test_off_change_stops_delivery() {
            let store = PageStore::default();
            let page = store.create(CreatePage::new("Test", ""));
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&events);
            let id = store.on_change(move |e| sink.lock().push(e.clone()));

            store.update(
                &page.id,
                UpdatePage {
                    title: Some("Updated".to_string()),
                    ..UpdatePage::default()
                },
            );
            assert!(store.off_change(id));
            store.update(
                &page.id,
                UpdatePage {
                    title: Some("Updated Again".to_string()),
                    ..UpdatePage::default()
                },
            );

            assert_eq!(events.lock().len(), 1);
            assert!(!store.off_change(id));
        }

        #[test]
        fn test_subscription_drop_unregisters() {
            let store = PageStore::default();
            let subscription = store.subscribe(|_| {});
            assert_eq!(store.listener_count(), 1);
            drop(subscription);
            assert_eq!(store.listener_count(), 0);
        }

        #[test]
        fn test_listener_can_read_store() {
            let store = PageStore::default();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let reader = store.clone();
            let sink = Arc::clone(&seen);
            store.on_change(move |e| {
                let title = reader.get(&e.page_id).map(|p| p.title);
                sink.lock().push(title);
            });

            let page = store.create(CreatePage::new("Visible", ""));
            store.delete(&page.id);

            assert_eq!(*seen.lock(), vec![Some("Visible".to_string()), None]);
        }

        #[test]
        fn test_listener_can_mutate_reentrantly() {
            let store = PageStore::default();
            let writer = store.clone();
            store.on_change(move |e| {
                if e.kind == ChangeKind::Create {
                    writer.add_scripts(&e.page_id, [LIB_JS]);
                }
            });

            let page = store.create(CreatePage::new("Auto", ""));

            let fetched = store.get(&page.id).expect("page exists");
            assert_eq!(fetched.scripts, vec![LIB_JS]);
        }

        #[test]
        fn test_panicking_listener_does_not_abort_mutation() {
            let store = PageStore::default();
            store.on_change(|_| panic!("listener failure"));
            let events = record(&store);

            let page = store.create(CreatePage::new("Survives", ""));

            assert!(store.get(&page.id).is_some());
            assert_eq!(events.lock().len(), 1);
        }
    }

    mod options {
        use super::*;

        #[test]
        fn test_from_raw_accepts_positive_values() {
            let options = StoreOptions::from_raw(Some(5), Some(1500)).expect("valid options");
            assert_eq!(options.max_pages.map(NonZeroUsize::get), Some(5));
            assert_eq!(options.ttl, Some(Duration::from_millis(1500)));
            assert_eq!(
                StoreOptions::from_raw(None, None).expect("valid options"),
                StoreOptions::default()
            );
        }

        #[test]
        fn test_from_raw_rejects_zero() {
            assert!(matches!(
                StoreOptions::from_raw(Some(0), None),
                Err(Error::Config(_))
            ));
            assert!(matches!(
                StoreOptions::from_raw(None, Some(0)),
                Err(Error::Config(_))
            ));
        }

        #[test]
        fn test_ttl_without_runtime_does_not_panic() {
            let store = PageStore::new(StoreOptions::default().with_ttl(Duration::from_secs(1)));
            store.dispose();
            store.dispose();
        }

        #[test]
        fn test_dispose_without_ttl_is_noop() {
            let store = PageStore::default();
            store.dispose();
        }
    }
}
