//! Server-sent event streams.
//!
//! Each stream owns a store [`Subscription`](artifacts_core::Subscription).
//! The listener encodes frames while the mutation is still in flight, so a
//! page summary reflects the page as of that event even if the page is gone
//! by the time the stream is polled. Dropping the stream (client gone or
//! server shutdown) drops the subscription and unregisters the listener.

use std::convert::Infallible;

use artifacts_core::{ChangeEvent, ChangeKind, Page, PageStore};
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use super::AppState;
use super::pages::page_not_found;

/// Payload of `create` and `update` events.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSummary<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    title: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Page> for PageSummary<'a> {
    fn from(page: &'a Page) -> Self {
        Self {
            id: &page.id,
            name: page.name.as_deref(),
            title: &page.title,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

/// Convert a store event into an SSE frame.
///
/// `create`/`update` carry the page summary and are skipped if the page is
/// not live; `delete` carries the id only. Called from store listeners, where
/// the page is read as of the event being delivered.
fn to_sse(store: &PageStore, event: &ChangeEvent) -> Option<Event> {
    let data = match event.kind {
        ChangeKind::Create | ChangeKind::Update => {
            let page = store.get(&event.page_id)?;
            serde_json::to_string(&PageSummary::from(&page))
        },
        ChangeKind::Delete => serde_json::to_string(&serde_json::json!({ "id": event.page_id })),
    };
    match data {
        Ok(data) => Some(Event::default().event(event.kind.as_str()).data(data)),
        Err(e) => {
            tracing::warn!(page_id = %event.page_id, "failed to encode event: {e}");
            None
        },
    }
}

/// `GET /events`: every store event.
pub(super) async fn global_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let store = state.store.clone();
    let subscription = state.store.subscribe(move |event| {
        if let Some(frame) = to_sse(&store, event) {
            let _ = tx.send(frame);
        }
    });
    tracing::debug!("global event stream opened");

    let stream = async_stream::stream! {
        let _subscription = subscription;
        let shutdown = state.shutdown_requested();
        tokio::pin!(shutdown);
        loop {
            let received = tokio::select! {
                () = &mut shutdown => None,
                received = rx.recv() => received,
            };
            let Some(frame) = received else { break };
            yield Ok::<_, Infallible>(frame);
        }
        tracing::debug!("global event stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// `GET /pages/{id}/events`: `update` and `delete` events for one page.
///
/// The stream ends after the page's `delete` event.
#[tracing::instrument(skip(state))]
pub(super) async fn page_events(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, mut rx) = mpsc::unbounded_channel::<(ChangeKind, Event)>();
    let watched = id.clone();
    let store = state.store.clone();
    // Subscribe before the existence check so a concurrent delete is not missed
    let subscription = state.store.subscribe(move |event| {
        if event.page_id != watched || event.kind == ChangeKind::Create {
            return;
        }
        if let Some(frame) = to_sse(&store, event) {
            let _ = tx.send((event.kind, frame));
        }
    });
    if state.store.get(&id).is_none() {
        return page_not_found();
    }

    let stream = async_stream::stream! {
        let _subscription = subscription;
        let shutdown = state.shutdown_requested();
        tokio::pin!(shutdown);
        loop {
            let received = tokio::select! {
                () = &mut shutdown => None,
                received = rx.recv() => received,
            };
            let Some((kind, frame)) = received else { break };
            yield Ok::<_, Infallible>(frame);
            if kind == ChangeKind::Delete {
                break;
            }
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use artifacts_core::{CreatePage, StoreOptions};
    use std::sync::{Arc, Mutex};

    fn event(kind: ChangeKind, page_id: &str) -> ChangeEvent {
        ChangeEvent {
            kind,
            page_id: page_id.to_string(),
        }
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let store = PageStore::new(StoreOptions::default());
        let page = store.create(CreatePage::new("Title", "<p>x</p>").with_name("new-artifact"));
        let json = serde_json::to_string(&PageSummary::from(&page)).expect("serialize summary");

        assert!(json.contains(r#""name":"new-artifact""#));
        assert!(json.contains(r#""createdAt""#));
        assert!(json.contains(r#""updatedAt""#));
        assert!(!json.contains("html"));
    }

    #[test]
    fn test_unnamed_summary_omits_name() {
        let store = PageStore::new(StoreOptions::default());
        let page = store.create(CreatePage::new("Title", ""));
        let json = serde_json::to_value(PageSummary::from(&page)).expect("serialize summary");
        assert!(json.get("name").is_none());
        assert_eq!(json["id"], page.id.as_str());
    }

    #[test]
    fn test_create_for_missing_page_is_skipped() {
        let store = PageStore::new(StoreOptions::default());
        assert!(to_sse(&store, &event(ChangeKind::Create, "gone")).is_none());
        assert!(to_sse(&store, &event(ChangeKind::Update, "gone")).is_none());
    }

    #[test]
    fn test_delete_needs_no_page() {
        let store = PageStore::new(StoreOptions::default());
        assert!(to_sse(&store, &event(ChangeKind::Delete, "gone")).is_some());
    }

    #[test]
    fn test_listener_frames_survive_delete() {
        let store = PageStore::new(StoreOptions::default());
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let reader = store.clone();
        let _subscription = store.subscribe(move |event| {
            let framed = to_sse(&reader, event).is_some();
            sink.lock().expect("frames lock").push((event.kind, framed));
        });

        let page = store.create(CreatePage::new("Brief", ""));
        store.delete(&page.id);

        assert_eq!(
            *frames.lock().expect("frames lock"),
            vec![(ChangeKind::Create, true), (ChangeKind::Delete, true)]
        );
    }

    #[test]
    fn test_live_page_produces_frame() {
        let store = PageStore::new(StoreOptions::default());
        let page = store.create(CreatePage::new("Live", ""));
        assert!(to_sse(&store, &event(ChangeKind::Update, &page.id)).is_some());
    }
}
