//! Router assembly.

use artifacts_core::PageStore;
use axum::Router;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;

mod events;
mod pages;

/// Shared state for all routes
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: PageStore,
    pub(crate) shutdown: Option<watch::Receiver<bool>>,
}

impl AppState {
    /// Resolves once the server begins shutting down or its handle is gone.
    /// Never resolves for a router built without a shutdown signal.
    pub(crate) async fn shutdown_requested(&self) {
        match self.shutdown.clone() {
            Some(mut rx) => {
                let _ = rx.wait_for(|stop| *stop).await;
            },
            None => std::future::pending::<()>().await,
        }
    }
}

/// Build the preview router for `store`.
///
/// Streams opened through this router run until the client disconnects; use
/// [`HttpServer`](crate::HttpServer) for a server that also closes them on
/// shutdown.
pub fn router(store: PageStore) -> Router {
    build(store, None)
}

pub(crate) fn router_with_shutdown(store: PageStore, shutdown: watch::Receiver<bool>) -> Router {
    build(store, Some(shutdown))
}

fn build(store: PageStore, shutdown: Option<watch::Receiver<bool>>) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/events", get(events::global_events))
        .route("/pages/{id}", get(pages::show_page))
        .route("/pages/{id}/events", get(events::page_events))
        .fallback(not_found)
        .layer(middleware::from_fn(require_get))
        .with_state(AppState { store, shutdown })
}

async fn require_get(request: Request, next: Next) -> Response {
    if request.method() == Method::GET {
        next.run(request).await
    } else {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
