//! Page and dashboard handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::AppState;
use crate::render;

pub(super) async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let pages = state.store.list();
    let tombstones = state.store.list_tombstones();
    Html(render::dashboard_html(&pages, &tombstones))
}

#[tracing::instrument(skip(state))]
pub(super) async fn show_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id) {
        Some(page) => Html(render::page_html(&page)).into_response(),
        None => {
            tracing::debug!("page not found");
            page_not_found()
        },
    }
}

pub(super) fn page_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Page Not Found").into_response()
}
