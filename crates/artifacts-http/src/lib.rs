//! # artifacts-http
//!
//! Browser-facing preview server for an [`artifacts_core::PageStore`].
//!
//! ## Routes
//!
//! - `GET /`: dashboard listing live pages with an embedded preview
//! - `GET /events`: server-sent events for every store change
//! - `GET /pages/{id}`: the page HTML with its scripts, stylesheets and a
//!   hot-reload script injected
//! - `GET /pages/{id}/events`: server-sent events for one page
//!
//! Any other method gets `405 Method Not Allowed`; any other path gets
//! `404 Not Found`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use artifacts_core::{PageStore, StoreOptions};
//! use artifacts_http::{HttpServer, HttpServerOptions};
//!
//! # async fn example() -> Result<(), artifacts_http::HttpError> {
//! let store = PageStore::new(StoreOptions::default());
//! let server = HttpServer::start(store, &HttpServerOptions::default()).await?;
//! println!("preview at {}", server.url());
//! server.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod render;
mod routes;
pub mod server;

pub use error::{HttpError, HttpResult};
pub use routes::router;
pub use server::{DEFAULT_HOST, HttpServer, HttpServerOptions, base_url};
