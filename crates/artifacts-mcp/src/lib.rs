//! html-artifacts MCP server
//!
//! Exposes a [`PageStore`](artifacts_core::PageStore) to MCP clients through
//! seven tools: `create_page`, `get_page`, `get_pages`, `update_page`,
//! `destroy_page`, `add_scripts` and `add_stylesheets`.
//!
//! Tool failures caused by the caller (unknown page id, invalid URL, empty
//! update) come back as error-flagged tool results whose text is the error
//! message. Everything else surfaces as a protocol error.
//!
//! ```no_run
//! use artifacts_core::{PageStore, StoreOptions};
//! use artifacts_mcp::McpServer;
//!
//! # async fn run() -> artifacts_mcp::McpResult<()> {
//! let store = PageStore::new(StoreOptions::default());
//! let server = McpServer::new(store, "http://localhost:4000");
//! server.serve_stdio().await
//! # }
//! ```

pub mod error;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::{McpServer, SERVER_NAME};
