//! # CLI Structure and Argument Parsing
//!
//! `html-artifacts` takes no subcommands: it starts the preview server, then
//! serves MCP over stdio until the client disconnects.
//!
//! ```bash
//! # Ephemeral port, unlimited pages, no expiry
//! html-artifacts
//!
//! # Keep at most 20 pages, expire after 10 minutes of inactivity
//! html-artifacts --max-pages 20 --ttl 600000
//!
//! # Fixed address, headless
//! HTML_ARTIFACTS_PORT=4000 html-artifacts --no-open
//! ```

use artifacts_core::StoreOptions;
use artifacts_http::{DEFAULT_HOST, HttpServerOptions};
use clap::Parser;

/// Command-line options for the `html-artifacts` binary
#[derive(Parser, Clone, Debug)]
#[command(name = "html-artifacts")]
#[command(version)]
#[command(about = "Preview HTML pages created by MCP clients", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Host the preview server binds to
    #[arg(long, env = "HTML_ARTIFACTS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port the preview server binds to (0 picks a free port)
    #[arg(long, env = "HTML_ARTIFACTS_PORT", default_value_t = 0)]
    pub port: u16,

    /// Maximum number of live pages; the oldest is evicted beyond this
    #[arg(long, env = "HTML_ARTIFACTS_MAX_PAGES", value_name = "N")]
    pub max_pages: Option<usize>,

    /// Expire pages not updated within this many milliseconds
    #[arg(long, env = "HTML_ARTIFACTS_TTL", value_name = "MS")]
    pub ttl: Option<u64>,

    /// Do not open the dashboard in a browser when the first page is created
    #[arg(long)]
    pub no_open: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    /// Store options from `--max-pages` and `--ttl`
    ///
    /// # Errors
    ///
    /// Returns [`artifacts_core::Error::Config`] when either value is zero.
    pub fn store_options(&self) -> artifacts_core::Result<StoreOptions> {
        StoreOptions::from_raw(self.max_pages, self.ttl)
    }

    /// HTTP bind options from `--host` and `--port`
    pub fn http_options(&self) -> HttpServerOptions {
        HttpServerOptions {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
