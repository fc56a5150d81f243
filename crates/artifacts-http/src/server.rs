//! Server lifecycle.

use std::net::SocketAddr;

use artifacts_core::PageStore;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{HttpError, HttpResult};
use crate::routes::router_with_shutdown;

/// Default bind host.
pub const DEFAULT_HOST: &str = "localhost";

/// Where to listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerOptions {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind; `0` picks an ephemeral port.
    pub port: u16,
}

impl Default for HttpServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 0,
        }
    }
}

/// Base URL for a bound server. IPv6 literals are bracketed.
///
/// ```rust
/// use artifacts_http::base_url;
///
/// assert_eq!(base_url("localhost", 8080), "http://localhost:8080");
/// assert_eq!(base_url("::1", 8080), "http://[::1]:8080");
/// ```
pub fn base_url(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("http://[{host}]:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}

/// A running preview server.
///
/// Call [`close`](Self::close) to stop it: open event streams are ended and
/// in-flight requests are allowed to finish.
#[derive(Debug)]
pub struct HttpServer {
    url: String,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
}

impl HttpServer {
    /// Bind and start serving `store` in the background.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Bind`] if the address cannot be bound.
    pub async fn start(store: PageStore, options: &HttpServerOptions) -> HttpResult<Self> {
        let listener = TcpListener::bind((options.host.as_str(), options.port))
            .await
            .map_err(|source| HttpError::Bind {
                addr: format!("{}:{}", options.host, options.port),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        let url = base_url(&options.host, local_addr.port());

        let (shutdown, signal) = watch::channel(false);
        let app = router_with_shutdown(store, signal.clone());
        let task = tokio::spawn(async move {
            let mut signal = signal;
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // A dropped sender also counts as shutdown
                    let _ = signal.wait_for(|stop| *stop).await;
                })
                .await
        });

        tracing::info!(%url, %local_addr, "HTTP server listening");
        Ok(Self {
            url,
            local_addr,
            shutdown,
            task,
        })
    }

    /// Base URL, e.g. `http://localhost:43127`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Address the listener is bound to.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, end event streams and wait for the server
    /// task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if serving failed or the server task panicked.
    pub async fn close(self) -> HttpResult<()> {
        self.shutdown.send_replace(true);
        let result = self
            .task
            .await
            .map_err(|e| HttpError::Task(e.to_string()))?;
        tracing::info!(url = %self.url, "HTTP server stopped");
        result.map_err(HttpError::from)
    }
}
