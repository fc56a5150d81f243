//! Opening the dashboard in the platform browser.

use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use artifacts_core::{ChangeKind, PageStore, Subscription};

/// Open `url` in the platform browser once the first page is created.
///
/// Dropping the returned subscription disarms it.
pub fn open_on_first_create(store: &PageStore, url: String) -> Subscription {
    open_on_first_create_with(store, url, open_url)
}

fn open_on_first_create_with<F>(store: &PageStore, url: String, opener: F) -> Subscription
where
    F: Fn(&str) + Send + Sync + 'static,
{
    let opened = Arc::new(AtomicBool::new(false));
    store.subscribe(move |event| {
        if event.kind == ChangeKind::Create && !opened.swap(true, Ordering::SeqCst) {
            opener(&url);
        }
    })
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// Launch the browser. Failures are logged, never returned.
fn open_url(url: &str) {
    // stdout belongs to the MCP transport
    let spawned = browser_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(mut child) => {
            tracing::debug!(url, "opened browser");
            std::thread::spawn(move || {
                if let Err(e) = child.wait() {
                    tracing::warn!("browser process failed: {e}");
                }
            });
        },
        Err(e) => tracing::warn!("failed to open browser for {url}: {e}"),
    }
}
