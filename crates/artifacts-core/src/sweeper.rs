//! Background TTL sweeper.
//!
//! The task holds only a weak reference to the store, so it never keeps a
//! store alive. It stops when the store is disposed or dropped.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::store::{PageStore, Shared};

/// Lower bound on the sweep period.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

/// Sweep period for a given TTL: half the TTL (whole milliseconds), but never
/// less than [`MIN_CLEANUP_INTERVAL`].
///
/// ```rust
/// use std::time::Duration;
/// use artifacts_core::sweeper::cleanup_interval;
///
/// assert_eq!(cleanup_interval(Duration::from_secs(60)), Duration::from_secs(30));
/// assert_eq!(cleanup_interval(Duration::from_secs(5)), Duration::from_secs(10));
/// ```
pub fn cleanup_interval(ttl: Duration) -> Duration {
    let half_ms = u64::try_from(ttl.as_millis() / 2).unwrap_or(u64::MAX);
    Duration::from_millis(half_ms).max(MIN_CLEANUP_INTERVAL)
}

pub(crate) fn spawn(runtime: &Handle, shared: Weak<Shared>, period: Duration) -> JoinHandle<()> {
    runtime.spawn(async move {
        // First tick fires one full period after start
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                tracing::debug!("store dropped; sweeper exiting");
                break;
            };
            PageStore { shared }.sweep_expired();
        }
    })
}
