//! Heartbeat polling and link health.
//!
//! A poll is launched every interval without waiting for the previous one, so
//! polls may overlap when the engine is slow. Each reply is posted to the UI
//! thread and reconciled there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use instant::Instant;

use crate::api::{ApiClient, ApiError};
use crate::app::spawn_task;
use crate::sequencing::{Ticket, TicketCounter};
use crate::state::AppMessage;

/// Health of the poll link, derived from consecutive poll failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No poll has succeeded yet
    Connecting,
    /// Latest poll succeeded, or too few failures since to call it stale
    Connected,
    /// At least `stale_after` polls in a row failed
    Stale { failures: u32 },
}

impl LinkStatus {
    pub fn description(&self) -> &'static str {
        match self {
            LinkStatus::Connecting => "Connecting",
            LinkStatus::Connected => "Connected",
            LinkStatus::Stale { .. } => "Disconnected",
        }
    }
}

/// Counts consecutive poll failures. Never touches displayed channel values.
#[derive(Debug)]
pub struct LinkMonitor {
    stale_after: u32,
    failures: u32,
    status: LinkStatus,
    last_snapshot: Option<Instant>,
}

impl LinkMonitor {
    pub fn new(stale_after: u32) -> Self {
        Self {
            stale_after: stale_after.max(1),
            failures: 0,
            status: LinkStatus::Connecting,
            last_snapshot: None,
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Time since the last successful poll.
    pub fn last_snapshot_age(&self) -> Option<Duration> {
        self.last_snapshot.map(|at| at.elapsed())
    }

    pub fn record_success(&mut self) {
        if self.status != LinkStatus::Connected {
            tracing::info!("Engine link up");
        }
        self.failures = 0;
        self.status = LinkStatus::Connected;
        self.last_snapshot = Some(Instant::now());
    }

    pub fn record_failure(&mut self, error: &ApiError) {
        self.failures = self.failures.saturating_add(1);
        tracing::warn!(
            "Heartbeat failed ({}, {} in a row): {}",
            error.kind(),
            self.failures,
            error
        );

        if self.failures >= self.stale_after {
            if !matches!(self.status, LinkStatus::Stale { .. }) {
                tracing::warn!("Engine link stale after {} failed polls", self.failures);
            }
            self.status = LinkStatus::Stale {
                failures: self.failures,
            };
        }
    }
}

/// Stops the poll loop when dropped.
#[derive(Debug)]
pub struct PollHandle {
    stop: Arc<AtomicBool>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start polling the engine every `interval`, posting each reply as
/// [`AppMessage::Heartbeat`].
pub fn start_polling(
    api: ApiClient,
    tx: Sender<AppMessage>,
    interval: Duration,
    repaint: Option<egui::Context>,
) -> PollHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stopped = stop.clone();

    tracing::info!(
        "Polling {}/{} every {:?}",
        api.base_url(),
        api.device(),
        interval
    );

    spawn_task(async move {
        let mut tickets = TicketCounter::default();
        loop {
            if stopped.load(Ordering::Relaxed) {
                break;
            }
            poll_once(api.clone(), tx.clone(), tickets.issue(), repaint.clone());
            sleep(interval).await;
        }
        tracing::debug!("Heartbeat stopped");
    });

    PollHandle { stop }
}

/// Launch one poll as its own task.
pub fn poll_once(
    api: ApiClient,
    tx: Sender<AppMessage>,
    ticket: Ticket,
    repaint: Option<egui::Context>,
) {
    spawn_task(async move {
        let result = api.fetch_state().await;
        if tx.send(AppMessage::Heartbeat { ticket, result }).is_err() {
            tracing::debug!("UI closed, dropping heartbeat");
        }
        if let Some(ctx) = repaint {
            ctx.request_repaint();
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}
