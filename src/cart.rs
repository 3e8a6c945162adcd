use crate::api::{ApiClient, CartSummary};
use crate::logger::Logger;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Latest successful cart snapshot plus when it was fetched.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub summary: Option<CartSummary>,
    pub fetched_at: Option<DateTime<Local>>,
    pub refreshes: usize,
    pub failures: usize,
}

/// Shared cart display state. A successful refresh fully replaces the
/// snapshot; a failed one leaves the previous values visible (stale is
/// better than blank). The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct CartBoard {
    inner: Mutex<CartView>,
}

impl CartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, summary: CartSummary) {
        let mut inner = self.inner.lock().unwrap();
        inner.summary = Some(summary);
        inner.fetched_at = Some(Local::now());
        inner.refreshes += 1;
    }

    pub fn record_failure(&self) {
        self.inner.lock().unwrap().failures += 1;
    }

    pub fn snapshot(&self) -> CartView {
        self.inner.lock().unwrap().clone()
    }
}

/// One poll step: fetch the cart and update the board on success. On
/// failure the error goes to the session log only and the board keeps its
/// previous snapshot. Returns whether the refresh succeeded.
pub async fn refresh(client: &ApiClient, board: &CartBoard, logger: &Logger) -> bool {
    match client.fetch_cart().await {
        Ok(summary) => {
            board.update(summary);
            true
        }
        Err(e) => {
            board.record_failure();
            let _ = logger.log_error(&format!("Cart refresh failed: {:#}", e));
            false
        }
    }
}

/// Repeating cart refresh task. The web front end ran an unconditional
/// `setInterval` for the page's lifetime; here the task is owned by the
/// REPL and stopped on exit.
pub struct CartPoller {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl CartPoller {
    pub fn spawn(
        client: Arc<ApiClient>,
        board: Arc<CartBoard>,
        logger: Arc<Logger>,
        interval: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !running_clone.load(Ordering::Relaxed) {
                    break;
                }
                refresh(&client, &board, &logger).await;
            }
        });

        Self { running, handle }
    }

    /// Stop the poll loop. Safe to call while a refresh is in flight.
    pub fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        self.handle.abort();
    }
}
