//! Background expiry sweeping

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::cancellation::CancellationToken;
use super::store::EntryStore;
use crate::config::SweepMode;

/// Handle to the sweeper task
#[derive(Debug)]
pub(crate) struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweeper onto the current Tokio runtime
    pub(crate) fn spawn(store: Arc<EntryStore>, interval: Duration, mode: SweepMode) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        info!(?mode, interval_ms = interval.as_millis(), "Starting fingerprint sweeper");

        let handle = tokio::spawn(async move {
            match mode {
                SweepMode::Periodic => run_periodic(&store, interval, &task_token).await,
                SweepMode::OneShot => run_once(&store, interval, &task_token).await,
            }
            debug!("Fingerprint sweeper stopped");
        });

        Self { token, handle }
    }

    /// Whether the task is still running
    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the task to stop without waiting for it
    pub(crate) fn cancel(&self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
        }
    }

    /// Stop the task and wait for it to exit
    pub(crate) async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Fingerprint sweeper ended abnormally");
        }
    }
}

async fn run_periodic(store: &EntryStore, interval: Duration, token: &CancellationToken) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                store.sweep_at(Instant::now());
            }
        }
    }
}

async fn run_once(store: &EntryStore, delay: Duration, token: &CancellationToken) {
    tokio::select! {
        () = token.cancelled() => {}
        () = tokio::time::sleep(delay) => {
            store.sweep_at(Instant::now());
        }
    }
}
