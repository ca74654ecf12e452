//! Periodic tick source

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Drives the sampling path at a fixed period.
///
/// At most one loop runs at a time. `stop` takes effect before the next
/// would-be fire; a fire already in progress runs to completion. Changing
/// the period means stop, reconfigure, start.
pub struct Scheduler {
    stop_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            stop_tx: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Fire `fire` every `period`, the first time one full period from now.
    /// Ignored if a loop is already running.
    pub fn start<F, Fut>(&mut self, period: Duration, mut fire: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        if self.is_running() {
            debug!("scheduler already running, start ignored");
            return;
        }
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            // A slow fire delays the next one instead of bursting to catch up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => fire().await,
                }
            }
        });
        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
    }

    /// Signal the loop to wind down. No new fire is scheduled after this
    /// returns.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        self.handle.take();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
