//! The boundary front-ends drive: configure / start / stop / refresh, plus
//! a read-only status feed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::protocol::StatusSnapshot;
use crate::sampler::{Sampler, SystemSampler};
use crate::scheduler::Scheduler;
use crate::session::{RecordingSession, RecordingSummary};
use crate::store::SampleStore;

pub type SystemRecorder = Recorder<SystemSampler>;

/// Ties sampler, session and scheduler together.
///
/// All session mutation happens under one mutex, so at most one tick is
/// processed at a time and start/stop are linearizable with respect to
/// ticks. Lock order is always session before scheduler.
pub struct Recorder<S: Sampler + 'static> {
    sampler: Arc<Mutex<S>>,
    session: Arc<Mutex<RecordingSession>>,
    scheduler: Mutex<Scheduler>,
    status_tx: watch::Sender<Option<StatusSnapshot>>,
}

impl<S: Sampler + 'static> Recorder<S> {
    pub fn new(sampler: S, store: SampleStore, interval_seconds: u64) -> Result<Self> {
        let session = RecordingSession::new(store, interval_seconds)?;
        let (status_tx, _) = watch::channel(None);
        Ok(Self {
            sampler: Arc::new(Mutex::new(sampler)),
            session: Arc::new(Mutex::new(session)),
            scheduler: Mutex::new(Scheduler::new()),
            status_tx,
        })
    }

    /// Latest-snapshot feed for display collaborators.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusSnapshot>> {
        self.status_tx.subscribe()
    }

    pub async fn is_recording(&self) -> bool {
        self.session.lock().await.is_recording()
    }

    pub async fn interval_seconds(&self) -> u64 {
        self.session.lock().await.interval_seconds()
    }

    /// Change the sampling interval; rejected while recording.
    pub async fn configure(&self, interval_seconds: u64) -> Result<()> {
        self.session.lock().await.configure(interval_seconds)
    }

    /// Begin recording and start the tick loop. A no-op when already
    /// recording, so exactly one loop ever runs.
    pub async fn start(&self) {
        let mut session = self.session.lock().await;
        if session.is_recording() {
            debug!("start requested while already recording");
            return;
        }
        session.start();
        let period = Duration::from_secs(session.interval_seconds());

        let mut scheduler = self.scheduler.lock().await;
        drop(session);

        let sampler = Arc::clone(&self.sampler);
        let session = Arc::clone(&self.session);
        let status_tx = self.status_tx.clone();
        scheduler.start(period, move || {
            let sampler = Arc::clone(&sampler);
            let session = Arc::clone(&session);
            let status_tx = status_tx.clone();
            async move {
                let sample = match sampler.lock().await.sample() {
                    Ok(sample) => sample,
                    Err(e) => {
                        warn!("skipping tick: {e}");
                        return;
                    }
                };
                let mut session = session.lock().await;
                if let Err(e) = session.on_tick(&sample) {
                    error!("{e}");
                }
                let snapshot =
                    StatusSnapshot::new(&sample, session.is_recording(), session.elapsed_seconds());
                drop(session);
                let _ = status_tx.send(Some(snapshot));
            }
        });
    }

    /// Stop recording and halt the tick loop. Safe to call while idle.
    pub async fn stop(&self) -> RecordingSummary {
        let mut session = self.session.lock().await;
        let summary = session.stop();
        let mut scheduler = self.scheduler.lock().await;
        drop(session);
        scheduler.stop();
        summary
    }

    /// Sample once outside the timer, for display refreshes while idle.
    /// Never persists.
    pub async fn refresh(&self) -> Result<StatusSnapshot> {
        let sample = self.sampler.lock().await.sample()?;
        let session = self.session.lock().await;
        let snapshot =
            StatusSnapshot::new(&sample, session.is_recording(), session.elapsed_seconds());
        drop(session);
        let _ = self.status_tx.send(Some(snapshot.clone()));
        Ok(snapshot)
    }
}
