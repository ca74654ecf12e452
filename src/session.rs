//! Recording session state machine

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sampler::Sample;
use crate::store::SampleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

/// What a recording session amounted to, reported when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub elapsed_seconds: u64,
    pub samples_recorded: u64,
}

/// Decides, tick by tick, whether samples are persisted.
///
/// Lives for the whole process and cycles Idle <-> Recording any number of
/// times; each `start` begins a fresh elapsed count. Invariant: `started_at`
/// is `Some` iff the state is `Recording`.
pub struct RecordingSession {
    state: SessionState,
    started_at: Option<Instant>,
    interval_seconds: u64,
    elapsed_seconds: u64,
    samples_recorded: u64,
    store: SampleStore,
}

impl RecordingSession {
    pub fn new(store: SampleStore, interval_seconds: u64) -> Result<Self> {
        if interval_seconds < 1 {
            return Err(Error::InvalidConfig(format!(
                "interval must be at least 1 second, got {interval_seconds}"
            )));
        }
        Ok(Self {
            state: SessionState::Idle,
            started_at: None,
            interval_seconds,
            elapsed_seconds: 0,
            samples_recorded: 0,
            store,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    /// Elapsed whole seconds since `start`; `None` while idle.
    pub fn elapsed_seconds(&self) -> Option<u64> {
        match self.state {
            SessionState::Recording => Some(self.elapsed_seconds),
            SessionState::Idle => None,
        }
    }

    /// Successful appends since the current session started.
    pub fn samples_recorded(&self) -> u64 {
        self.samples_recorded
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Change the sampling interval. Only allowed while idle.
    pub fn configure(&mut self, interval_seconds: u64) -> Result<()> {
        if self.is_recording() {
            return Err(Error::InvalidConfig(
                "cannot change interval while recording".into(),
            ));
        }
        if interval_seconds < 1 {
            return Err(Error::InvalidConfig(format!(
                "interval must be at least 1 second, got {interval_seconds}"
            )));
        }
        self.interval_seconds = interval_seconds;
        Ok(())
    }

    /// Idle -> Recording. Calling this while already recording is a no-op;
    /// the running session keeps its elapsed count.
    pub fn start(&mut self) {
        if self.is_recording() {
            debug!("start ignored, session already recording");
            return;
        }
        self.state = SessionState::Recording;
        self.started_at = Some(Instant::now());
        self.elapsed_seconds = 0;
        self.samples_recorded = 0;
    }

    /// Handle one scheduler fire.
    ///
    /// While recording the sample is appended, then the elapsed counter is
    /// updated. A failed append is returned to the caller but leaves the
    /// session recording and the elapsed counter current; the row is simply
    /// lost. While idle nothing happens.
    pub fn on_tick(&mut self, sample: &Sample) -> Result<()> {
        if !self.is_recording() {
            return Ok(());
        }
        let appended = self.store.append(sample);
        if appended.is_ok() {
            self.samples_recorded += 1;
        }
        if let Some(started_at) = self.started_at {
            self.elapsed_seconds = started_at.elapsed().as_secs();
        }
        appended
    }

    /// Recording -> Idle. Safe to call while already idle, in which case a
    /// zeroed summary comes back.
    pub fn stop(&mut self) -> RecordingSummary {
        if !self.is_recording() {
            return RecordingSummary::default();
        }
        let summary = RecordingSummary {
            elapsed_seconds: self.elapsed_seconds,
            samples_recorded: self.samples_recorded,
        };
        self.state = SessionState::Idle;
        self.started_at = None;
        summary
    }
}
