//! Control protocol definitions (JSON messages)

use serde::{Deserialize, Serialize};

use crate::sampler::Sample;
use crate::session::RecordingSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    Ping,
    GetStatus,
    Configure { params: ConfigureParams },
    StartRecording,
    StopRecording,
    GetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureParams {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,
    Ok,
    Error { message: String },
    Status { data: StatusSnapshot },
    Stopped { data: RecordingSummary },
    Config { data: ConfigData },
}

/// Read-only view pushed to every connected client on each tick and
/// returned by `get_status`. Front-ends render it; they never mutate core
/// state except through requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub timestamp: String,
    pub cpu_load_percent: f64,
    pub ram_free_mb: u64,
    pub ram_total_mb: u64,
    pub disk_free_gb: u64,
    pub disk_total_gb: u64,
    pub recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u64>,
}

impl StatusSnapshot {
    pub fn new(sample: &Sample, recording: bool, elapsed_seconds: Option<u64>) -> Self {
        Self {
            timestamp: sample.timestamp_text(),
            cpu_load_percent: sample.cpu_load_percent,
            ram_free_mb: sample.ram_free_mb,
            ram_total_mb: sample.ram_total_mb,
            disk_free_gb: sample.disk_free_gb,
            disk_total_gb: sample.disk_total_gb,
            recording,
            elapsed_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    pub interval_seconds: u64,
    pub storage_path: String,
    pub recording: bool,
}
