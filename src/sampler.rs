//! Host metrics sampling (CPU load, RAM, disk)

use chrono::{Local, NaiveDateTime, Timelike};
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use crate::error::{Error, Result};

/// Format the store persists timestamps in.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BYTES_PER_MB: u64 = 1024 * 1024;
const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// One instantaneous reading of host resource metrics.
///
/// MB/GB values come from truncating integer division; sub-unit precision is
/// discarded on purpose, matching the persisted format.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Local civil time, whole seconds.
    pub timestamp: NaiveDateTime,
    pub cpu_load_percent: f64,
    pub ram_free_mb: u64,
    pub ram_total_mb: u64,
    pub disk_free_gb: u64,
    pub disk_total_gb: u64,
}

impl Sample {
    /// Timestamp in the `YYYY-MM-DD HH:MM:SS` form the store persists.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub trait Sampler: Send {
    /// Read the metrics of the moment. A failed read surfaces as
    /// `MetricsUnavailable` and the caller skips that tick.
    fn sample(&mut self) -> Result<Sample>;
}

/// Samples the host through `sysinfo`, keeping one `System` instance alive
/// so CPU usage has a baseline between reads.
pub struct SystemSampler {
    sys: System,
    disks: Disks,
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        // Initial refresh so the first sample has a CPU delta to work from.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        Self { sys, disks }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SystemSampler {
    fn sample(&mut self) -> Result<Sample> {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.disks.refresh();
        if self.disks.list().is_empty() {
            self.disks.refresh_list();
        }

        let ram_total = self.sys.total_memory();
        if ram_total == 0 {
            return Err(Error::MetricsUnavailable(
                "total memory reported as zero".into(),
            ));
        }
        let ram_free = self.sys.available_memory();

        // The root volume, or whatever sysinfo lists first when "/" is not
        // a mount point (containers).
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| self.disks.list().first())
            .ok_or_else(|| Error::MetricsUnavailable("no disks reported".into()))?;
        let disk_free = disk.available_space();
        let disk_total = disk.total_space();

        let now = Local::now().naive_local();

        Ok(Sample {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            cpu_load_percent: f64::from(self.sys.global_cpu_usage()),
            ram_free_mb: ram_free / BYTES_PER_MB,
            ram_total_mb: ram_total / BYTES_PER_MB,
            disk_free_gb: disk_free / BYTES_PER_GB,
            disk_total_gb: disk_total / BYTES_PER_GB,
        })
    }
}
