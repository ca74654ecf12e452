#![allow(dead_code)]

use std::collections::VecDeque;

use chrono::NaiveDate;
use resmon::error::{Error, Result};
use resmon::sampler::{Sample, Sampler};

pub enum Step {
    Reading(Sample),
    Unavailable,
}

/// Plays back a fixed script of readings; once exhausted it keeps returning
/// a quiet sample so extra ticks stay harmless.
pub struct ScriptedSampler {
    steps: VecDeque<Step>,
}

impl ScriptedSampler {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn with_cpu_loads(loads: &[f64]) -> Self {
        Self::new(
            loads
                .iter()
                .map(|&cpu| Step::Reading(sample_with_cpu(cpu)))
                .collect(),
        )
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> Result<Sample> {
        match self.steps.pop_front() {
            Some(Step::Reading(sample)) => Ok(sample),
            Some(Step::Unavailable) => Err(Error::MetricsUnavailable("scripted failure".into())),
            None => Ok(sample_with_cpu(0.0)),
        }
    }
}

pub fn sample_with_cpu(cpu_load_percent: f64) -> Sample {
    Sample {
        timestamp: NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
        cpu_load_percent,
        ram_free_mb: 2048,
        ram_total_mb: 8192,
        disk_free_gb: 120,
        disk_total_gb: 500,
    }
}
