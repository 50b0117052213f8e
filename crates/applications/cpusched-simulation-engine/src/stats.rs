//! Statistics over a completed run
//!
//! Averages are kept exact; rounding to 2 decimals happens only when a
//! summary is displayed or explicitly `rounded()`.

use std::fmt;

use cpusched_core::{ProcessSet, Result, SchedError, Ticks};
use serde::{Deserialize, Serialize};

use crate::types::RunResult;

/// Aggregate figures for one completed run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    /// Schedule length (latest completion)
    pub total_time: Ticks,
    pub idle_time: Ticks,
    /// Busy time over schedule length, in [0, 1]
    pub cpu_utilization: f64,
}

impl Summary {
    /// Summarize a verified run
    pub fn from_run(result: &RunResult) -> Result<Self> {
        let summary = aggregate(&result.processes)?;
        if summary.idle_time != result.idle_time() {
            return Err(SchedError::invariant(format!(
                "{}: idle segments total {} but schedule implies {}",
                result.policy,
                result.idle_time(),
                summary.idle_time
            )));
        }
        Ok(summary)
    }

    /// Copy with every ratio rounded to 2 decimals
    pub fn rounded(&self) -> Self {
        Self {
            avg_turnaround: round2(self.avg_turnaround),
            avg_waiting: round2(self.avg_waiting),
            cpu_utilization: round2(self.cpu_utilization),
            ..*self
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg turnaround {:.2}, avg waiting {:.2}, total time {}, idle {}, utilization {:.2}%",
            self.avg_turnaround,
            self.avg_waiting,
            self.total_time,
            self.idle_time,
            self.cpu_utilization * 100.0
        )
    }
}

/// Reduce a completed process set to its averages.
///
/// Every process must have finished. The processor is busy for exactly the
/// sum of bursts, so idle time and utilization follow from the last completion.
pub fn aggregate(processes: &ProcessSet) -> Result<Summary> {
    if processes.is_empty() {
        return Err(SchedError::config("cannot summarize an empty process set"));
    }

    let mut total_turnaround: u128 = 0;
    let mut total_waiting: u128 = 0;
    let mut total_time: Ticks = 0;
    for process in processes {
        let Some(metrics) = process.metrics() else {
            return Err(SchedError::config(format!(
                "{} has not finished; run a simulation before summarizing",
                process.id
            )));
        };
        total_turnaround += u128::from(metrics.turnaround);
        total_waiting += u128::from(metrics.waiting);
        total_time = total_time.max(metrics.completion);
    }

    let count = processes.len() as f64;
    let busy = processes.total_burst();
    let idle_time = total_time.checked_sub(busy).ok_or_else(|| {
        SchedError::invariant(format!(
            "schedule of length {total_time} cannot hold {busy} units of work"
        ))
    })?;

    Ok(Summary {
        avg_turnaround: total_turnaround as f64 / count,
        avg_waiting: total_waiting as f64 / count,
        total_time,
        idle_time,
        cpu_utilization: busy as f64 / total_time as f64,
    })
}

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
