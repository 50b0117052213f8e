//! Serializable per-run reports and plain-text tables

use cpusched_core::{Policy, PriorityDirection, Process, Result, SchedError, Segment, Ticks};
use serde::{Deserialize, Serialize};

use crate::stats::Summary;
use crate::types::{RunResult, SimulationConfig};

/// Per-process metrics row, in id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRow {
    pub id: u32,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: u32,
    pub completion: Ticks,
    pub turnaround: Ticks,
    pub waiting: Ticks,
}

impl ProcessRow {
    fn from_process(process: &Process) -> Result<Self> {
        let metrics = process.metrics().ok_or_else(|| {
            SchedError::config(format!("{} has no completion metrics", process.id))
        })?;
        Ok(ProcessRow {
            id: process.id.get(),
            arrival: process.arrival,
            burst: process.burst,
            priority: process.priority,
            completion: metrics.completion,
            turnaround: metrics.turnaround,
            waiting: metrics.waiting,
        })
    }
}

/// Everything one simulation produced, ready for output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub policy: Policy,
    pub description: String,
    pub preemptive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum: Option<Ticks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_direction: Option<PriorityDirection>,
    pub summary: Summary,
    pub segments: Vec<Segment>,
    pub processes: Vec<ProcessRow>,
}

impl SimulationReport {
    pub fn from_run(config: &SimulationConfig, result: &RunResult) -> Result<Self> {
        if config.policy != result.policy {
            return Err(SchedError::config(format!(
                "config is for {} but the run used {}",
                config.policy, result.policy
            )));
        }

        let processes = result
            .processes
            .by_id()
            .into_iter()
            .map(ProcessRow::from_process)
            .collect::<Result<Vec<_>>>()?;

        Ok(SimulationReport {
            policy: result.policy,
            description: result.policy.description().to_string(),
            preemptive: result.policy.is_preemptive(),
            quantum: config.effective_quantum(),
            priority_direction: config.effective_priority_direction(),
            summary: Summary::from_run(result)?,
            segments: result.segments.clone(),
            processes,
        })
    }

    /// Short label for tables, e.g. `RR (q=2)`
    pub fn label(&self) -> String {
        match (self.quantum, self.priority_direction) {
            (Some(q), _) => format!("{} (q={q})", self.policy),
            (None, Some(PriorityDirection::HigherIsHigher)) => format!("{} (high)", self.policy),
            (None, Some(PriorityDirection::LowerIsHigher)) => format!("{} (low)", self.policy),
            (None, None) => self.policy.to_string(),
        }
    }

    /// Per-process metrics table followed by the averages
    pub fn metrics_table(&self) -> String {
        let mut out = format!(
            "{:<6} {:>8} {:>6} {:>9} {:>11} {:>11} {:>8}\n",
            "ID", "Arrival", "Burst", "Priority", "Completion", "Turnaround", "Waiting"
        );
        out.push_str(&"-".repeat(65));
        out.push('\n');
        for row in &self.processes {
            out.push_str(&format!(
                "{:<6} {:>8} {:>6} {:>9} {:>11} {:>11} {:>8}\n",
                format!("P{}", row.id),
                row.arrival,
                row.burst,
                row.priority,
                row.completion,
                row.turnaround,
                row.waiting
            ));
        }
        out.push_str(&format!(
            "Average turnaround: {:.2}   Average waiting: {:.2}\n",
            self.summary.avg_turnaround, self.summary.avg_waiting
        ));
        out
    }

    /// Schedule as `[start-end] subject` lines
    pub fn segment_list(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("  [{:>3} - {:>3}] {}\n", s.start, s.end, s.subject))
            .collect()
    }
}

/// Side-by-side comparison of several runs over the same process set
pub fn comparison_table(reports: &[SimulationReport]) -> String {
    let mut out = format!(
        "{:<16} {:>14} {:>12} {:>8} {:>6} {:>12}\n",
        "Policy", "Avg Turnaround", "Avg Waiting", "Total", "Idle", "Utilization"
    );
    out.push_str(&"-".repeat(73));
    out.push('\n');
    for report in reports {
        let s = &report.summary;
        out.push_str(&format!(
            "{:<16} {:>14.2} {:>12.2} {:>8} {:>6} {:>11.2}%\n",
            report.label(),
            s.avg_turnaround,
            s.avg_waiting,
            s.total_time,
            s.idle_time,
            s.cpu_utilization * 100.0
        ));
    }
    out
}

/// Report with the lowest average waiting time; earlier reports win ties
pub fn best_by_waiting(reports: &[SimulationReport]) -> Option<&SimulationReport> {
    reports.iter().reduce(|best, r| {
        if r.summary.avg_waiting < best.summary.avg_waiting {
            r
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::compare_policies;
    use cpusched_core::ProcessSet;

    fn reports(configs: &[SimulationConfig]) -> Vec<SimulationReport> {
        let set = ProcessSet::default_set();
        let results = compare_policies(&set, configs).unwrap();
        configs
            .iter()
            .zip(&results)
            .map(|(config, result)| SimulationReport::from_run(config, result).unwrap())
            .collect()
    }

    #[test]
    fn test_report_rows_in_id_order() {
        let all = reports(&[SimulationConfig::new(Policy::Sjf)]);
        let report = &all[0];

        let ids: Vec<u32> = report.processes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let completions: Vec<Ticks> = report.processes.iter().map(|r| r.completion).collect();
        assert_eq!(completions, vec![5, 9, 6]);
        assert_eq!(report.quantum, None);
        assert_eq!(report.description, "Shortest-Job-First (non-preemptive)");
        assert!(!report.preemptive);
    }

    #[test]
    fn test_labels() {
        let all = reports(&[
            SimulationConfig::new(Policy::Fcfs),
            SimulationConfig::round_robin(2),
            SimulationConfig::priority(PriorityDirection::HigherIsHigher),
        ]);
        let labels: Vec<String> = all.iter().map(SimulationReport::label).collect();
        assert_eq!(labels, vec!["FCFS", "RR (q=2)", "PRIORITY (high)"]);
        let preemptive: Vec<bool> = all.iter().map(|r| r.preemptive).collect();
        assert_eq!(preemptive, vec![false, true, false]);
    }

    #[test]
    fn test_metrics_table_shows_averages() {
        let all = reports(&[SimulationConfig::new(Policy::Fcfs)]);
        let report = &all[0];
        let table = report.metrics_table();

        assert!(table.contains("P3"));
        assert!(table.contains("Average turnaround: 5.33   Average waiting: 2.33"));
        assert_eq!(report.segment_list().lines().count(), 3);
    }

    #[test]
    fn test_comparison_and_best() {
        let all = reports(&[
            SimulationConfig::new(Policy::Fcfs),
            SimulationConfig::new(Policy::Sjf),
            SimulationConfig::round_robin(2),
        ]);

        let table = comparison_table(&all);
        assert_eq!(table.lines().count(), 2 + all.len());

        let best = best_by_waiting(&all).unwrap();
        assert_eq!(best.policy, Policy::Sjf);
        assert!(best_by_waiting(&[]).is_none());
    }

    #[test]
    fn test_report_serializes_idle_subject() {
        let set = ProcessSet::from_triples(&[(3, 2, 1)]).unwrap();
        let config = SimulationConfig::new(Policy::Fcfs);
        let result = crate::simulator::simulate(set, &config).unwrap();
        let report = SimulationReport::from_run(&config, &result).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["segments"][0]["subject"], "idle");
        assert_eq!(json["segments"][1]["subject"], 1);
        assert_eq!(json["policy"], "FCFS");
        assert!(json.get("quantum").is_none());
    }

    #[test]
    fn test_mismatched_config_rejected() {
        let set = ProcessSet::default_set();
        let result = crate::simulator::simulate(set, &SimulationConfig::new(Policy::Fcfs)).unwrap();
        let err = SimulationReport::from_run(&SimulationConfig::new(Policy::Sjf), &result).unwrap_err();
        assert!(err.is_config());
    }
}
