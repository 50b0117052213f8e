//! Discrete-time simulator for single-CPU scheduling
//!
//! Runs one scheduling policy over one process set and checks the resulting
//! schedule before handing it back. Each run consumes its process set; use
//! `ProcessSet::fresh` (or `compare_policies`) to run the same definitions
//! under several policies.

use cpusched_core::{ProcessSet, Result, SchedError};
use tracing::{debug, info};

use crate::policies::{RunState, SchedulingPolicy, policy_for};
use crate::timeline::{busy_time, verify_contiguous};
use crate::types::{RunResult, SimulationConfig};

/// Simulator bound to a validated configuration
pub struct Simulator {
    config: SimulationConfig,
    policy: Box<dyn SchedulingPolicy>,
}

impl Simulator {
    /// Validate `config` and build its policy. Fails before any simulation.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let policy = policy_for(&config)?;
        Ok(Simulator { config, policy })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the policy to completion over `processes`
    pub fn run(&self, processes: ProcessSet) -> Result<RunResult> {
        info!(
            policy = %self.config.policy,
            processes = processes.len(),
            quantum = ?self.config.effective_quantum(),
            direction = ?self.config.effective_priority_direction(),
            "Starting simulation"
        );

        let mut state = RunState::new(processes);
        self.policy.schedule(&mut state)?;
        let (segments, processes) = state.into_parts();

        let result = RunResult {
            policy: self.config.policy,
            segments,
            processes,
        };
        verify_run(&result)?;

        info!(
            policy = %result.policy,
            segments = result.segments.len(),
            total_time = result.total_time(),
            idle_time = result.idle_time(),
            "Simulation complete"
        );
        Ok(result)
    }
}

/// Run one policy over `processes`
pub fn simulate(processes: ProcessSet, config: &SimulationConfig) -> Result<RunResult> {
    Simulator::new(*config)?.run(processes)
}

/// Run every config over its own fresh copy of `processes`.
///
/// All configs are validated before the first simulation starts.
pub fn compare_policies(
    processes: &ProcessSet,
    configs: &[SimulationConfig],
) -> Result<Vec<RunResult>> {
    let simulators = configs
        .iter()
        .map(|config| Simulator::new(*config))
        .collect::<Result<Vec<_>>>()?;

    simulators
        .iter()
        .map(|simulator| simulator.run(processes.fresh()))
        .collect()
}

/// Post-run checks: contiguity, completion, work conservation, schedule length
fn verify_run(result: &RunResult) -> Result<()> {
    verify_contiguous(&result.segments)?;

    for process in result.processes.iter() {
        let Some(metrics) = process.metrics() else {
            return Err(SchedError::invariant(format!(
                "{} never completed ({} units remaining)",
                process.id, process.remaining()
            )));
        };

        let ran = busy_time(&result.segments, process.id);
        if ran != process.burst {
            return Err(SchedError::invariant(format!(
                "{} ran for {ran} units but its burst is {}",
                process.id, process.burst
            )));
        }
        if metrics.turnaround != metrics.waiting + process.burst {
            return Err(SchedError::invariant(format!(
                "{} turnaround {} != waiting {} + burst {}",
                process.id, metrics.turnaround, metrics.waiting, process.burst
            )));
        }
    }

    let max_completion = result.processes.max_completion().unwrap_or(0);
    if result.total_time() != max_completion {
        return Err(SchedError::invariant(format!(
            "schedule ends at {} but last completion is {max_completion}",
            result.total_time()
        )));
    }

    debug!(policy = %result.policy, "run verified");
    Ok(())
}
