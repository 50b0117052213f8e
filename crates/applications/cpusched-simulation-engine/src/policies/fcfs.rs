//! First-Come-First-Served

use cpusched_core::{Policy, Result};

use super::{RunState, SchedulingPolicy};

/// Runs processes to completion in arrival order (ties by id)
#[derive(Debug, Clone, Copy, Default)]
pub struct FcfsPolicy;

impl SchedulingPolicy for FcfsPolicy {
    fn schedule(&self, state: &mut RunState) -> Result<()> {
        for index in state.process_set().arrival_order() {
            state.step()?;

            let arrival = state.process(index).arrival;
            state.idle_until(arrival)?;
            state.admit_arrivals();
            state.run_to_completion(index)?;
        }
        Ok(())
    }

    fn policy(&self) -> Policy {
        Policy::Fcfs
    }
}
