//! Priority scheduling, non-preemptive

use cpusched_core::{Policy, PriorityDirection, Process, ProcessState, Result};

use super::{RunState, SchedulingPolicy, run_non_preemptive};
use crate::types::IdleStrategy;

/// Among arrived processes, runs the most urgent one to completion.
///
/// Urgency follows `direction`; equal priorities go to the smallest id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPolicy {
    direction: PriorityDirection,
    idle: IdleStrategy,
}

impl PriorityPolicy {
    pub fn new(direction: PriorityDirection, idle: IdleStrategy) -> Self {
        Self { direction, idle }
    }

    fn select(&self, processes: &[Process]) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        // Index order is id order, and only a strictly better priority replaces
        // the current pick, so ties keep the smallest id.
        for (index, process) in processes.iter().enumerate() {
            if process.state() != ProcessState::Ready {
                continue;
            }
            match best {
                Some((_, best_priority))
                    if !self.direction.prefers(process.priority, best_priority) => {}
                _ => best = Some((index, process.priority)),
            }
        }
        best.map(|(index, _)| index)
    }
}

impl SchedulingPolicy for PriorityPolicy {
    fn schedule(&self, state: &mut RunState) -> Result<()> {
        run_non_preemptive(state, self.idle, |processes| self.select(processes))
    }

    fn policy(&self) -> Policy {
        Policy::Priority
    }
}
