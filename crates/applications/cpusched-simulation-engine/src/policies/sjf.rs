//! Shortest-Job-First, non-preemptive

use cpusched_core::{Policy, Result};

use super::{RunState, SchedulingPolicy, run_non_preemptive, select_min_by_key};
use crate::types::IdleStrategy;

/// Among arrived processes, runs the one with the smallest burst to completion
#[derive(Debug, Clone, Copy, Default)]
pub struct SjfPolicy {
    idle: IdleStrategy,
}

impl SjfPolicy {
    pub fn new(idle: IdleStrategy) -> Self {
        Self { idle }
    }
}

impl SchedulingPolicy for SjfPolicy {
    fn schedule(&self, state: &mut RunState) -> Result<()> {
        run_non_preemptive(state, self.idle, |processes| {
            select_min_by_key(processes, |p| p.burst)
        })
    }

    fn policy(&self) -> Policy {
        Policy::Sjf
    }
}
