//! Round-Robin with a fixed time quantum
//!
//! A process enters the ready queue once, the first time the clock reaches
//! its arrival; leaving `NotArrived` is the "already enqueued" marker. After
//! each slice, processes that arrived during it are queued before the process
//! that just ran.

use std::collections::VecDeque;

use cpusched_core::{Policy, ProcessState, Result, SchedError, Ticks};
use tracing::debug;

use super::{RunState, SchedulingPolicy};

#[derive(Debug, Clone, Copy)]
pub struct RoundRobinPolicy {
    quantum: Ticks,
}

impl RoundRobinPolicy {
    pub fn new(quantum: Ticks) -> Result<Self> {
        if quantum < 1 {
            return Err(SchedError::config("round-robin quantum must be at least 1"));
        }
        Ok(Self { quantum })
    }
}

impl SchedulingPolicy for RoundRobinPolicy {
    fn schedule(&self, state: &mut RunState) -> Result<()> {
        let order = state.process_set().arrival_order();
        let mut queue: VecDeque<usize> = VecDeque::with_capacity(order.len());

        while !state.all_done() {
            state.step()?;

            if queue.is_empty() {
                let next = order
                    .iter()
                    .copied()
                    .find(|&i| state.process(i).state() == ProcessState::NotArrived)
                    .ok_or_else(|| {
                        SchedError::invariant(format!(
                            "ready queue empty at {} with nothing left to arrive",
                            state.clock()
                        ))
                    })?;
                state.idle_until(state.process(next).arrival)?;
                state.process_mut(next).admit();
                queue.push_back(next);
            }

            let Some(index) = queue.pop_front() else {
                return Err(SchedError::invariant("ready queue unexpectedly empty"));
            };

            let slice = {
                let process = state.process_mut(index);
                process.dispatch();
                process.remaining().min(self.quantum)
            };
            debug!(
                process = %state.process(index).id,
                clock = state.clock(),
                slice,
                queued = queue.len(),
                "dispatch"
            );
            state.run(index, slice)?;

            let clock = state.clock();
            for &i in &order {
                let process = state.process(i);
                if i != index && process.state() == ProcessState::NotArrived && process.has_arrived(clock) {
                    state.process_mut(i).admit();
                    queue.push_back(i);
                }
            }

            if state.process(index).remaining() > 0 {
                state.process_mut(index).preempt();
                queue.push_back(index);
            } else {
                state.finish(index)?;
            }
        }
        Ok(())
    }

    fn policy(&self) -> Policy {
        Policy::RoundRobin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::*;

    fn rr(quantum: Ticks) -> RoundRobinPolicy {
        RoundRobinPolicy::new(quantum).unwrap()
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let err = RoundRobinPolicy::new(0).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_new_arrivals_queue_before_just_run_process() {
        let (segments, set) = run(&rr(2), &[(0, 5, 1), (2, 3, 2), (4, 1, 3)]);

        // At t=4 P3 arrives as P2's slice ends: queue becomes [P1, P3, P2],
        // so P3 runs before P2's final unit.
        assert_eq!(
            segments,
            vec![
                seg(1, 0, 2),
                seg(2, 2, 4),
                seg(1, 4, 6),
                seg(3, 6, 7),
                seg(2, 7, 8),
                seg(1, 8, 9),
            ]
        );
        assert_eq!(completions(&set), vec![9, 8, 7]);
        assert_eq!(waitings(&set), vec![4, 3, 2]);
    }

    #[test]
    fn test_arrivals_during_slice_queue_in_arrival_order() {
        // P3 arrives at 1 and P2 at 3, both during P1's first slice;
        // P3 is queued first despite its larger id.
        let (segments, set) = run(&rr(4), &[(0, 6, 1), (3, 1, 1), (1, 1, 1)]);

        assert_eq!(
            segments,
            vec![seg(1, 0, 4), seg(3, 4, 5), seg(2, 5, 6), seg(1, 6, 8)]
        );
        assert_eq!(completions(&set), vec![8, 6, 5]);
    }

    #[test]
    fn test_lone_process_slices_coalesce() {
        let (segments, set) = run(&rr(2), &[(0, 5, 1)]);
        assert_eq!(segments, vec![seg(1, 0, 5)]);
        assert_eq!(completions(&set), vec![5]);
    }

    #[test]
    fn test_idle_gap_when_queue_drains() {
        let (segments, set) = run(&rr(2), &[(0, 2, 1), (5, 3, 1)]);
        assert_eq!(segments, vec![seg(1, 0, 2), idle(2, 5), seg(2, 5, 8)]);
        assert_eq!(completions(&set), vec![2, 8]);
    }

    #[test]
    fn test_leading_idle_and_arrival_order() {
        // P2 arrives first despite its larger id
        let (segments, _) = run(&rr(3), &[(4, 2, 1), (1, 4, 1)]);
        assert_eq!(segments, vec![idle(0, 1), seg(2, 1, 4), seg(1, 4, 6), seg(2, 6, 7)]);
    }

    #[test]
    fn test_quantum_larger_than_bursts_matches_fcfs() {
        let (segments, _) = run(&rr(10), &[(0, 5, 1), (2, 3, 2), (4, 1, 3)]);
        assert_eq!(segments, vec![seg(1, 0, 5), seg(2, 5, 8), seg(3, 8, 9)]);
    }

    #[test]
    fn test_quantum_one_interleaves() {
        let (segments, set) = run(&rr(1), &[(0, 2, 1), (0, 2, 1)]);
        assert_eq!(
            segments,
            vec![seg(1, 0, 1), seg(2, 1, 2), seg(1, 2, 3), seg(2, 3, 4)]
        );
        assert_eq!(completions(&set), vec![3, 4]);
    }
}
