//! Shortest-Remaining-Time-First (preemptive SJF)
//!
//! Re-evaluates the best candidate every time unit, since an arrival can
//! preempt the running process at any instant.

use cpusched_core::{Policy, ProcessState, Result};
use tracing::debug;

use super::{RunState, SchedulingPolicy};

#[derive(Debug, Clone, Copy, Default)]
pub struct SrtfPolicy;

impl SchedulingPolicy for SrtfPolicy {
    fn schedule(&self, state: &mut RunState) -> Result<()> {
        let mut current: Option<usize> = None;

        while !state.all_done() {
            state.step()?;
            state.admit_arrivals();

            let next = state
                .processes()
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_runnable())
                .min_by_key(|(_, p)| (p.remaining(), p.id))
                .map(|(index, _)| index);

            let Some(index) = next else {
                state.idle_until(state.clock() + 1)?;
                continue;
            };

            if current != Some(index) {
                if let Some(previous) = current {
                    debug!(
                        preempted = %state.process(previous).id,
                        by = %state.process(index).id,
                        clock = state.clock(),
                        "preemption"
                    );
                    state.process_mut(previous).preempt();
                }
                state.process_mut(index).dispatch();
                current = Some(index);
            }

            state.run(index, 1)?;

            if state.process(index).remaining() == 0 {
                state.finish(index)?;
                current = None;
            }
        }

        debug_assert!(
            state.processes().iter().all(|p| p.state() == ProcessState::Done),
            "SRTF loop exited with unfinished processes"
        );
        Ok(())
    }

    fn policy(&self) -> Policy {
        Policy::SjfPreemptive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::*;

    #[test]
    fn test_srtf_preempts_for_shorter_arrival() {
        let (segments, set) = run(&SrtfPolicy, &[(0, 8, 1), (1, 4, 1), (2, 9, 1), (3, 5, 1)]);

        assert_eq!(
            segments,
            vec![seg(1, 0, 1), seg(2, 1, 5), seg(4, 5, 10), seg(1, 10, 17), seg(3, 17, 26)]
        );
        assert_eq!(completions(&set), vec![17, 5, 26, 10]);
        assert_eq!(waitings(&set), vec![9, 0, 15, 2]);
    }

    #[test]
    fn test_srtf_remaining_tie_keeps_smallest_id() {
        // At t=2 P1 and P2 both have 3 left; P1 keeps running
        let (segments, set) = run(&SrtfPolicy, &[(0, 5, 1), (2, 3, 2), (4, 1, 3)]);

        assert_eq!(segments, vec![seg(1, 0, 5), seg(3, 5, 6), seg(2, 6, 9)]);
        assert_eq!(completions(&set), vec![5, 9, 6]);
    }

    #[test]
    fn test_srtf_single_late_process_idles_first() {
        let (segments, _) = run(&SrtfPolicy, &[(3, 2, 1)]);
        assert_eq!(segments, vec![idle(0, 3), seg(1, 3, 5)]);
    }

    #[test]
    fn test_srtf_resumes_preempted_process() {
        let (segments, set) = run(&SrtfPolicy, &[(0, 4, 1), (1, 1, 1), (7, 1, 1)]);

        assert_eq!(
            segments,
            vec![seg(1, 0, 1), seg(2, 1, 2), seg(1, 2, 5), idle(5, 7), seg(3, 7, 8)]
        );
        assert_eq!(completions(&set), vec![5, 2, 8]);
        assert!(set.iter().all(|p| p.remaining() == 0));
    }
}
