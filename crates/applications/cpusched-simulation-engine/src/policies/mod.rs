//! Scheduling policies
//!
//! Implements the five policies the simulator can run:
//! - FCFS: arrival order, run to completion
//! - SJF: shortest burst among arrived processes, run to completion
//! - SJF_PRE: shortest remaining time, re-evaluated every time unit
//! - PRIORITY: best priority among arrived processes, run to completion
//! - RR: FIFO ready queue with a fixed time quantum
//!
//! Every policy drives a `RunState`, which owns the clock, the process set
//! and the timeline, and is the only place time is allowed to advance.

pub mod fcfs;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

pub use fcfs::FcfsPolicy;
pub use priority::PriorityPolicy;
pub use round_robin::RoundRobinPolicy;
pub use sjf::SjfPolicy;
pub use srtf::SrtfPolicy;

use cpusched_core::{
    Policy, Process, ProcessSet, ProcessState, Result, SchedError, Segment, Subject, Ticks,
};
use tracing::{debug, trace};

use crate::timeline::Timeline;
use crate::types::{IdleStrategy, SimulationConfig};

/// Scheduling policy trait
pub trait SchedulingPolicy {
    /// Drive `state` until every process is done
    fn schedule(&self, state: &mut RunState) -> Result<()>;

    /// Which selector this policy implements
    fn policy(&self) -> Policy;

    /// Get policy name
    fn name(&self) -> &str {
        self.policy().description()
    }
}

/// Build the policy a validated config asks for
pub fn policy_for(config: &SimulationConfig) -> Result<Box<dyn SchedulingPolicy>> {
    config.validate()?;

    let policy: Box<dyn SchedulingPolicy> = match config.policy {
        Policy::Fcfs => Box::new(FcfsPolicy),
        Policy::Sjf => Box::new(SjfPolicy::new(config.idle_strategy)),
        Policy::SjfPreemptive => Box::new(SrtfPolicy),
        Policy::Priority => Box::new(PriorityPolicy::new(
            config.priority_direction,
            config.idle_strategy,
        )),
        Policy::RoundRobin => {
            let quantum = config
                .quantum
                .ok_or_else(|| SchedError::config("round-robin requires a time quantum"))?;
            Box::new(RoundRobinPolicy::new(quantum)?)
        }
    };
    Ok(policy)
}

/// Mutable state of one simulation run
#[derive(Debug)]
pub struct RunState {
    processes: ProcessSet,
    timeline: Timeline,
    clock: Ticks,
    steps: u64,
    step_limit: u64,
}

impl RunState {
    pub fn new(processes: ProcessSet) -> Self {
        // Every loop iteration advances the clock by at least one unit, and
        // no schedule can outlast the last arrival plus all the work.
        // Constructed sets are checked to fit, so the fallback is unreachable.
        let step_limit = processes.schedule_bound().unwrap_or(Ticks::MAX);
        Self {
            processes,
            timeline: Timeline::new(),
            clock: 0,
            steps: 0,
            step_limit,
        }
    }

    pub fn clock(&self) -> Ticks {
        self.clock
    }

    pub fn processes(&self) -> &[Process] {
        self.processes.as_slice()
    }

    pub fn process(&self, index: usize) -> &Process {
        &self.processes.as_slice()[index]
    }

    pub fn process_mut(&mut self, index: usize) -> &mut Process {
        &mut self.processes.as_mut_slice()[index]
    }

    pub fn process_set(&self) -> &ProcessSet {
        &self.processes
    }

    pub fn segments(&self) -> &[Segment] {
        self.timeline.segments()
    }

    pub fn all_done(&self) -> bool {
        self.processes.all_done()
    }

    /// Count one scheduling iteration against the termination bound
    pub fn step(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(SchedError::invariant(format!(
                "policy failed to terminate within {} steps (clock {})",
                self.step_limit, self.clock
            )));
        }
        Ok(())
    }

    /// Move every process that has arrived by now from NotArrived to Ready
    pub fn admit_arrivals(&mut self) {
        let clock = self.clock;
        for process in self.processes.as_mut_slice() {
            if process.state() == ProcessState::NotArrived && process.has_arrived(clock) {
                trace!(process = %process.id, clock, "arrived");
                process.admit();
            }
        }
    }

    /// Earliest arrival among processes that have not arrived yet
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.processes
            .iter()
            .filter(|p| p.state() == ProcessState::NotArrived)
            .map(|p| p.arrival)
            .min()
    }

    /// Leave the processor idle until `until`. No-op if `until` is not in the future.
    pub fn idle_until(&mut self, until: Ticks) -> Result<()> {
        if until <= self.clock {
            return Ok(());
        }
        trace!(from = self.clock, to = until, "idle");
        self.timeline.emit(Subject::Idle, self.clock, until)?;
        self.clock = until;
        Ok(())
    }

    /// Pass idle time while nothing is runnable, per `strategy`
    pub fn idle(&mut self, strategy: IdleStrategy) -> Result<()> {
        let until = match strategy {
            IdleStrategy::UnitStep => self.clock + 1,
            IdleStrategy::JumpToArrival => self.next_arrival().ok_or_else(|| {
                SchedError::invariant(format!(
                    "processor idle at {} with no pending arrivals",
                    self.clock
                ))
            })?,
        };
        self.idle_until(until)
    }

    /// Run the process at `index` for `units`. It must already be dispatched.
    pub fn run(&mut self, index: usize, units: Ticks) -> Result<()> {
        let start = self.clock;
        let process = &mut self.processes.as_mut_slice()[index];
        process.execute(units)?;
        let id = process.id;

        self.timeline.emit(Subject::Process(id), start, start + units)?;
        self.clock = start + units;
        Ok(())
    }

    /// Mark the process at `index` done at the current clock
    pub fn finish(&mut self, index: usize) -> Result<()> {
        let clock = self.clock;
        let process = &mut self.processes.as_mut_slice()[index];
        let metrics = process.complete(clock)?;
        debug!(
            process = %process.id,
            completion = metrics.completion,
            turnaround = metrics.turnaround,
            waiting = metrics.waiting,
            "process completed"
        );
        Ok(())
    }

    /// Dispatch `index` and run it until its burst is exhausted
    pub fn run_to_completion(&mut self, index: usize) -> Result<()> {
        let remaining = {
            let process = self.process_mut(index);
            process.dispatch();
            process.remaining()
        };
        debug!(process = %self.process(index).id, clock = self.clock, remaining, "dispatch");
        self.run(index, remaining)?;
        self.finish(index)
    }

    pub fn into_parts(self) -> (Vec<Segment>, ProcessSet) {
        (self.timeline.into_segments(), self.processes)
    }
}

/// Shared loop of the non-preemptive selectors (SJF, PRIORITY).
///
/// At each decision point admits arrivals, asks `select` for the index of a
/// Ready process and runs it to completion, or idles per `idle`.
pub(crate) fn run_non_preemptive<F>(
    state: &mut RunState,
    idle: IdleStrategy,
    select: F,
) -> Result<()>
where
    F: Fn(&[Process]) -> Option<usize>,
{
    while !state.all_done() {
        state.step()?;
        state.admit_arrivals();

        match select(state.processes()) {
            Some(index) => state.run_to_completion(index)?,
            None => state.idle(idle)?,
        }
    }
    Ok(())
}

/// Pick the Ready process minimizing `key`; ties go to the smallest id.
pub(crate) fn select_min_by_key<K, F>(processes: &[Process], key: F) -> Option<usize>
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    processes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.state() == ProcessState::Ready)
        .min_by_key(|(_, p)| (key(p), p.id))
        .map(|(index, _)| index)
}
