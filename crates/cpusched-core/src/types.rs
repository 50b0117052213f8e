//! Core types shared by the simulation engine and its callers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SchedError};

/// Simulation time, in abstract time units
pub type Ticks = u64;

/// Identifier of a process: its 1-based position in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Caller-supplied process definition
///
/// Fields are signed so that out-of-range input reaches validation
/// and is reported as a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub arrival: i64,
    pub burst: i64,
    pub priority: i64,
}

impl ProcessSpec {
    pub fn new(arrival: i64, burst: i64, priority: i64) -> Self {
        Self {
            arrival,
            burst,
            priority,
        }
    }
}

impl From<(i64, i64, i64)> for ProcessSpec {
    fn from((arrival, burst, priority): (i64, i64, i64)) -> Self {
        Self::new(arrival, burst, priority)
    }
}

/// Parses `AT,BT,PRIO` (priority optional, defaults to 1)
impl FromStr for ProcessSpec {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(SchedError::config(format!(
                "expected 'arrival,burst[,priority]', got '{s}'"
            )));
        }

        let parse = |name: &str, raw: &str| {
            raw.parse::<i64>()
                .map_err(|_| SchedError::config(format!("invalid {name} '{raw}' in '{s}'")))
        };

        let arrival = parse("arrival", fields[0])?;
        let burst = parse("burst", fields[1])?;
        let priority = match fields.get(2) {
            Some(raw) => parse("priority", raw)?,
            None => 1,
        };

        Ok(Self::new(arrival, burst, priority))
    }
}

/// Lifecycle of a process within one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessState {
    #[default]
    NotArrived,
    Ready,
    Running,
    Done,
}

/// Figures recorded when a process finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMetrics {
    pub completion: Ticks,
    pub turnaround: Ticks,
    pub waiting: Ticks,
}

/// A validated process plus its per-run mutable state.
///
/// Run state only changes through `admit`, `dispatch`, `preempt`, `execute`
/// and `complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: u32,
    remaining: Ticks,
    state: ProcessState,
    metrics: Option<CompletionMetrics>,
}

impl Process {
    /// Build a fresh process. Callers go through `ProcessSet`, which validates.
    pub(crate) fn new(id: ProcessId, arrival: Ticks, burst: Ticks, priority: u32) -> Self {
        Self {
            id,
            arrival,
            burst,
            priority,
            remaining: burst,
            state: ProcessState::NotArrived,
            metrics: None,
        }
    }

    pub fn spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.arrival as i64, self.burst as i64, i64::from(self.priority))
    }

    pub fn remaining(&self) -> Ticks {
        self.remaining
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Set once the process completes
    pub fn metrics(&self) -> Option<CompletionMetrics> {
        self.metrics
    }

    pub fn has_arrived(&self, clock: Ticks) -> bool {
        self.arrival <= clock
    }

    pub fn is_done(&self) -> bool {
        self.state == ProcessState::Done
    }

    /// Ready or running: eligible for selection
    pub fn is_runnable(&self) -> bool {
        matches!(self.state, ProcessState::Ready | ProcessState::Running)
    }

    pub fn completion(&self) -> Option<Ticks> {
        self.metrics.map(|m| m.completion)
    }

    pub fn turnaround(&self) -> Option<Ticks> {
        self.metrics.map(|m| m.turnaround)
    }

    pub fn waiting(&self) -> Option<Ticks> {
        self.metrics.map(|m| m.waiting)
    }

    /// NotArrived -> Ready
    pub fn admit(&mut self) {
        debug_assert_eq!(
            self.state,
            ProcessState::NotArrived,
            "{} admitted twice",
            self.id
        );
        self.state = ProcessState::Ready;
    }

    /// Ready -> Running
    pub fn dispatch(&mut self) {
        debug_assert_eq!(
            self.state,
            ProcessState::Ready,
            "{} must be Ready before dispatch",
            self.id
        );
        self.state = ProcessState::Running;
    }

    /// Running -> Ready, with work left
    pub fn preempt(&mut self) {
        debug_assert!(
            self.state == ProcessState::Running && self.remaining > 0,
            "{} preempted while not running or already finished",
            self.id
        );
        self.state = ProcessState::Ready;
    }

    /// Consume `units` of CPU time. The process must be running.
    pub fn execute(&mut self, units: Ticks) -> Result<()> {
        if self.state != ProcessState::Running {
            return Err(SchedError::invariant(format!(
                "{} executed while {:?}",
                self.id, self.state
            )));
        }
        if units == 0 || units > self.remaining {
            return Err(SchedError::invariant(format!(
                "{} asked to run {units} units with {} remaining",
                self.id, self.remaining
            )));
        }
        self.remaining -= units;
        Ok(())
    }

    /// Running -> Done at `clock`; records completion, turnaround and waiting.
    pub fn complete(&mut self, clock: Ticks) -> Result<CompletionMetrics> {
        if self.state != ProcessState::Running || self.remaining != 0 {
            return Err(SchedError::invariant(format!(
                "{} completed while {:?} with {} remaining",
                self.id, self.state, self.remaining
            )));
        }

        let turnaround = clock.checked_sub(self.arrival).ok_or_else(|| {
            SchedError::invariant(format!(
                "{} completed at {clock} before arriving at {}",
                self.id, self.arrival
            ))
        })?;
        let waiting = turnaround.checked_sub(self.burst).ok_or_else(|| {
            SchedError::invariant(format!(
                "{} has negative waiting time (turnaround {turnaround}, burst {})",
                self.id, self.burst
            ))
        })?;

        let metrics = CompletionMetrics {
            completion: clock,
            turnaround,
            waiting,
        };
        self.state = ProcessState::Done;
        self.metrics = Some(metrics);
        Ok(metrics)
    }
}

/// Occupant of the processor during a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Idle,
    Process(ProcessId),
}

impl Subject {
    pub fn is_idle(&self) -> bool {
        matches!(self, Subject::Idle)
    }

    pub fn process(&self) -> Option<ProcessId> {
        match self {
            Subject::Idle => None,
            Subject::Process(id) => Some(*id),
        }
    }
}

impl From<ProcessId> for Subject {
    fn from(id: ProcessId) -> Self {
        Subject::Process(id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Idle => write!(f, "Idle"),
            Subject::Process(id) => write!(f, "{id}"),
        }
    }
}

const IDLE_MARKER: &str = "idle";

// On the wire a subject is either the process id number or the string "idle".
impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Subject::Idle => serializer.serialize_str(IDLE_MARKER),
            Subject::Process(id) => serializer.serialize_u32(id.0),
        }
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(u32),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(Subject::Process(ProcessId(id))),
            Raw::Marker(m) if m.eq_ignore_ascii_case(IDLE_MARKER) => Ok(Subject::Idle),
            Raw::Marker(m) => Err(serde::de::Error::custom(format!(
                "expected process id or \"idle\", got \"{m}\""
            ))),
        }
    }
}

/// One contiguous interval `[start, end)` of processor occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub subject: Subject,
    pub start: Ticks,
    pub end: Ticks,
}

impl Segment {
    pub fn new(subject: Subject, start: Ticks, end: Ticks) -> Self {
        Self {
            subject,
            start,
            end,
        }
    }

    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

/// Scheduling policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    #[serde(rename = "FCFS")]
    Fcfs,
    #[serde(rename = "SJF")]
    Sjf,
    #[serde(rename = "SJF_PRE")]
    SjfPreemptive,
    #[serde(rename = "PRIORITY")]
    Priority,
    #[serde(rename = "RR")]
    RoundRobin,
}

impl Policy {
    pub const ALL: [Policy; 5] = [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::SjfPreemptive,
        Policy::Priority,
        Policy::RoundRobin,
    ];

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::SjfPreemptive => "SJF_PRE",
            Policy::Priority => "PRIORITY",
            Policy::RoundRobin => "RR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Policy::Fcfs => "First-Come-First-Served",
            Policy::Sjf => "Shortest-Job-First (non-preemptive)",
            Policy::SjfPreemptive => "Shortest-Remaining-Time-First (preemptive)",
            Policy::Priority => "Priority (non-preemptive)",
            Policy::RoundRobin => "Round-Robin",
        }
    }

    pub fn is_preemptive(&self) -> bool {
        matches!(self, Policy::SjfPreemptive | Policy::RoundRobin)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FCFS" => Ok(Policy::Fcfs),
            "SJF" => Ok(Policy::Sjf),
            "SJF_PRE" | "SRTF" => Ok(Policy::SjfPreemptive),
            "PRIORITY" => Ok(Policy::Priority),
            "RR" => Ok(Policy::RoundRobin),
            _ => Err(SchedError::config(format!(
                "unrecognized scheduling policy '{s}' (expected FCFS, SJF, SJF_PRE, PRIORITY or RR)"
            ))),
        }
    }
}

/// How a priority number maps to urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriorityDirection {
    /// Smaller number wins
    #[default]
    LowerIsHigher,
    /// Larger number wins
    HigherIsHigher,
}

impl PriorityDirection {
    /// True when `candidate` strictly beats `best`
    pub fn prefers(&self, candidate: u32, best: u32) -> bool {
        match self {
            PriorityDirection::LowerIsHigher => candidate < best,
            PriorityDirection::HigherIsHigher => candidate > best,
        }
    }
}

impl fmt::Display for PriorityDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityDirection::LowerIsHigher => write!(f, "lower number = higher priority"),
            PriorityDirection::HigherIsHigher => write!(f, "higher number = higher priority"),
        }
    }
}

impl FromStr for PriorityDirection {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "lower" | "low" | "lowerishigher" | "lower-is-higher" => {
                Ok(PriorityDirection::LowerIsHigher)
            }
            "1" | "higher" | "high" | "higherishigher" | "higher-is-higher" => {
                Ok(PriorityDirection::HigherIsHigher)
            }
            _ => Err(SchedError::config(format!(
                "unrecognized priority direction '{s}' (expected 'lower' or 'higher')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_lifecycle() {
        let mut p = Process::new(ProcessId(1), 2, 3, 1);
        assert_eq!(p.state(), ProcessState::NotArrived);
        assert_eq!(p.remaining(), 3);
        assert_eq!(p.metrics(), None);
        assert!(!p.has_arrived(1));
        assert!(p.has_arrived(2));

        p.admit();
        p.dispatch();
        p.execute(2).unwrap();
        assert_eq!(p.remaining(), 1);
        p.preempt();
        assert_eq!(p.state(), ProcessState::Ready);
        assert!(p.is_runnable());

        p.dispatch();
        p.execute(1).unwrap();
        let metrics = p.complete(7).unwrap();

        assert!(p.is_done());
        assert_eq!(metrics.completion, 7);
        assert_eq!(metrics.turnaround, 5);
        assert_eq!(metrics.waiting, 2);
        assert_eq!(p.waiting(), Some(2));
        assert_eq!(p.metrics(), Some(metrics));
        assert_eq!(p.state(), ProcessState::Done);
    }

    #[test]
    fn test_execute_rejects_overrun_and_idle_process() {
        let mut p = Process::new(ProcessId(1), 0, 2, 1);
        assert!(p.execute(1).unwrap_err().is_invariant_violation());

        p.admit();
        p.dispatch();
        assert!(p.execute(3).unwrap_err().is_invariant_violation());
        assert_eq!(p.remaining, 2, "failed execute must not consume work");
    }

    #[test]
    fn test_complete_detects_negative_waiting() {
        let mut p = Process::new(ProcessId(4), 5, 3, 1);
        p.admit();
        p.dispatch();
        p.execute(3).unwrap();

        // Finishing at 6 would mean 3 units ran in a 1-unit window
        let err = p.complete(6).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("negative waiting"));
    }

    #[test]
    fn test_complete_requires_zero_remaining() {
        let mut p = Process::new(ProcessId(1), 0, 2, 1);
        p.admit();
        p.dispatch();
        p.execute(1).unwrap();
        assert!(p.complete(1).is_err());
        assert!(!p.is_done());
    }

    #[test]
    fn test_spec_parsing() {
        assert_eq!("0,5,1".parse::<ProcessSpec>().unwrap(), ProcessSpec::new(0, 5, 1));
        assert_eq!(" 4 , 1 ".parse::<ProcessSpec>().unwrap(), ProcessSpec::new(4, 1, 1));
        assert_eq!("-1,2,3".parse::<ProcessSpec>().unwrap(), ProcessSpec::new(-1, 2, 3));
        assert!("5".parse::<ProcessSpec>().unwrap_err().is_config());
        assert!("a,b,c".parse::<ProcessSpec>().unwrap_err().is_config());
        assert!("1,2,3,4".parse::<ProcessSpec>().is_err());
    }

    #[test]
    fn test_policy_identifiers() {
        for policy in Policy::ALL {
            assert_eq!(policy.as_str().parse::<Policy>().unwrap(), policy);
        }
        assert_eq!("sjf_pre".parse::<Policy>().unwrap(), Policy::SjfPreemptive);
        assert_eq!("srtf".parse::<Policy>().unwrap(), Policy::SjfPreemptive);
        assert_eq!(" rr ".parse::<Policy>().unwrap(), Policy::RoundRobin);

        let err = "LOTTERY".parse::<Policy>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("LOTTERY"));

        assert!(Policy::RoundRobin.is_preemptive());
        assert!(!Policy::Priority.is_preemptive());
    }

    #[test]
    fn test_policy_serde_uses_wire_identifiers() {
        let json = serde_json::to_string(&Policy::SjfPreemptive).unwrap();
        assert_eq!(json, "\"SJF_PRE\"");
        let policy: Policy = serde_json::from_str("\"RR\"").unwrap();
        assert_eq!(policy, Policy::RoundRobin);
    }

    #[test]
    fn test_priority_direction() {
        assert_eq!(PriorityDirection::default(), PriorityDirection::LowerIsHigher);
        assert_eq!("0".parse::<PriorityDirection>().unwrap(), PriorityDirection::LowerIsHigher);
        assert_eq!("higher".parse::<PriorityDirection>().unwrap(), PriorityDirection::HigherIsHigher);
        assert!("sideways".parse::<PriorityDirection>().is_err());

        assert!(PriorityDirection::LowerIsHigher.prefers(1, 2));
        assert!(!PriorityDirection::LowerIsHigher.prefers(2, 2));
        assert!(PriorityDirection::HigherIsHigher.prefers(3, 2));
    }

    #[test]
    fn test_subject_serialization() {
        let segment = Segment::new(Subject::Idle, 0, 3);
        assert_eq!(
            serde_json::to_string(&segment).unwrap(),
            r#"{"subject":"idle","start":0,"end":3}"#
        );

        let segment = Segment::new(Subject::Process(ProcessId(2)), 3, 5);
        let json = serde_json::to_string(&segment).unwrap();
        assert_eq!(json, r#"{"subject":2,"start":3,"end":5}"#);

        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
        assert_eq!(back.duration(), 2);

        assert!(serde_json::from_str::<Subject>("\"busy\"").is_err());
    }
}
