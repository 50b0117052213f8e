//! Core types for the simulation engine

use cpusched_core::{Policy, PriorityDirection, ProcessSet, Result, SchedError, Segment, Ticks};
use serde::{Deserialize, Serialize};

/// How non-preemptive policies pass time when nothing has arrived yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdleStrategy {
    /// Advance one unit at a time, re-evaluating after each unit
    #[default]
    UnitStep,
    /// Jump directly to the earliest pending arrival
    JumpToArrival,
}

/// Everything needed to run one policy over one process set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub policy: Policy,
    /// Round-robin time slice. Ignored by other policies.
    #[serde(default)]
    pub quantum: Option<Ticks>,
    #[serde(default)]
    pub priority_direction: PriorityDirection,
    #[serde(default)]
    pub idle_strategy: IdleStrategy,
}

impl SimulationConfig {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            quantum: None,
            priority_direction: PriorityDirection::default(),
            idle_strategy: IdleStrategy::default(),
        }
    }

    pub fn round_robin(quantum: Ticks) -> Self {
        Self::new(Policy::RoundRobin).with_quantum(quantum)
    }

    pub fn priority(direction: PriorityDirection) -> Self {
        Self::new(Policy::Priority).with_priority_direction(direction)
    }

    pub fn with_quantum(mut self, quantum: Ticks) -> Self {
        self.quantum = Some(quantum);
        self
    }

    pub fn with_priority_direction(mut self, direction: PriorityDirection) -> Self {
        self.priority_direction = direction;
        self
    }

    pub fn with_idle_strategy(mut self, idle_strategy: IdleStrategy) -> Self {
        self.idle_strategy = idle_strategy;
        self
    }

    /// Reject configurations that cannot be simulated
    pub fn validate(&self) -> Result<()> {
        if self.policy == Policy::RoundRobin {
            match self.quantum {
                None => {
                    return Err(SchedError::config("round-robin requires a time quantum"));
                }
                Some(0) => {
                    return Err(SchedError::config("round-robin quantum must be at least 1"));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Quantum that applies to this policy, if any
    pub fn effective_quantum(&self) -> Option<Ticks> {
        match self.policy {
            Policy::RoundRobin => self.quantum,
            _ => None,
        }
    }

    /// Direction that applies to this policy, if any
    pub fn effective_priority_direction(&self) -> Option<PriorityDirection> {
        match self.policy {
            Policy::Priority => Some(self.priority_direction),
            _ => None,
        }
    }
}

/// Outcome of one simulation: the schedule plus the finished process set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub policy: Policy,
    pub segments: Vec<Segment>,
    pub processes: ProcessSet,
}

impl RunResult {
    /// Schedule length: end of the last segment
    pub fn total_time(&self) -> Ticks {
        self.segments.last().map(|s| s.end).unwrap_or(0)
    }

    pub fn idle_time(&self) -> Ticks {
        self.segments
            .iter()
            .filter(|s| s.subject.is_idle())
            .map(Segment::duration)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_requires_positive_quantum() {
        let missing = SimulationConfig::new(Policy::RoundRobin);
        assert!(missing.validate().unwrap_err().is_config());

        let zero = SimulationConfig::round_robin(0);
        let err = zero.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("quantum"));

        assert!(SimulationConfig::round_robin(1).validate().is_ok());
    }

    #[test]
    fn test_quantum_ignored_outside_round_robin() {
        let config = SimulationConfig::new(Policy::Fcfs).with_quantum(0);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_quantum(), None);
        assert_eq!(config.effective_priority_direction(), None);

        let config = SimulationConfig::priority(PriorityDirection::HigherIsHigher);
        assert_eq!(
            config.effective_priority_direction(),
            Some(PriorityDirection::HigherIsHigher)
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"policy":"SJF"}"#).unwrap();
        assert_eq!(config, SimulationConfig::new(Policy::Sjf));

        let config: SimulationConfig =
            serde_json::from_str(r#"{"policy":"RR","quantum":3,"idle_strategy":"JumpToArrival"}"#)
                .unwrap();
        assert_eq!(config.quantum, Some(3));
        assert_eq!(config.idle_strategy, IdleStrategy::JumpToArrival);
    }
}
