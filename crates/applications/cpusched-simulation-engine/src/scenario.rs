//! JSON scenario files
//!
//! A scenario bundles process definitions with optional run settings:
//!
//! ```json
//! { "policy": "RR", "quantum": 2, "priority_direction": "LowerIsHigher",
//!   "processes": [ {"arrival": 0, "burst": 5, "priority": 1} ] }
//! ```

use std::fs;
use std::path::Path;

use cpusched_core::{Policy, PriorityDirection, ProcessSet, ProcessSpec, Result, Ticks};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::SimulationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<Ticks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_direction: Option<PriorityDirection>,
    pub processes: Vec<ProcessSpec>,
}

impl Scenario {
    pub fn new(processes: Vec<ProcessSpec>) -> Self {
        Self {
            policy: None,
            quantum: None,
            priority_direction: None,
            processes,
        }
    }

    /// Read and parse a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let scenario = Self::from_json_str(&text)?;
        debug!(
            path = %path.display(),
            processes = scenario.processes.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the definitions into a process set
    pub fn process_set(&self) -> Result<ProcessSet> {
        ProcessSet::from_specs(&self.processes)
    }

    /// Run settings named by the scenario, FCFS when no policy is given.
    /// The result is not validated here.
    pub fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::new(self.policy.unwrap_or(Policy::Fcfs));
        config.quantum = self.quantum;
        if let Some(direction) = self.priority_direction {
            config.priority_direction = direction;
        }
        config
    }
}

impl From<&ProcessSet> for Scenario {
    fn from(set: &ProcessSet) -> Self {
        Self::new(set.specs())
    }
}
