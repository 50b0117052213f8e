//! cpusched Simulation Engine
//!
//! Discrete-time simulator for single-processor CPU scheduling policies.

pub mod types;
pub mod timeline;
pub mod policies;
pub mod simulator;
pub mod stats;
pub mod scenario;
pub mod workload;
pub mod report;

pub use report::SimulationReport;
pub use scenario::Scenario;
pub use simulator::{Simulator, compare_policies, simulate};
pub use stats::{Summary, aggregate};
pub use types::{IdleStrategy, RunResult, SimulationConfig};
pub use workload::WorkloadGenerator;
