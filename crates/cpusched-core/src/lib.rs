//! cpusched Core - Shared types for the scheduling simulator
//!
//! This crate defines the data model used across:
//! - cpusched-simulation-engine (policies, timeline, statistics)
//! - cpusched-sim (CLI caller)
//!
//! Key types:
//! - ProcessSet and Process (validated input plus per-run state)
//! - Segment and Subject (execution schedule entries)
//! - Policy and PriorityDirection (selectors)
//! - Error types

pub mod types;
pub mod process_set;
pub mod error;

pub use types::*;
pub use process_set::*;
pub use error::*;
