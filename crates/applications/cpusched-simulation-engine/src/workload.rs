//! Synthetic workload generation
//!
//! Arrivals follow a Poisson process: inter-arrival gaps are exponential with
//! a configurable mean and are accumulated then floored to whole time units.
//! Bursts and priorities are uniform over inclusive ranges. The first process
//! always arrives at 0. The same seed always yields the same workload.

use std::ops::RangeInclusive;

use cpusched_core::{ProcessSet, ProcessSpec, Result, SchedError};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand_distr::Exp;
use tracing::debug;

/// Seeded generator of process definitions
pub struct WorkloadGenerator {
    rng: StdRng,
    mean_interarrival: f64,
    burst: RangeInclusive<i64>,
    priority: RangeInclusive<i64>,
}

impl WorkloadGenerator {
    pub const DEFAULT_MEAN_INTERARRIVAL: f64 = 2.0;
    pub const DEFAULT_BURST: RangeInclusive<i64> = 1..=10;
    pub const DEFAULT_PRIORITY: RangeInclusive<i64> = 1..=5;

    pub fn new(seed: u64) -> Self {
        WorkloadGenerator {
            rng: StdRng::seed_from_u64(seed),
            mean_interarrival: Self::DEFAULT_MEAN_INTERARRIVAL,
            burst: Self::DEFAULT_BURST,
            priority: Self::DEFAULT_PRIORITY,
        }
    }

    /// Mean gap between consecutive arrivals, in time units
    pub fn with_mean_interarrival(mut self, mean: f64) -> Self {
        self.mean_interarrival = mean;
        self
    }

    pub fn with_burst_range(mut self, burst: RangeInclusive<i64>) -> Self {
        self.burst = burst;
        self
    }

    pub fn with_priority_range(mut self, priority: RangeInclusive<i64>) -> Self {
        self.priority = priority;
        self
    }

    /// Generate `count` process definitions
    pub fn generate(&mut self, count: usize) -> Result<Vec<ProcessSpec>> {
        if count == 0 {
            return Err(SchedError::config("workload must contain at least one process"));
        }
        if !(self.mean_interarrival.is_finite() && self.mean_interarrival > 0.0) {
            return Err(SchedError::config(format!(
                "mean inter-arrival time must be positive, got {}",
                self.mean_interarrival
            )));
        }
        let bursts = uniform("burst", &self.burst)?;
        let priorities = uniform("priority", &self.priority)?;
        let gaps = Exp::new(1.0 / self.mean_interarrival)
            .map_err(|e| SchedError::config(format!("invalid inter-arrival distribution: {e}")))?;

        let mut clock = 0.0_f64;
        let specs: Vec<ProcessSpec> = (0..count)
            .map(|i| {
                if i > 0 {
                    clock += gaps.sample(&mut self.rng);
                }
                ProcessSpec::new(
                    clock.floor() as i64,
                    bursts.sample(&mut self.rng),
                    priorities.sample(&mut self.rng),
                )
            })
            .collect();

        debug!(
            count,
            last_arrival = specs.last().map(|s| s.arrival),
            "generated workload"
        );
        Ok(specs)
    }

    /// Generate and validate a process set
    pub fn generate_set(&mut self, count: usize) -> Result<ProcessSet> {
        ProcessSet::from_specs(&self.generate(count)?)
    }
}

fn uniform(name: &str, range: &RangeInclusive<i64>) -> Result<Uniform<i64>> {
    let (low, high) = (*range.start(), *range.end());
    if low < 1 || low > high {
        return Err(SchedError::config(format!(
            "{name} range must satisfy 1 <= min <= max, got {low}..={high}"
        )));
    }
    Ok(Uniform::new_inclusive(low, high))
}
