//! Validated process sets
//!
//! A `ProcessSet` is built once per run from caller definitions and then
//! consumed by exactly one simulation. Re-running needs a fresh set, which
//! `ProcessSet::fresh` rebuilds from the retained definitions.

use serde::Serialize;

use crate::error::{Result, SchedError};
use crate::types::{Process, ProcessId, ProcessSpec, Ticks};

/// Initial rows of the interactive tool: P1 (0,5,1), P2 (2,3,2), P3 (4,1,3)
pub const DEFAULT_PROCESSES: [(i64, i64, i64); 3] = [(0, 5, 1), (2, 3, 2), (4, 1, 3)];

/// Ordered, non-empty collection of processes. Index `i` holds id `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessSet {
    processes: Vec<Process>,
}

impl ProcessSet {
    /// Validate definitions and assign ids by position (1-based)
    pub fn from_specs(specs: &[ProcessSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(SchedError::config("process set is empty; at least one process is required"));
        }

        let processes = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| validate(index, spec))
            .collect::<Result<Vec<_>>>()?;

        let set = Self { processes };
        set.schedule_bound()?;
        Ok(set)
    }

    pub fn from_triples(triples: &[(i64, i64, i64)]) -> Result<Self> {
        let specs: Vec<ProcessSpec> = triples.iter().copied().map(ProcessSpec::from).collect();
        Self::from_specs(&specs)
    }

    pub fn default_set() -> Self {
        let processes = DEFAULT_PROCESSES
            .iter()
            .enumerate()
            .map(|(index, &(arrival, burst, priority))| {
                Process::new(
                    ProcessId(index as u32 + 1),
                    arrival as Ticks,
                    burst as Ticks,
                    priority as u32,
                )
            })
            .collect();
        Self { processes }
    }

    /// Original definitions, in id order
    pub fn specs(&self) -> Vec<ProcessSpec> {
        self.processes.iter().map(Process::spec).collect()
    }

    /// Same definitions with all per-run state reset
    pub fn fresh(&self) -> Self {
        let processes = self
            .processes
            .iter()
            .map(|p| Process::new(p.id, p.arrival, p.burst, p.priority))
            .collect();
        Self { processes }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Always false for a constructed set
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.processes.iter()
    }

    pub fn as_slice(&self) -> &[Process] {
        &self.processes
    }

    pub fn as_mut_slice(&mut self) -> &mut [Process] {
        &mut self.processes
    }

    pub fn get(&self, id: ProcessId) -> Option<&Process> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.processes.get(index)
    }

    /// Processes ordered by id ascending (display order)
    pub fn by_id(&self) -> Vec<&Process> {
        let mut sorted: Vec<&Process> = self.processes.iter().collect();
        sorted.sort_by_key(|p| p.id);
        sorted
    }

    /// Indices ordered by arrival, ties broken by id
    pub fn arrival_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.processes.len()).collect();
        order.sort_by_key(|&i| (self.processes[i].arrival, self.processes[i].id));
        order
    }

    /// Upper bound on scheduling steps: `sum(burst) + max(arrival) + 1`.
    ///
    /// Fails when the bound does not fit in `Ticks`, so no run over this set
    /// can overflow the clock.
    pub fn schedule_bound(&self) -> Result<Ticks> {
        self.processes
            .iter()
            .try_fold(0 as Ticks, |total, p| total.checked_add(p.burst))
            .and_then(|total| total.checked_add(self.max_arrival()))
            .and_then(|total| total.checked_add(1))
            .ok_or_else(|| {
                SchedError::config(
                    "total burst plus latest arrival exceeds the representable schedule length",
                )
            })
    }

    pub fn total_burst(&self) -> Ticks {
        self.processes.iter().map(|p| p.burst).sum()
    }

    pub fn max_arrival(&self) -> Ticks {
        self.processes.iter().map(|p| p.arrival).max().unwrap_or(0)
    }

    pub fn all_done(&self) -> bool {
        self.processes.iter().all(Process::is_done)
    }

    /// Latest completion time, if every process has finished
    pub fn max_completion(&self) -> Option<Ticks> {
        self.processes
            .iter()
            .map(Process::completion)
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .max()
    }
}

impl<'a> IntoIterator for &'a ProcessSet {
    type Item = &'a Process;
    type IntoIter = std::slice::Iter<'a, Process>;

    fn into_iter(self) -> Self::IntoIter {
        self.processes.iter()
    }
}

fn validate(index: usize, spec: &ProcessSpec) -> Result<Process> {
    let id = u32::try_from(index + 1)
        .map(ProcessId)
        .map_err(|_| SchedError::config("too many processes"))?;

    if spec.arrival < 0 {
        return Err(SchedError::config(format!(
            "{id}: arrival time must be >= 0, got {}",
            spec.arrival
        )));
    }
    if spec.burst < 1 {
        return Err(SchedError::config(format!(
            "{id}: burst time must be >= 1, got {}",
            spec.burst
        )));
    }
    if spec.priority < 1 {
        return Err(SchedError::config(format!(
            "{id}: priority must be >= 1, got {}",
            spec.priority
        )));
    }
    let priority = u32::try_from(spec.priority)
        .map_err(|_| SchedError::config(format!("{id}: priority {} out of range", spec.priority)))?;

    Ok(Process::new(id, spec.arrival as Ticks, spec.burst as Ticks, priority))
}
