//! Execution timeline with segment coalescing
//!
//! Segments are appended in time order and must tile `[0, end)` without
//! gaps or overlaps. Appending a segment for the same subject directly
//! after the previous one extends that segment instead.

use cpusched_core::{ProcessId, Result, SchedError, Segment, Subject, Ticks};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `[start, end)` for `subject`, coalescing with the previous segment.
    ///
    /// Fails with an invariant violation if the interval is empty or does not
    /// start exactly where the timeline currently ends.
    pub fn emit(&mut self, subject: Subject, start: Ticks, end: Ticks) -> Result<()> {
        if start >= end {
            return Err(SchedError::invariant(format!(
                "empty segment for {subject}: [{start}, {end})"
            )));
        }

        let expected_start = self.end();
        if start != expected_start {
            return Err(SchedError::invariant(format!(
                "segment for {subject} starts at {start}, timeline ends at {expected_start}"
            )));
        }

        match self.segments.last_mut() {
            Some(last) if last.subject == subject => last.end = end,
            _ => self.segments.push(Segment::new(subject, start, end)),
        }
        Ok(())
    }

    /// Current end of the schedule (0 when empty)
    pub fn end(&self) -> Ticks {
        self.segments.last().map(|s| s.end).unwrap_or(0)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

/// Check that `segments` start at 0 and are non-empty and contiguous
pub fn verify_contiguous(segments: &[Segment]) -> Result<()> {
    let mut cursor = 0;
    for segment in segments {
        if segment.start != cursor {
            return Err(SchedError::invariant(format!(
                "segment for {} starts at {}, expected {cursor}",
                segment.subject, segment.start
            )));
        }
        if segment.start >= segment.end {
            return Err(SchedError::invariant(format!(
                "empty segment for {}: [{}, {})",
                segment.subject, segment.start, segment.end
            )));
        }
        cursor = segment.end;
    }
    Ok(())
}

/// Total time `id` occupied the processor
pub fn busy_time(segments: &[Segment], id: ProcessId) -> Ticks {
    segments
        .iter()
        .filter(|s| s.subject == Subject::Process(id))
        .map(Segment::duration)
        .sum()
}
