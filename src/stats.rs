//! Utilisation statistics over job traces
//!
//! All computations treat a job's execution interval as `[start, start+run)`
//! and charge a window only for the portion of the interval that intersects
//! it.

use std::fmt;

use crate::job::Job;
use crate::workload::Workload;

/// Utilisation of `[lo, hi)`: consumed resource-seconds over available ones.
///
/// Partial overlaps contribute proportionally. Returns 0 when the window or
/// the capacity is degenerate.
pub fn utilisation_in(jobs: &[Job], lo: f64, hi: f64, capacity: u32) -> f64 {
    let length = hi - lo;
    if length <= 0.0 || capacity == 0 {
        return 0.0;
    }
    let busy: f64 = jobs
        .iter()
        .map(|job| f64::from(job.res) * job.overlap(lo, hi))
        .sum();
    busy / (length * f64::from(capacity))
}

/// Maximum number of resources in concurrent use at any instant.
pub fn peak_usage(jobs: &[Job]) -> u32 {
    let mut running = 0i64;
    let mut peak = 0i64;
    for (_, delta) in usage_events(jobs) {
        running += delta;
        peak = peak.max(running);
    }
    peak.max(0) as u32
}

/// Step-function points `(time, busy resources)` of concurrent usage,
/// ordered by time. Each point is the usage from that instant until the next
/// point.
pub fn usage_series(jobs: &[Job]) -> Vec<(f64, u32)> {
    let mut running = 0i64;
    let mut series: Vec<(f64, u32)> = Vec::new();
    for (t, delta) in usage_events(jobs) {
        running += delta;
        let busy = running.max(0) as u32;
        match series.last_mut() {
            Some(last) if last.0 == t => last.1 = busy,
            _ => series.push((t, busy)),
        }
    }
    series
}

/// Sorted start/finish events. A job releasing its resources at `t` sorts
/// before another acquiring at `t`, so back-to-back jobs never count as
/// concurrent.
fn usage_events(jobs: &[Job]) -> Vec<(f64, i64)> {
    let mut events: Vec<(f64, i64)> = Vec::with_capacity(jobs.len() * 2);
    for job in jobs {
        if job.run_time > 0.0 && job.res > 0 {
            events.push((job.start(), i64::from(job.res)));
            events.push((job.finish(), -i64::from(job.res)));
        }
    }
    events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    events
}

/// Aggregate figures for a whole trace, printed by `ventana info`.
#[derive(Debug, Clone)]
pub struct Summary {
    pub jobs: usize,
    pub span_start: f64,
    pub span_end: f64,
    pub capacity: u32,
    pub peak_usage: u32,
    pub core_seconds: f64,
    pub mean_utilisation: f64,
}

impl Summary {
    pub fn compute(workload: &Workload, capacity: u32) -> Self {
        let (span_start, span_end) = workload.span().unwrap_or((0.0, 0.0));
        let jobs = workload.jobs();
        let core_seconds: f64 = jobs
            .iter()
            .map(|job| f64::from(job.res) * job.run_time)
            .sum();
        Self {
            jobs: jobs.len(),
            span_start,
            span_end,
            capacity,
            peak_usage: peak_usage(jobs),
            core_seconds,
            mean_utilisation: utilisation_in(jobs, span_start, span_end, capacity),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "jobs:             {}", self.jobs)?;
        writeln!(
            f,
            "span:             {:.0}s .. {:.0}s ({:.2}h)",
            self.span_start,
            self.span_end,
            (self.span_end - self.span_start) / 3600.0
        )?;
        writeln!(f, "capacity:         {}", self.capacity)?;
        writeln!(f, "peak usage:       {}", self.peak_usage)?;
        writeln!(f, "core-seconds:     {:.0}", self.core_seconds)?;
        write!(f, "mean utilisation: {:.4}", self.mean_utilisation)
    }
}
