//! Job record model shared by the trace parsers

/// A single job of a workload trace.
///
/// Times are in seconds in the trace's own epoch. `start_time` is `None`
/// when the trace carries no start information, in which case the job is
/// assumed to start at submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Job identifier (SWF job number or Batsim job_id)
    pub id: String,
    /// Submission time in seconds
    pub submit_time: f64,
    /// Start of execution in seconds, if the trace records it
    pub start_time: Option<f64>,
    /// Execution duration in seconds (>= 0)
    pub run_time: f64,
    /// Number of resources allocated to the job
    pub res: u32,
}

impl Job {
    /// Start of the execution interval
    pub fn start(&self) -> f64 {
        self.start_time.unwrap_or(self.submit_time)
    }

    /// End of the execution interval
    pub fn finish(&self) -> f64 {
        self.start() + self.run_time
    }

    /// Length of the intersection between the execution interval and `[lo, hi)`
    pub fn overlap(&self, lo: f64, hi: f64) -> f64 {
        let from = self.start().max(lo);
        let until = self.finish().min(hi);
        (until - from).max(0.0)
    }
}
