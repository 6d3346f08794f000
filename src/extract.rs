//! Utilisation-windowed period extraction
//!
//! Scans a trace with sliding windows of a fixed length and returns the
//! sub-traces whose windowed utilisation matches a target value. Sliding
//! step and match tolerance are explicit, documented constants rather than
//! hidden defaults: the step is a quarter of the window length
//! ([`STEP_DIVISOR`]) and the default tolerance is
//! [`DEFAULT_TOLERANCE`].

use thiserror::Error;
use tracing::debug;

use crate::stats;
use crate::workload::{Capacity, Workload};

/// Errors for period extraction
#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error("invalid period: {0} hours (must be a positive integer)")]
    InvalidPeriod(u32),

    #[error("invalid target utilisation: {0} (must lie in [0, 1])")]
    InvalidUtilisation(f64),

    #[error("invalid tolerance: {0} (must be a finite value >= 0)")]
    InvalidTolerance(f64),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Utilisation match tolerance applied when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// The scan advances by `window length / STEP_DIVISOR` between candidates.
pub const STEP_DIVISOR: u32 = 4;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Tuning knobs of the extractor. `Default` gives the documented constants
/// and automatic capacity resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    /// Accept a window when `|utilisation - target| <= tolerance`
    pub tolerance: f64,
    /// Denominator used to normalize windowed utilisation
    pub capacity: Capacity,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            capacity: Capacity::Auto,
        }
    }
}

/// Extract the sub-periods of `workload` whose utilisation matches `target`.
///
/// Candidate windows of `period_hours` are slid across the trace span by a
/// quarter of their length; a window is accepted when its utilisation —
/// counting only the portion of each job's execution that intersects the
/// window — lies within the configured tolerance of `target`. After an
/// accepted window the scan resumes past its end, so results never overlap.
///
/// Returns the matching windows ordered by start time, each materialized as
/// an independent [`Workload`] of the jobs intersecting it. Windows that no
/// job intersects are never returned, even though their utilisation of 0
/// would match a near-zero target: an empty sub-trace carries no period
/// worth exporting. An empty vector is a legitimate outcome, not an error;
/// the input is never mutated.
pub fn extract_periods_with_given_utilisation(
    workload: &Workload,
    period_hours: u32,
    target: f64,
    config: &ExtractConfig,
) -> Result<Vec<Workload>> {
    if period_hours == 0 {
        return Err(ExtractError::InvalidPeriod(period_hours));
    }
    if !target.is_finite() || !(0.0..=1.0).contains(&target) {
        return Err(ExtractError::InvalidUtilisation(target));
    }
    if !config.tolerance.is_finite() || config.tolerance < 0.0 {
        return Err(ExtractError::InvalidTolerance(config.tolerance));
    }

    let capacity = workload.resolve_capacity(config.capacity);
    let Some((span_start, span_end)) = workload.span() else {
        return Ok(Vec::new());
    };
    if capacity == 0 {
        return Ok(Vec::new());
    }

    let window = f64::from(period_hours) * SECONDS_PER_HOUR;
    let step = window / f64::from(STEP_DIVISOR);
    // absorb float drift when the span is an exact multiple of the window
    let last_start = span_end - window + 1e-9;

    let jobs = workload.jobs();
    let mut matches = Vec::new();
    let mut start = span_start;
    while start <= last_start {
        let end = start + window;
        let utilisation = stats::utilisation_in(jobs, start, end, capacity);
        debug!(start, end, utilisation, "candidate window");
        if (utilisation - target).abs() <= config.tolerance {
            let sub = materialize(workload, start, end, capacity);
            // a window in a gap of the trace reads utilisation 0 and would
            // match any near-zero target; there is no period to return there
            if sub.is_empty() {
                start += step;
            } else {
                matches.push(sub);
                // skip past the accepted window so results never overlap
                start = end;
            }
        } else {
            start += step;
        }
    }

    Ok(matches)
}

/// Clone the jobs intersecting `[start, end)` into a standalone workload.
/// Submission order is inherited from the parent, so no re-sort is needed.
fn materialize(workload: &Workload, start: f64, end: f64, capacity: u32) -> Workload {
    let jobs = workload
        .jobs()
        .iter()
        .filter(|job| job.overlap(start, end) > 0.0)
        .cloned()
        .collect();
    Workload::new(jobs, Some(capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    fn job(id: usize, submit: f64, run: f64, res: u32) -> Job {
        Job {
            id: id.to_string(),
            submit_time: submit,
            start_time: None,
            run_time: run,
            res,
        }
    }

    /// 10 back-to-back jobs over 100 hours, each holding half of a
    /// 10-resource machine: constant utilisation 0.5.
    fn half_loaded_trace() -> Workload {
        let hour = 3600.0;
        let jobs = (0..10)
            .map(|i| job(i, i as f64 * 10.0 * hour, 10.0 * hour, 5))
            .collect();
        Workload::new(jobs, Some(10))
    }

    #[test]
    fn test_invalid_period_rejected() {
        let err =
            extract_periods_with_given_utilisation(&half_loaded_trace(), 0, 0.5, &Default::default())
                .unwrap_err();
        assert_eq!(err, ExtractError::InvalidPeriod(0));
    }

    #[test]
    fn test_invalid_utilisation_rejected() {
        for target in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
            let result = extract_periods_with_given_utilisation(
                &half_loaded_trace(),
                10,
                target,
                &Default::default(),
            );
            assert!(matches!(result, Err(ExtractError::InvalidUtilisation(_))));
        }
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let config = ExtractConfig {
            tolerance: -0.01,
            capacity: Capacity::Auto,
        };
        let result =
            extract_periods_with_given_utilisation(&half_loaded_trace(), 10, 0.5, &config);
        assert_eq!(result, Err(ExtractError::InvalidTolerance(-0.01)));
    }

    #[test]
    fn test_empty_trace_yields_no_windows() {
        let result = extract_periods_with_given_utilisation(
            &Workload::default(),
            10,
            0.5,
            &Default::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_period_longer_than_span_yields_no_windows() {
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            101,
            0.5,
            &Default::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_matching_target_finds_windows() {
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            10,
            0.5,
            &Default::default(),
        )
        .unwrap();
        assert!(!result.is_empty());
        let first = &result[0];
        assert!((first.mean_utilisation(10) - 0.5).abs() <= DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_unreachable_target_yields_no_windows() {
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            10,
            0.99,
            &Default::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_results_never_overlap() {
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            10,
            0.5,
            &Default::default(),
        )
        .unwrap();
        assert!(result.len() >= 2);
        for pair in result.windows(2) {
            let (_, prev_end) = pair[0].span().unwrap();
            let (next_start, _) = pair[1].span().unwrap();
            assert!(next_start >= prev_end);
        }
    }

    #[test]
    fn test_sub_traces_are_ordered_and_duplicate_free() {
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            20,
            0.5,
            &Default::default(),
        )
        .unwrap();
        for sub in &result {
            let jobs = sub.jobs();
            for pair in jobs.windows(2) {
                assert!(pair[0].submit_time <= pair[1].submit_time);
                assert_ne!(pair[0].id, pair[1].id);
            }
        }
    }

    #[test]
    fn test_extraction_is_pure() {
        let workload = half_loaded_trace();
        let before = workload.clone();
        let _ =
            extract_periods_with_given_utilisation(&workload, 10, 0.5, &Default::default())
                .unwrap();
        assert_eq!(workload, before);
    }

    #[test]
    fn test_single_window_stability() {
        // re-extracting a returned sub-trace with its own measured
        // utilisation as the target returns that same sub-trace
        let result = extract_periods_with_given_utilisation(
            &half_loaded_trace(),
            10,
            0.5,
            &Default::default(),
        )
        .unwrap();
        let sub = &result[0];
        let measured = sub.mean_utilisation(sub.resolve_capacity(Capacity::Auto));
        let again =
            extract_periods_with_given_utilisation(sub, 10, measured, &Default::default())
                .unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(&again[0], sub);
    }

    #[test]
    fn test_gap_windows_with_zero_target_are_skipped() {
        // two short jobs separated by a 100-hour gap: the gap's windows
        // read utilisation 0 but hold no jobs, so a zero target must not
        // produce empty sub-traces
        let hour = 3600.0;
        let workload = Workload::new(
            vec![job(0, 0.0, hour, 1), job(1, 101.0 * hour, hour, 1)],
            Some(1),
        );
        let result =
            extract_periods_with_given_utilisation(&workload, 1, 0.0, &Default::default())
                .unwrap();
        for sub in &result {
            assert!(!sub.is_empty());
            assert!(sub.span().is_some());
        }
    }

    #[test]
    fn test_sparse_trace_low_target_still_matches_populated_windows() {
        // a window holding a sliver of a job matches a zero target within
        // tolerance and is returned, while the fully empty windows are not
        let hour = 3600.0;
        // job occupies 2% of each 10h window it touches
        let workload = Workload::new(
            vec![job(0, 0.0, 0.2 * hour, 1), job(1, 50.0 * hour, 0.2 * hour, 1)],
            Some(1),
        );
        let result =
            extract_periods_with_given_utilisation(&workload, 10, 0.0, &Default::default())
                .unwrap();
        assert!(!result.is_empty());
        for sub in &result {
            assert!(!sub.is_empty());
        }
    }

    #[test]
    fn test_partial_overlap_counts_proportionally() {
        // one job of 2h straddles the boundary of every 1h window at full
        // capacity; windows fully inside the job read utilisation 1.0
        let hour = 3600.0;
        let workload = Workload::new(vec![job(0, 0.0, 2.0 * hour, 10)], Some(10));
        let result =
            extract_periods_with_given_utilisation(&workload, 1, 1.0, &Default::default())
                .unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn test_fixed_capacity_changes_the_match() {
        // 5 of 10 resources busy reads 0.5 with Auto but 1.0 against a
        // fixed capacity of 5
        let hour = 3600.0;
        let workload = Workload::new(vec![job(0, 0.0, 10.0 * hour, 5)], Some(10));
        let config = ExtractConfig {
            tolerance: DEFAULT_TOLERANCE,
            capacity: Capacity::Fixed(5),
        };
        let matched =
            extract_periods_with_given_utilisation(&workload, 10, 1.0, &config).unwrap();
        assert_eq!(matched.len(), 1);
        let missed =
            extract_periods_with_given_utilisation(&workload, 10, 1.0, &Default::default())
                .unwrap();
        assert!(missed.is_empty());
    }
}
