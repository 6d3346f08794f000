//! SWF to Batsim JSON workload translation
//!
//! Jobs with a zero run time are dropped, submission times are offset so
//! the first job is the origin, and each distinct run time becomes one
//! shared `delay` profile. The per-profile `cpu` value carries the job's
//! processor count and can be rescaled with [`ConvertOptions`].

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::batsim::{DelayProfile, JsonJob, JsonWorkload};
use crate::workload::Workload;

/// Errors for workload conversion
#[derive(Error, Debug, PartialEq)]
pub enum ConvertError {
    #[error("workload has no jobs with a nonzero run time")]
    EmptyWorkload,

    #[error("cpu normalization and uniformization are mutually exclusive")]
    ConflictingCpuOptions,
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Resource requests below this are rejected by Kubernetes-style targets.
const MIN_CPU: f64 = 0.001;

/// Rescaling options for the emitted delay profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    /// Scale cpu values into `(0, normalize]` relative to the maximum observed
    pub normalize: Option<f64>,
    /// Force every cpu value to this constant
    pub uniform: Option<f64>,
    /// Cap job durations at this many seconds
    pub trim: Option<f64>,
}

/// Translate a trace into a Batsim JSON workload of delay profiles.
pub fn to_batsim_json(workload: &Workload, options: &ConvertOptions) -> Result<JsonWorkload> {
    if options.normalize.is_some() && options.uniform.is_some() {
        return Err(ConvertError::ConflictingCpuOptions);
    }

    let runnable: Vec<_> = workload
        .jobs()
        .iter()
        .filter(|job| job.run_time > 0.0)
        .collect();
    let Some(first) = runnable.first() else {
        return Err(ConvertError::EmptyWorkload);
    };
    let origin = first.submit_time;

    let mut jobs = Vec::with_capacity(runnable.len());
    let mut profiles: BTreeMap<String, DelayProfile> = BTreeMap::new();
    for job in &runnable {
        let profile_name = format!("delay{}", job.run_time as i64);
        profiles
            .entry(profile_name.clone())
            .or_insert_with(|| DelayProfile {
                profile_type: "delay".to_string(),
                delay: job.run_time,
                scheduler: "default".to_string(),
                cpu: f64::from(job.res),
            });
        jobs.push(JsonJob {
            id: job.id.clone(),
            subtime: job.submit_time - origin,
            res: 1,
            profile: profile_name,
        });
    }

    let max_cpu = profiles
        .values()
        .map(|profile| profile.cpu)
        .fold(0.0, f64::max);
    for profile in profiles.values_mut() {
        if let Some(scale) = options.normalize {
            if max_cpu > 0.0 {
                profile.cpu = scale * profile.cpu / max_cpu;
            }
        } else if let Some(uniform) = options.uniform {
            profile.cpu = uniform;
        }
        profile.cpu = (profile.cpu.max(MIN_CPU) * 1000.0).round() / 1000.0;
        if let Some(trim) = options.trim {
            if trim > 0.0 && profile.delay > trim {
                profile.delay = trim;
            }
        }
    }

    info!(
        jobs = jobs.len(),
        profiles = profiles.len(),
        "translated workload"
    );

    Ok(JsonWorkload {
        nb_res: 1,
        jobs,
        profiles,
    })
}
