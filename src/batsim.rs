//! Batsim workload formats
//!
//! Two formats live here: the `out_jobs.csv` job list produced by Batsim
//! runs (read and written through the `csv` crate), and the JSON workload
//! description consumed by Batsim itself (written by `ventana convert`).
//! Extra columns in real Batsim output are ignored on read; the writer
//! emits the canonical subset that round-trips through the reader.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::Job;

/// Errors for Batsim CSV and JSON handling
#[derive(Error, Debug)]
pub enum BatsimError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("job {id}: negative resource request {res}")]
    NegativeResources { id: String, res: i64 },
}

pub type Result<T> = std::result::Result<T, BatsimError>;

/// One row of an `out_jobs.csv` file. Field names follow the Batsim column
/// headers so serde maps them directly.
#[derive(Debug, Serialize, Deserialize)]
struct JobRow {
    job_id: String,
    #[serde(default)]
    workload_name: String,
    submission_time: f64,
    requested_number_of_resources: i64,
    #[serde(default)]
    requested_time: f64,
    #[serde(default = "default_success")]
    success: u8,
    #[serde(default = "unknown_time")]
    starting_time: f64,
    execution_time: f64,
    #[serde(default = "unknown_time")]
    finish_time: f64,
}

fn default_success() -> u8 {
    1
}

/// Batsim uses -1 for times it did not observe.
fn unknown_time() -> f64 {
    -1.0
}

/// Read the jobs of an `out_jobs.csv` stream, in file order.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Job>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut jobs = Vec::new();
    for row in csv_reader.deserialize() {
        let row: JobRow = row?;
        if row.requested_number_of_resources < 0 {
            return Err(BatsimError::NegativeResources {
                id: row.job_id,
                res: row.requested_number_of_resources,
            });
        }
        jobs.push(Job {
            id: row.job_id,
            submit_time: row.submission_time,
            start_time: (row.starting_time >= 0.0).then_some(row.starting_time),
            run_time: row.execution_time.max(0.0),
            res: row.requested_number_of_resources as u32,
        });
    }
    Ok(jobs)
}

/// Write jobs as `out_jobs.csv`, loadable back through [`read_csv`].
pub fn write_csv<W: Write>(writer: W, jobs: &[Job]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for job in jobs {
        // unknown starts stay the -1 sentinel so a round trip restores None
        csv_writer.serialize(JobRow {
            job_id: job.id.clone(),
            workload_name: String::new(),
            submission_time: job.submit_time,
            requested_number_of_resources: i64::from(job.res),
            requested_time: job.run_time,
            success: 1,
            starting_time: job.start_time.unwrap_or_else(unknown_time),
            execution_time: job.run_time,
            finish_time: job.start_time.map_or_else(unknown_time, |s| s + job.run_time),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// A Batsim JSON workload: resource count, job list and delay profiles.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonWorkload {
    pub nb_res: u32,
    pub jobs: Vec<JsonJob>,
    /// BTreeMap keeps the emitted profile order deterministic
    pub profiles: BTreeMap<String, DelayProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonJob {
    pub id: String,
    pub subtime: f64,
    pub res: u32,
    pub profile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayProfile {
    #[serde(rename = "type")]
    pub profile_type: String,
    pub delay: f64,
    pub scheduler: String,
    pub cpu: f64,
}

/// Serialize a JSON workload to a writer.
pub fn write_json<W: Write>(writer: W, workload: &JsonWorkload) -> Result<()> {
    serde_json::to_writer_pretty(writer, workload)?;
    Ok(())
}
