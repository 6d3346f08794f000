//! Standard Workload Format parser
//!
//! SWF is the fixed-column whitespace-separated trace format used in HPC
//! scheduling research. Lines starting with `;` are comments; header
//! comments may carry directives such as `; MaxProcs: 128`, which this
//! parser surfaces as the trace's declared capacity.

use std::io::BufRead;

use thiserror::Error;

use crate::job::Job;
use crate::workload::Workload;

/// Errors for SWF parsing
#[derive(Error, Debug)]
pub enum SwfError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected at least 5 columns, got {got}")]
    ColumnCount { line: usize, got: usize },

    #[error("line {line}: invalid {field} value {value:?}")]
    Field {
        line: usize,
        field: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, SwfError>;

/// Columns required of a job line: job number, submit, wait, run time and
/// allocated processors. Real SWF files carry 18.
const MIN_COLUMNS: usize = 5;

/// SWF column index of the requested-processor count, used as a fallback
/// when the allocation column holds the -1 sentinel.
const REQUESTED_PROCS_COLUMN: usize = 7;

/// Parse an SWF trace into a [`Workload`].
pub fn parse<R: BufRead>(reader: R) -> Result<Workload> {
    let mut jobs = Vec::new();
    let mut max_procs = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix(';') {
            if let Some(value) = directive(comment, "MaxProcs") {
                max_procs = value.parse::<u32>().ok().filter(|&n| n > 0);
            }
            continue;
        }
        jobs.push(parse_job(trimmed, lineno)?);
    }

    Ok(Workload::new(jobs, max_procs))
}

/// Extract the value of a `Key: value` header directive, if this comment
/// line carries the given key.
fn directive<'a>(comment: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = comment.trim().split_once(':')?;
    (name.trim() == key).then(|| value.trim())
}

fn parse_job(line: &str, lineno: usize) -> Result<Job> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < MIN_COLUMNS {
        return Err(SwfError::ColumnCount {
            line: lineno,
            got: cols.len(),
        });
    }

    let field = |index: usize, name: &'static str| -> Result<f64> {
        cols[index].parse::<f64>().map_err(|_| SwfError::Field {
            line: lineno,
            field: name,
            value: cols[index].to_string(),
        })
    };

    let submit_time = field(1, "submit time")?;
    let wait_time = field(2, "wait time")?;
    // -1 marks unknown run times; clamp to the >= 0 invariant
    let run_time = field(3, "run time")?.max(0.0);
    let allocated = field(4, "allocated processors")? as i64;
    let requested = cols
        .get(REQUESTED_PROCS_COLUMN)
        .and_then(|col| col.parse::<f64>().ok())
        .map_or(-1, |procs| procs as i64);
    let res = if allocated > 0 {
        allocated as u32
    } else if requested > 0 {
        requested as u32
    } else {
        0
    };

    Ok(Job {
        id: cols[0].to_string(),
        submit_time,
        start_time: (wait_time >= 0.0).then(|| submit_time + wait_time),
        run_time,
        res,
    })
}
