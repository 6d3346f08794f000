//! The `Workload` trace container
//!
//! A workload is an ordered sequence of jobs (ascending submission time)
//! plus an optional declared resource capacity. Ordering is enforced at
//! construction and is semantically meaningful: it defines the temporal
//! windows the extractor slides over.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::batsim::{self, BatsimError};
use crate::job::Job;
use crate::stats;
use crate::swf::{self, SwfError};

/// Errors for loading and exporting traces
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Swf {
        path: PathBuf,
        #[source]
        source: SwfError,
    },

    #[error("{path}: {source}")]
    Batsim {
        path: PathBuf,
        #[source]
        source: BatsimError,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// How to determine the resource capacity that normalizes utilisation.
///
/// The capacity denominator is an explicit parameter everywhere: `Fixed`
/// injects an externally known cluster size, `Auto` prefers the trace's
/// declared capacity (SWF `MaxProcs`) and falls back to the peak observed
/// concurrent usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Capacity {
    #[default]
    Auto,
    Fixed(u32),
}

/// An ordered job trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workload {
    jobs: Vec<Job>,
    nb_res: Option<u32>,
}

impl Workload {
    /// Build a workload, sorting jobs by submission time.
    pub fn new(mut jobs: Vec<Job>, nb_res: Option<u32>) -> Self {
        jobs.sort_by(|a, b| a.submit_time.total_cmp(&b.submit_time));
        Self { jobs, nb_res }
    }

    /// Load a trace file, dispatching on the extension: `.swf` is parsed as
    /// Standard Workload Format, anything else as Batsim `out_jobs.csv`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_swf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("swf"));
        if is_swf {
            swf::parse(BufReader::new(file)).map_err(|source| LoadError::Swf {
                path: path.to_path_buf(),
                source,
            })
        } else {
            let jobs = batsim::read_csv(BufReader::new(file)).map_err(|source| {
                LoadError::Batsim {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(Self::new(jobs, None))
        }
    }

    /// Serialize to `out_jobs.csv` at `path` (round-trips through
    /// [`Workload::from_file`]).
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        batsim::write_csv(BufWriter::new(file), &self.jobs).map_err(|source| {
            LoadError::Batsim {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Capacity declared by the trace itself (SWF `MaxProcs`), if any.
    pub fn declared_capacity(&self) -> Option<u32> {
        self.nb_res
    }

    /// Overall time span: minimum submission time to maximum completion
    /// time. `None` for an empty trace.
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.jobs.first()?;
        let start = first.submit_time;
        let end = self
            .jobs
            .iter()
            .map(Job::finish)
            .fold(start, f64::max);
        Some((start, end))
    }

    /// Resolve the utilisation denominator for this trace.
    pub fn resolve_capacity(&self, capacity: Capacity) -> u32 {
        match capacity {
            Capacity::Fixed(n) => n,
            Capacity::Auto => self
                .nb_res
                .unwrap_or_else(|| stats::peak_usage(&self.jobs)),
        }
    }

    /// Mean utilisation over the whole span for a given capacity.
    pub fn mean_utilisation(&self, capacity: u32) -> f64 {
        match self.span() {
            Some((start, end)) => stats::utilisation_in(&self.jobs, start, end, capacity),
            None => 0.0,
        }
    }
}
