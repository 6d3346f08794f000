//! Ventana - workload trace analysis for SWF and Batsim traces
//!
//! This library provides the core functionality for loading job traces
//! (Standard Workload Format or Batsim `out_jobs.csv`), extracting
//! sub-periods that match a target utilisation level, and re-exporting or
//! rendering the result.

pub mod batsim;
pub mod cli;
pub mod convert;
pub mod extract;
pub mod job;
pub mod plot;
pub mod stats;
pub mod swf;
pub mod workload;
