//! Daily compress-rotate-copy-verify-purge backup pipeline for Procem
//! day-log and counter files. See spec.md §4.10 and SPEC_FULL.md §17.
//! Ported from `python_poc/backup_procem_data.py`.

pub mod compaction;
pub mod config;
pub mod cycle;
pub mod naming;
pub mod tools;
