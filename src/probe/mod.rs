// src/probe/mod.rs

//! Mirror freshness probing
//!
//! A probe run fetches the tracked file from every mirror at (roughly) the
//! same moment and records what each mirror served:
//! - [`MirrorChecker`] checks one mirror and never fails
//! - [`check_mirrors`] fans checks out over all mirrors and joins them
//! - [`Snapshot`] is the JSON document a run produces

mod checker;
mod client;
mod run;
mod snapshot;

pub use checker::{MirrorCheck, MirrorChecker};
pub use client::ProbeClient;
pub use run::{check_mirrors, run_checks};
pub use snapshot::{MirrorStatus, Snapshot, UTCNOW_FORMAT};
