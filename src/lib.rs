// src/lib.rs

//! Repomirror: mirror management for yum repositories
//!
//! Tracks how fresh third-party mirrors of a repository are.
//!
//! # Architecture
//!
//! - Generation: `repomd.xml` + mirror list (+ the previous metalink) are
//!   turned into a Metalink 3 or Metalink 4 document listing every mirror
//!   URL, the file's hashes and its recent alternates
//! - Probing: the same file is fetched from every mirror concurrently and
//!   hashed, producing a JSON snapshot
//! - Reporting: snapshots taken over time are aggregated into a table
//!   showing which mirror served which version when

mod error;

pub mod config;
pub mod hash;
pub mod probe;
pub mod report;
pub mod repository;

pub use config::{ProbeConfig, RepomirrorConfig};
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, Hasher};
pub use probe::{check_mirrors, MirrorCheck, MirrorChecker, MirrorStatus, ProbeClient, Snapshot};
pub use report::Report;
pub use repository::{Alternate, MetalinkDocument, MetalinkFormat, Mirror, RepoMd};
