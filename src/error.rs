// src/error.rs

//! Error types shared by the library
//!
//! Probe failures never show up here: a mirror that cannot be reached is
//! data in its [`MirrorCheck`](crate::probe::MirrorCheck), not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    /// No configured mirror carries the file
    #[error("file {} is not mirrored by any mirror", path.display())]
    NotMirrored { path: PathBuf },

    /// Aggregated snapshots refer to different files
    #[error("snapshots describe different files: {expected:?} and {found:?}")]
    TargetMismatch { expected: String, found: String },

    /// Descriptor is too large to be held in memory
    #[error("{} is {size} bytes, refusing to load files of {limit} bytes or more", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::ParseError(format!("XML: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(format!("JSON: {err}"))
    }
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
