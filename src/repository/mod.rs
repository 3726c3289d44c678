// src/repository/mod.rs

//! Repository side of mirror management
//!
//! This module provides functionality for:
//! - Reading mirror lists and resolving per-mirror URLs
//! - Loading `repomd.xml` descriptors
//! - Carrying older descriptor versions forward as alternates
//! - Rendering Metalink 3 and Metalink 4 documents

mod alternates;
mod metalink;
mod mirrors;
mod repomd;

pub mod xml;

pub use alternates::{parse_metalink3, resolve_alternates, Alternate};
pub use metalink::{MetalinkDocument, MetalinkFormat, GENERATOR};
pub use mirrors::{parse_mirrors, read_mirrors, relative_to, urls_for_mirrors, Mirror, WHOLE_TREE};
pub use repomd::{RepoMd, MAX_REPOMD_SIZE};
