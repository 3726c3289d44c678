// src/repository/repomd.rs

//! The `repomd.xml` descriptor whose freshness is tracked
//!
//! A [`RepoMd`] is loaded once per invocation. It keeps the whole file in
//! memory (descriptors are a few kilobytes; anything at or above
//! [`MAX_REPOMD_SIZE`] is refused) so hashes can be computed on demand, and
//! collects the alternates that will be rendered next to it.

use crate::error::{Error, Result};
use crate::hash::{hash_bytes, HashAlgorithm};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use super::alternates::{parse_metalink3, resolve_alternates, Alternate};
use super::xml::{Element, NS_REPOMD};

/// Memory protection safeguard: descriptors are read whole
pub const MAX_REPOMD_SIZE: u64 = 10_000_000;

/// A loaded repository descriptor
#[derive(Debug)]
pub struct RepoMd {
    path: PathBuf,
    contents: Vec<u8>,
    timestamp: u64,
    hashes: [OnceLock<String>; HashAlgorithm::ALL.len()],
    alternates: BTreeSet<Alternate>,
}

impl RepoMd {
    /// Load a descriptor from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .map_err(|e| Error::IoError(format!("Failed to stat {}: {e}", path.display())))?;

        if metadata.len() >= MAX_REPOMD_SIZE {
            return Err(Error::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: MAX_REPOMD_SIZE,
            });
        }

        let contents = fs::read(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_contents(path, contents)
    }

    /// Build a descriptor from contents already in memory
    pub fn from_contents(path: impl Into<PathBuf>, contents: Vec<u8>) -> Result<Self> {
        let path = path.into();
        if contents.len() as u64 >= MAX_REPOMD_SIZE {
            return Err(Error::TooLarge {
                path,
                size: contents.len() as u64,
                limit: MAX_REPOMD_SIZE,
            });
        }

        let timestamp = parse_timestamp(&contents)
            .map_err(|e| Error::ParseError(format!("{}: {e}", path.display())))?;
        debug!("Loaded {} (timestamp {})", path.display(), timestamp);

        Ok(Self {
            path,
            contents,
            timestamp,
            hashes: Default::default(),
            alternates: BTreeSet::new(),
        })
    }

    /// Path the descriptor was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name, as used in `<file name="...">`
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Repository build time: the newest `<timestamp>` of all data entries
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Hex digest of the contents, computed once per algorithm
    pub fn get_hash(&self, algorithm: HashAlgorithm) -> &str {
        self.hashes[algorithm.index()].get_or_init(|| hash_bytes(algorithm, &self.contents))
    }

    /// Alternates in rendering order (newest first)
    pub fn alternates(&self) -> Vec<Alternate> {
        self.alternates.iter().rev().cloned().collect()
    }

    /// Load alternates from the previously generated metalink
    ///
    /// `max_count` and `max_age` (seconds between this descriptor and an
    /// alternate) limit what is kept; `0` disables either limit.
    pub fn load_alternates(&mut self, metalink: &Path, max_count: usize, max_age: u64) -> Result<()> {
        let text = fs::read_to_string(metalink).map_err(|e| {
            Error::IoError(format!("Failed to read old metalink {}: {e}", metalink.display()))
        })?;
        let candidates = parse_metalink3(&text)
            .map_err(|e| Error::ParseError(format!("{}: {e}", metalink.display())))?;
        self.add_alternates(candidates, max_count, max_age);
        Ok(())
    }

    /// Filter candidates against this descriptor and merge them in
    pub fn add_alternates(&mut self, candidates: Vec<Alternate>, max_count: usize, max_age: u64) {
        let resolved = resolve_alternates(self.timestamp, candidates, max_count, max_age);
        debug!("Keeping {} alternates", resolved.len());
        self.alternates.extend(resolved);
    }
}

fn parse_timestamp(contents: &[u8]) -> Result<u64> {
    let text = std::str::from_utf8(contents)
        .map_err(|e| Error::ParseError(format!("not UTF-8: {e}")))?;
    let root = Element::parse(text)?;
    if !root.is(NS_REPOMD, "repomd") {
        return Err(Error::ParseError(format!(
            "expected <repomd> root element, found <{}>",
            root.name
        )));
    }

    let mut newest = None;
    for element in root.select(&[(NS_REPOMD, "data"), (NS_REPOMD, "timestamp")]) {
        let timestamp = element.text_u64()?;
        newest = Some(newest.map_or(timestamp, |n: u64| n.max(timestamp)));
    }
    newest.ok_or_else(|| Error::ParseError("no <data><timestamp> entries".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repomd_xml(timestamps: &[u64]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <repomd xmlns=\"http://linux.duke.edu/metadata/repo\">\n",
        );
        for (i, ts) in timestamps.iter().enumerate() {
            xml.push_str(&format!(
                "  <data type=\"t{i}\"><location href=\"repodata/{i}.xml.gz\"/>\
                 <timestamp>{ts}</timestamp></data>\n"
            ));
        }
        xml.push_str("</repomd>\n");
        xml
    }

    #[test]
    fn test_timestamp_is_newest_data_entry() {
        let repomd =
            RepoMd::from_contents("repodata/repomd.xml", repomd_xml(&[100, 300, 200]).into_bytes())
                .unwrap();
        assert_eq!(repomd.timestamp(), 300);
        assert_eq!(repomd.file_name(), "repomd.xml");
        assert_eq!(repomd.size(), repomd.contents().len() as u64);
    }

    #[test]
    fn test_missing_timestamp_is_error() {
        let result = RepoMd::from_contents("repomd.xml", repomd_xml(&[]).into_bytes());
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_wrong_namespace_is_error() {
        let xml = "<repomd><data><timestamp>1</timestamp></data></repomd>";
        assert!(RepoMd::from_contents("repomd.xml", xml.as_bytes().to_vec()).is_err());
    }

    #[test]
    fn test_hash_is_memoized() {
        let repomd = RepoMd::from_contents("repomd.xml", repomd_xml(&[1]).into_bytes()).unwrap();
        let first = repomd.get_hash(HashAlgorithm::Sha256).as_ptr();
        let second = repomd.get_hash(HashAlgorithm::Sha256).as_ptr();
        assert_eq!(first, second);
        assert_eq!(
            repomd.get_hash(HashAlgorithm::Sha256),
            crate::hash::sha256(repomd.contents())
        );
    }

    #[test]
    fn test_too_large_rejected_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repomd.xml");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_REPOMD_SIZE).unwrap();

        let result = RepoMd::load(&path);
        assert!(matches!(result, Err(Error::TooLarge { .. })));
    }
}
