// src/repository/alternates.rs

//! Alternates: previously published versions of a descriptor
//!
//! Yum clients that fetched `repomd.xml` from a mirror which has not caught
//! up yet can still verify it if the metalink lists the older version as an
//! `<mm0:alternate>`. Each generation reads the previous metalink, whose main
//! file becomes the first alternate candidate, so history accumulates from
//! one generation to the next and is trimmed by age and count.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

use super::xml::{Element, NS_METALINK3, NS_MM0};

/// One published version of a file, as listed in a metalink
///
/// Field order matters: alternates sort by timestamp first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alternate {
    pub timestamp: u64,
    pub size: u64,
    /// `(algorithm, hex digest)` pairs in document order
    pub hashes: Vec<(String, String)>,
}

impl Alternate {
    /// Read an alternate from a `<file>` or `<mm0:alternate>` element
    fn from_xml3(element: &Element) -> Result<Self> {
        let timestamp = element
            .child(NS_MM0, "timestamp")
            .ok_or_else(|| missing(&element.name, "mm0:timestamp"))?
            .text_u64()?;
        let size = element
            .child(NS_METALINK3, "size")
            .ok_or_else(|| missing(&element.name, "size"))?
            .text_u64()?;

        let mut hashes = Vec::new();
        for hash in element.select(&[(NS_METALINK3, "verification"), (NS_METALINK3, "hash")]) {
            let algorithm = hash
                .attribute("type")
                .ok_or_else(|| Error::ParseError("<hash> without type attribute".to_string()))?;
            hashes.push((algorithm.to_string(), hash.text.trim().to_string()));
        }

        Ok(Self {
            timestamp,
            size,
            hashes,
        })
    }
}

fn missing(parent: &str, child: &str) -> Error {
    Error::ParseError(format!("<{parent}> has no <{child}>"))
}

/// Read a Metalink 3 document and return every version it lists
///
/// The main file comes first, followed by its alternates in document order.
/// The document must contain exactly one `/metalink/files/file`.
pub fn parse_metalink3(text: &str) -> Result<Vec<Alternate>> {
    let root = Element::parse(text)?;
    if !root.is(NS_METALINK3, "metalink") {
        return Err(Error::ParseError(format!(
            "expected Metalink 3.0 <metalink> root element, found <{}>",
            root.name
        )));
    }

    let files = root.select(&[(NS_METALINK3, "files"), (NS_METALINK3, "file")]);
    let file = match files.as_slice() {
        [file] => *file,
        _ => {
            return Err(Error::ParseError(format!(
                "expected exactly one <files><file>, found {}",
                files.len()
            )));
        }
    };

    let mut versions = vec![Alternate::from_xml3(file)?];
    for alternate in file.select(&[(NS_MM0, "alternates"), (NS_MM0, "alternate")]) {
        versions.push(Alternate::from_xml3(alternate)?);
    }
    Ok(versions)
}

/// Filter, deduplicate and order alternate candidates for a descriptor with
/// timestamp `current`
///
/// - candidates with the current timestamp are the current file itself;
/// - with `max_age > 0`, candidates more than `max_age` seconds older than
///   the current file are dropped;
/// - with `max_count > 0`, only the `max_count` newest are kept.
///
/// The result is newest first.
pub fn resolve_alternates(
    current: u64,
    candidates: impl IntoIterator<Item = Alternate>,
    max_count: usize,
    max_age: u64,
) -> Vec<Alternate> {
    let unique: BTreeSet<Alternate> = candidates
        .into_iter()
        .filter(|alt| alt.timestamp != current)
        .filter(|alt| max_age == 0 || alt.timestamp.saturating_add(max_age) >= current)
        .collect();

    let mut alternates: Vec<Alternate> = unique.into_iter().rev().collect();
    if max_count > 0 {
        alternates.truncate(max_count);
    }
    alternates
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86400;

    fn alt(timestamp: u64) -> Alternate {
        Alternate {
            timestamp,
            size: 1000 + timestamp % 7,
            hashes: vec![("sha256".to_string(), format!("{timestamp:064x}"))],
        }
    }

    #[test]
    fn test_current_timestamp_dropped() {
        let resolved = resolve_alternates(500, vec![alt(500), alt(400)], 0, 0);
        assert_eq!(resolved, vec![alt(400)]);
    }

    #[test]
    fn test_max_age_filter() {
        let now = 10 * DAY;
        let candidates = vec![alt(now - DAY), alt(now - DAY - 1), alt(now - 10)];
        let resolved = resolve_alternates(now, candidates, 0, DAY);
        assert_eq!(resolved, vec![alt(now - 10), alt(now - DAY)]);
        assert!(resolved.iter().all(|a| a.timestamp >= now - DAY));
    }

    #[test]
    fn test_zero_max_age_disables_filter() {
        let resolved = resolve_alternates(10 * DAY, vec![alt(1), alt(2)], 0, 0);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_ordering_and_count() {
        let candidates = vec![alt(10), alt(40), alt(20), alt(30)];
        let resolved = resolve_alternates(50, candidates.clone(), 0, 0);
        let timestamps: Vec<u64> = resolved.iter().map(|a| a.timestamp).collect();
        assert_eq!(timestamps, vec![40, 30, 20, 10]);

        let resolved = resolve_alternates(50, candidates, 2, 0);
        assert_eq!(resolved, vec![alt(40), alt(30)]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let resolved = resolve_alternates(50, vec![alt(10), alt(10), alt(20)], 0, 0);
        assert_eq!(resolved, vec![alt(20), alt(10)]);
    }

    #[test]
    fn test_same_timestamp_different_hash_kept() {
        let mut other = alt(10);
        other.hashes[0].1 = "0".repeat(64);
        let resolved = resolve_alternates(50, vec![alt(10), other], 0, 0);
        assert_eq!(resolved.len(), 2);
    }

    const PRIOR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<metalink version="3.0" xmlns="http://www.metalinker.org/"
        xmlns:mm0="http://fedorahosted.org/mirrormanager">
    <files>
        <file name="repomd.xml">
            <mm0:timestamp>300</mm0:timestamp>
            <size>3000</size>
            <mm0:alternates>
                <mm0:alternate>
                    <mm0:timestamp>200</mm0:timestamp>
                    <size>2000</size>
                    <verification>
                        <hash type="sha256">bb</hash>
                    </verification>
                </mm0:alternate>
            </mm0:alternates>
            <verification>
                <hash type="md5">a1</hash>
                <hash type="sha256">a2</hash>
            </verification>
            <resources maxconnections="1">
                <url>http://mirror.example.com/repomd.xml</url>
            </resources>
        </file>
    </files>
</metalink>
"#;

    #[test]
    fn test_parse_metalink3() {
        let versions = parse_metalink3(PRIOR).unwrap();
        assert_eq!(
            versions,
            vec![
                Alternate {
                    timestamp: 300,
                    size: 3000,
                    hashes: vec![
                        ("md5".to_string(), "a1".to_string()),
                        ("sha256".to_string(), "a2".to_string()),
                    ],
                },
                Alternate {
                    timestamp: 200,
                    size: 2000,
                    hashes: vec![("sha256".to_string(), "bb".to_string())],
                },
            ]
        );
    }

    #[test]
    fn test_parse_metalink3_requires_single_file() {
        let two_files = PRIOR.replace("</files>", "<file name=\"x\"/></files>");
        assert!(parse_metalink3(&two_files).is_err());

        let no_files = r#"<metalink xmlns="http://www.metalinker.org/"><files/></metalink>"#;
        assert!(parse_metalink3(no_files).is_err());
    }

    #[test]
    fn test_parse_metalink3_requires_timestamp() {
        let broken = PRIOR.replace("<mm0:timestamp>300</mm0:timestamp>", "");
        assert!(parse_metalink3(&broken).is_err());
    }

    #[test]
    fn test_metalink4_is_not_a_source_of_alternates() {
        let meta4 = PRIOR.replace("http://www.metalinker.org/", "urn:ietf:params:xml:ns:metalink");
        assert!(parse_metalink3(&meta4).is_err());
    }
}
