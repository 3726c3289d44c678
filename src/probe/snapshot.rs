// src/probe/snapshot.rs

//! Snapshot files: the JSON result of one probe run
//!
//! ```json
//! {
//!     "mirrors": {
//!         "https://mirror.example.com/qubes/": {
//!             "error": null,
//!             "history": [],
//!             "sha256": "ba7816bf...",
//!             "status": 200
//!         }
//!     },
//!     "path": "r4.0/current/dom0/fc25/repodata/repomd.xml",
//!     "utcnow": "2018-03-04T05:06:07Z"
//! }
//! ```
//!
//! Keys are emitted in sorted order (struct fields are declared
//! alphabetically, mirrors are a `BTreeMap`) with four-space indentation.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Capture time format used in snapshot files
pub const UTCNOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Outcome of probing one mirror, as stored in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorStatus {
    /// Transport failure, if the probe did not get a complete response
    #[serde(default)]
    pub error: Option<String>,
    /// URLs that redirected before the final response
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<String>,
    /// SHA-256 of the body of a 2xx response
    #[serde(default)]
    pub sha256: Option<String>,
    /// Final HTTP status code
    #[serde(default)]
    pub status: Option<u16>,
}

impl MirrorStatus {
    /// Whether the final status is outside the 2xx range
    pub fn is_http_failure(&self) -> bool {
        self.status.is_some_and(|s| !(200..300).contains(&s))
    }
}

/// One point-in-time check of all mirrors for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Probe results keyed by mirror base URL
    pub mirrors: BTreeMap<String, MirrorStatus>,
    /// Path of the probed file, as it was named to the probe
    pub path: String,
    /// When the run started; shared by every entry
    #[serde(with = "utcnow_format")]
    pub utcnow: DateTime<Utc>,
}

impl Snapshot {
    /// Parse a snapshot document
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read snapshot {}: {e}", path.display()))
        })?;
        Self::from_json(&text).map_err(|e| Error::ParseError(format!("{}: {e}", path.display())))
    }

    /// Serialize as pretty JSON with four-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| Error::ParseError(format!("snapshot JSON: {e}")))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

mod utcnow_format {
    use super::UTCNOW_FORMAT;
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(UTCNOW_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&text, UTCNOW_FORMAT)
            .map_err(serde::de::Error::custom)?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Snapshot {
        let mut mirrors = BTreeMap::new();
        mirrors.insert(
            "https://b.example.com/".to_string(),
            MirrorStatus {
                status: Some(200),
                sha256: Some("ab".repeat(32)),
                ..Default::default()
            },
        );
        mirrors.insert(
            "http://a.example.com/".to_string(),
            MirrorStatus {
                error: Some("connection refused".to_string()),
                ..Default::default()
            },
        );
        Snapshot {
            mirrors,
            path: "r4.0/repodata/repomd.xml".to_string(),
            utcnow: Utc.with_ymd_and_hms(2018, 3, 4, 5, 6, 7).unwrap(),
        }
    }

    #[test]
    fn test_json_layout() {
        let json = sample().to_json().unwrap();
        assert!(json.starts_with("{\n    \"mirrors\": {\n        \"http://a.example.com/\""));
        assert!(json.contains("\"utcnow\": \"2018-03-04T05:06:07Z\""));

        let path_pos = json.find("\"path\"").unwrap();
        let utcnow_pos = json.find("\"utcnow\"").unwrap();
        assert!(path_pos < utcnow_pos);
    }

    #[test]
    fn test_reload_matches() {
        let snapshot = sample();
        assert_eq!(Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap(), snapshot);
    }

    #[test]
    fn test_null_history_accepted() {
        let json = r#"{
            "mirrors": {"http://m/": {"error": "boom", "history": null, "sha256": null, "status": null}},
            "path": "repomd.xml",
            "utcnow": "2018-01-01T00:00:00Z"
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(snapshot.mirrors["http://m/"].history.is_empty());
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let json = r#"{"mirrors": {}, "path": "x", "utcnow": "yesterday"}"#;
        assert!(matches!(Snapshot::from_json(json), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_http_failure() {
        let status = |s| MirrorStatus {
            status: Some(s),
            ..Default::default()
        };
        assert!(status(404).is_http_failure());
        assert!(status(301).is_http_failure());
        assert!(!status(204).is_http_failure());
        assert!(!MirrorStatus::default().is_http_failure());
    }
}
