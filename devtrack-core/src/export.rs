//! One-shot snapshot export and import (JSON or YAML).
//!
//! This is not a persistence layer: nothing here runs unless asked, and the
//! in-memory [`Tracker`] stays authoritative.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mis::MonthlyReport;
use crate::models::{DevelopmentRequest, TrackedItem};
use crate::month::MonthKey;
use crate::tracker::Tracker;

/// Serializable copy of a tracker's state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub requests: Vec<DevelopmentRequest>,
    #[serde(default)]
    pub tracked_items: Vec<TrackedItem>,
    #[serde(default)]
    pub reports: BTreeMap<MonthKey, MonthlyReport>,
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    Json,
    #[default]
    Yaml,
}

impl SnapshotFormat {
    /// Infers the format from a file extension, defaulting to YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SnapshotFormat::Json,
            Some("yaml") | Some("yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Yaml,
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFormat::Json => write!(f, "json"),
            SnapshotFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "yaml" | "yml" => Ok(SnapshotFormat::Yaml),
            _ => Err(Error::unknown("snapshot format", s)),
        }
    }
}

/// Renders the tracker's state in `format`.
pub fn export_snapshot(tracker: &Tracker, format: SnapshotFormat) -> Result<String> {
    render(&tracker.snapshot(), format)
}

fn render(snapshot: &Snapshot, format: SnapshotFormat) -> Result<String> {
    Ok(match format {
        SnapshotFormat::Json => serde_json::to_string_pretty(snapshot)?,
        SnapshotFormat::Yaml => serde_yaml::to_string(snapshot)?,
    })
}

/// Parses a snapshot from a string.
pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> Result<Snapshot> {
    Ok(match format {
        SnapshotFormat::Json => serde_json::from_str(content)?,
        SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
    })
}

/// Reads a snapshot file, choosing the format from its extension.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let format = SnapshotFormat::from_path(path);
    debug!(path = %path.display(), %format, "loading snapshot");
    let content = fs::read_to_string(path)?;
    parse_snapshot(&content, format)
}

/// Writes the tracker's state to `path`, choosing the format from its
/// extension.
pub fn write_snapshot(tracker: &Tracker, path: &Path) -> Result<()> {
    let format = SnapshotFormat::from_path(path);
    let content = export_snapshot(tracker, format)?;
    fs::write(path, content)?;
    debug!(path = %path.display(), %format, "wrote snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mis::MonthlyReportPatch;
    use tempfile::TempDir;

    fn populated() -> Tracker {
        let mut tracker = Tracker::with_sample_data().unwrap();
        let mut budget = tracker.reports.get("2024-06".parse().unwrap()).budget.clone();
        budget.monthly.capex.actual = 1.0;
        tracker.reports.save(
            "2024-06".parse().unwrap(),
            MonthlyReportPatch {
                budget: Some(budget),
                ..Default::default()
            },
        );
        tracker
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.json")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.yml")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.yaml")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("snapshot")), SnapshotFormat::Yaml);
        assert_eq!("JSON".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert!("xml".parse::<SnapshotFormat>().is_err());
    }

    #[test]
    fn test_json_export_is_flat_camel_case() {
        let tracker = populated();
        let json = export_snapshot(&tracker, SnapshotFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["requests"][0];
        assert_eq!(first["id"], "REQ-001");
        assert_eq!(first["currentStage"], "completed");
        assert_eq!(first["approvalStatus"], "Approved");
        assert_eq!(first["requestDate"], "2024-04-15");
        assert!(value["reports"]["2024-06"]["budget"].is_object());
    }

    #[test]
    fn test_write_and_load_through_files() {
        let dir = TempDir::new().unwrap();
        let tracker = populated();

        for name in ["state.json", "state.yaml"] {
            let path = dir.path().join(name);
            write_snapshot(&tracker, &path).unwrap();
            let loaded = load_snapshot(&path).unwrap();
            assert_eq!(loaded, tracker.snapshot(), "mismatch for {}", name);
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_snapshot(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parse_partial_snapshot() {
        let snapshot = parse_snapshot("requests: []\n", SnapshotFormat::Yaml).unwrap();
        assert!(snapshot.tracked_items.is_empty());
        assert!(snapshot.reports.is_empty());
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let yaml = r#"
requests:
  - id: REQ-001
    title: T
    requestDate: 2024-06-15
    requestedBy: A
    department: IT
    priority: Critical
    businessJustification: J
    relatedModule: M
    currentStage: analysis
"#;
        assert!(parse_snapshot(yaml, SnapshotFormat::Yaml).is_err());
    }
}
