//! Run-keyed artifact persistence
//!
//! Each analysis or forecast run writes its artifacts under
//! `<root>/<kind>/<run_id>.<ext>` and then updates `<root>/<kind>/LATEST`
//! to point at that run. Writes go to a temporary file in the same
//! directory and are renamed into place, so a reader never observes a
//! partially written artifact, and discovering the newest artifact never
//! requires a directory scan.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-kind pointer file holding the newest run id
const LATEST_POINTER: &str = "LATEST";

/// The kinds of artifact the engine produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    NodeSummary,
    Trends,
    CapacityAnalysis,
    Anomalies,
    Forecasts,
    Recommendations,
    AnalysisReport,
    ForecastReport,
}

impl ArtifactKind {
    /// Directory under the artifact root for this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::NodeSummary => "node_summary",
            ArtifactKind::Trends => "trends",
            ArtifactKind::CapacityAnalysis => "capacity_analysis",
            ArtifactKind::Anomalies => "anomalies",
            ArtifactKind::Forecasts => "forecasts",
            ArtifactKind::Recommendations => "recommendations",
            ArtifactKind::AnalysisReport => "analysis_report",
            ArtifactKind::ForecastReport => "forecast_report",
        }
    }

    /// File extension for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::AnalysisReport | ArtifactKind::ForecastReport => "txt",
            _ => "json",
        }
    }
}

/// Identifier of one engine run, derived from its wall-clock start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        RunId(ts.format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured store for run artifacts with per-kind latest pointers
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a JSON artifact for a run and advance the latest pointer
    pub fn write_json<T: Serialize>(
        &self,
        kind: ArtifactKind,
        run: &RunId,
        value: &T,
    ) -> Result<PathBuf> {
        let payload = serde_json::to_vec_pretty(value)?;
        self.write_bytes(kind, run, &payload)
    }

    /// Persist a plain-text artifact for a run and advance the latest pointer
    pub fn write_text(&self, kind: ArtifactKind, run: &RunId, text: &str) -> Result<PathBuf> {
        self.write_bytes(kind, run, text.as_bytes())
    }

    fn write_bytes(&self, kind: ArtifactKind, run: &RunId, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(kind.dir_name());
        fs::create_dir_all(&dir)?;

        let file_name = format!("{}.{}", run, kind.extension());
        let path = dir.join(&file_name);

        // Rename within the same directory keeps the swap atomic on the
        // filesystems the engine targets.
        let tmp = dir.join(format!(".{}.tmp", file_name));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;

        let pointer_tmp = dir.join(format!(".{}.tmp", LATEST_POINTER));
        fs::write(&pointer_tmp, run.as_str())?;
        fs::rename(&pointer_tmp, dir.join(LATEST_POINTER))?;

        debug!(kind = kind.dir_name(), run = %run, path = %path.display(), "Wrote artifact");
        Ok(path)
    }

    /// Run id of the newest fully written artifact of a kind, if any
    pub fn latest_run(&self, kind: ArtifactKind) -> Result<Option<RunId>> {
        let pointer = self.root.join(kind.dir_name()).join(LATEST_POINTER);
        if !pointer.exists() {
            return Ok(None);
        }
        let id = fs::read_to_string(&pointer)?;
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        Ok(Some(RunId(id.to_string())))
    }

    /// Path of the newest artifact of a kind, if any
    pub fn latest_path(&self, kind: ArtifactKind) -> Result<Option<PathBuf>> {
        let Some(run) = self.latest_run(kind)? else {
            return Ok(None);
        };
        let path = self
            .root
            .join(kind.dir_name())
            .join(format!("{}.{}", run, kind.extension()));
        Ok(path.exists().then_some(path))
    }

    /// Read the newest JSON artifact of a kind, if any
    pub fn read_latest_json<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<Option<T>> {
        let Some(path) = self.latest_path(kind)? else {
            return Ok(None);
        };
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Read the newest text artifact of a kind, if any
    pub fn read_latest_text(&self, kind: ArtifactKind) -> Result<Option<String>> {
        let Some(path) = self.latest_path(kind)? else {
            return Ok(None);
        };
        Ok(Some(fs::read_to_string(&path)?))
    }
}
