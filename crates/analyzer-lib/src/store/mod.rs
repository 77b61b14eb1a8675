//! Sample store access and artifact persistence
//!
//! The external collector appends one JSON object per line to the sample
//! store. This module reads that stream back, and persists the engine's
//! output artifacts keyed by run id with an explicit latest pointer per
//! artifact kind.

mod artifacts;

pub use artifacts::{ArtifactKind, ArtifactStore, RunId};

use crate::error::{AnalyzerError, Result};
use crate::models::HypervisorSample;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reader for the append-only sample stream.
///
/// The store is read-only from the engine's perspective; only the collector
/// appends to it. A line that fails to parse is skipped rather than failing
/// the load: the trailing line may be mid-append by a concurrent collector.
pub struct SampleStore {
    path: PathBuf,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all retained samples, ordered by timestamp.
    ///
    /// Returns [`AnalyzerError::DataUnavailable`] when the store is missing
    /// or holds no parseable samples. Callers treat this as "no data yet".
    pub fn read_samples(&self) -> Result<Vec<HypervisorSample>> {
        if !self.path.exists() {
            return Err(AnalyzerError::DataUnavailable {
                path: self.path.clone(),
            });
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<HypervisorSample>(line) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    skipped += 1;
                    debug!(line = index + 1, error = %e, "Skipping unparseable sample line");
                }
            }
        }

        if skipped > 0 {
            warn!(
                skipped = skipped,
                path = %self.path.display(),
                "Skipped unparseable sample lines"
            );
        }

        if samples.is_empty() {
            return Err(AnalyzerError::DataUnavailable {
                path: self.path.clone(),
            });
        }

        // The collector appends in time order per node, but nodes interleave
        // arbitrarily. Stable sort keeps per-node order for equal timestamps.
        samples.sort_by_key(|s| s.timestamp);

        info!(count = samples.len(), "Loaded samples from store");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn sample(node: &str, hour: u32) -> HypervisorSample {
        HypervisorSample {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            node: node.to_string(),
            vcpus_used: 4.0,
            vcpus_total: 8.0,
            memory_used_mb: 8192.0,
            memory_total_mb: 16384.0,
            disk_used_gb: 100.0,
            disk_total_gb: 500.0,
            instances: 3,
            total_instance_vcpus: 6.0,
            total_instance_memory_mb: 12288.0,
            hypervisor_type: "QEMU".to_string(),
            state: "up".to_string(),
            status: "enabled".to_string(),
        }
    }

    fn write_store(lines: &[String]) -> (tempfile::TempDir, SampleStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        let store = SampleStore::new(&path);
        (dir, store)
    }

    #[test]
    fn test_missing_store_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("missing.jsonl"));
        let err = store.read_samples().unwrap_err();
        assert!(matches!(err, AnalyzerError::DataUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_empty_store_is_data_unavailable() {
        let (_dir, store) = write_store(&[]);
        let err = store.read_samples().unwrap_err();
        assert!(matches!(err, AnalyzerError::DataUnavailable { .. }));
    }

    #[test]
    fn test_reads_and_orders_samples() {
        let lines = vec![
            serde_json::to_string(&sample("node-b", 2)).unwrap(),
            serde_json::to_string(&sample("node-a", 1)).unwrap(),
            serde_json::to_string(&sample("node-a", 3)).unwrap(),
        ];
        let (_dir, store) = write_store(&lines);
        let samples = store.read_samples().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].node, "node-a");
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_truncated_trailing_line_is_skipped() {
        let full = serde_json::to_string(&sample("node-a", 1)).unwrap();
        let truncated = full[..full.len() / 2].to_string();
        let (_dir, store) = write_store(&[full, truncated]);
        let samples = store.read_samples().unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let lines = vec![
            String::new(),
            serde_json::to_string(&sample("node-a", 1)).unwrap(),
            String::new(),
        ];
        let (_dir, store) = write_store(&lines);
        assert_eq!(store.read_samples().unwrap().len(), 1);
    }
}
