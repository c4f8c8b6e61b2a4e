//! Snapshot Export
//!
//! Writes committed population snapshots to disk at a fixed tick interval.

use roam_events::PopulationSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Default root directory for run output
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Writes `snapshots/snap_<tick>.json` and `current_state.json` under an
/// output directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
    snapshot_interval: u64,
    written: u64,
    last_snapshot_tick: Option<u64>,
}

impl SnapshotWriter {
    /// An interval of 0 disables periodic snapshots; tick 0 is still written.
    pub fn new(output_dir: impl Into<PathBuf>, snapshot_interval: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            snapshot_interval,
            written: 0,
            last_snapshot_tick: None,
        }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.output_dir.join("snapshots")
    }

    pub fn current_state_path(&self) -> PathBuf {
        self.output_dir.join("current_state.json")
    }

    /// True on tick 0 and every `snapshot_interval` ticks after it.
    pub fn should_snapshot(&self, tick: u64) -> bool {
        if self.last_snapshot_tick == Some(tick) {
            return false;
        }
        tick == 0 || (self.snapshot_interval > 0 && tick % self.snapshot_interval == 0)
    }

    /// Writes `snapshot` into the snapshots directory and refreshes
    /// `current_state.json`. Returns the snapshot file path.
    pub fn write_snapshot(&mut self, snapshot: &PopulationSnapshot) -> std::io::Result<PathBuf> {
        let dir = self.snapshots_dir();
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", snapshot.snapshot_id));
        write_json(snapshot, &path)?;
        self.write_current_state(snapshot)?;

        self.written += 1;
        self.last_snapshot_tick = Some(snapshot.tick);
        tracing::debug!("Wrote snapshot {}", path.display());
        Ok(path)
    }

    /// Overwrites `current_state.json` only.
    pub fn write_current_state(&self, snapshot: &PopulationSnapshot) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        write_json(snapshot, self.current_state_path())
    }

    /// Writes the snapshot if `should_snapshot` says so.
    pub fn maybe_write(&mut self, snapshot: &PopulationSnapshot) -> std::io::Result<Option<PathBuf>> {
        if self.should_snapshot(snapshot.tick) {
            self.write_snapshot(snapshot).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn snapshot_count(&self) -> u64 {
        self.written
    }
}

fn write_json(snapshot: &PopulationSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = snapshot.to_json_pretty()?;
    fs::write(path, json)
}
