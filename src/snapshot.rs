use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::TickResult;
use crate::population::PopulationState;
use crate::resources::ResourceSnapshot;

/// Host-side save blob: the resource store and population controller state.
/// Worker assignments are not saved; they are rebuilt on the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub scenario: String,
    pub tick: u64,
    pub resources: ResourceSnapshot,
    pub population: PopulationState,
}

impl SavedState {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read save file {}", path.display()))?;
        let state = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(state)
    }
}

#[derive(Debug, Serialize)]
struct TickSnapshotFile<'a> {
    scenario: &'a str,
    written_at: DateTime<Utc>,
    #[serde(flatten)]
    result: &'a TickResult,
}

/// Writes `<dir>/<scenario>/tick_NNNNNN.json` every `interval_ticks` ticks.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn should_write(&self, tick: u64) -> bool {
        self.interval_ticks > 0 && tick > 0 && tick % self.interval_ticks == 0
    }

    pub fn maybe_write(&self, result: &TickResult, scenario: &str) -> Result<Option<PathBuf>> {
        if !self.should_write(result.tick) {
            return Ok(None);
        }
        let dir = self.output_dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", result.tick));
        let file = TickSnapshotFile {
            scenario,
            written_at: Utc::now(),
            result,
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
