//! Artifact directory API.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use eaf_pipeline::PipelineReport;
use eaf_sim::Snapshot;
use serde::Serialize;

use crate::types::ResultsSummary;
use crate::{ResultsError, ResultsResult};

pub const SNAPSHOT_CSV: &str = "simulation_data.csv";
pub const VISUALIZATION_JSON: &str = "visualization_data.json";
pub const SUMMARY_JSON: &str = "results_summary.json";

const CSV_HEADER: &str = "timestamp,arc_power,metal_temperature,slag_temperature,\
refractory_temperature,metal_mass,slag_mass,carbon_content,silicon_content";

/// Paths written by [`ArtifactStore::save_report`].
#[derive(Debug, Clone, Default)]
pub struct SavedArtifacts {
    pub snapshots: Option<PathBuf>,
    pub visualization: Option<PathBuf>,
    pub summary: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    /// One CSV row per snapshot.
    pub fn write_snapshots(&self, snapshots: &[Snapshot]) -> ResultsResult<PathBuf> {
        let mut content = String::with_capacity(64 * (snapshots.len() + 1));
        content.push_str(CSV_HEADER);
        content.push('\n');
        for s in snapshots {
            // Writing to a String cannot fail
            let _ = writeln!(
                content,
                "{},{},{},{},{},{},{},{},{}",
                s.time_s,
                s.arc_power_w,
                s.metal_temperature_k,
                s.slag_temperature_k,
                s.refractory_temperature_k,
                s.metal_mass_kg,
                s.slag_mass_kg,
                s.carbon_content,
                s.silicon_content
            );
        }
        let path = self.path(SNAPSHOT_CSV);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> ResultsResult<PathBuf> {
        let path = self.path(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    pub fn write_summary(&self, summary: &ResultsSummary) -> ResultsResult<PathBuf> {
        self.write_json(SUMMARY_JSON, summary)
    }

    pub fn load_summary(&self) -> ResultsResult<ResultsSummary> {
        let path = self.path(SUMMARY_JSON);
        if !path.exists() {
            return Err(ResultsError::NotFound {
                name: SUMMARY_JSON.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Number of data rows in the snapshot CSV.
    pub fn snapshot_rows(&self) -> ResultsResult<usize> {
        let path = self.path(SNAPSHOT_CSV);
        if !path.exists() {
            return Err(ResultsError::NotFound {
                name: SNAPSHOT_CSV.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(content
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .count())
    }

    /// Write every artifact the report has data for. The summary is always written.
    pub fn save_report(
        &self,
        report: &PipelineReport,
        config_fingerprint: Option<String>,
    ) -> ResultsResult<SavedArtifacts> {
        let snapshots = report
            .simulation()
            .map(|sim| self.write_snapshots(&sim.results.snapshots))
            .transpose()?;
        let visualization = report
            .visualization()
            .map(|viz| self.write_json(VISUALIZATION_JSON, viz))
            .transpose()?;
        let summary = self.write_summary(&ResultsSummary::from_report(report, config_fingerprint))?;

        Ok(SavedArtifacts {
            snapshots,
            visualization,
            summary,
        })
    }
}
