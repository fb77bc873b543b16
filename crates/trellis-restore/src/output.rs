//! Writes the batch report into a timestamped results directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RestoreError;
use crate::results::Results;

pub struct OutputWriter {
    results_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: &Path) -> Result<Self, RestoreError> {
        let stamp = jiff::Timestamp::now().strftime("%Y%m%d-%H%M%S").to_string();
        let results_dir = output_dir.join(format!("restore-{stamp}"));
        std::fs::create_dir_all(&results_dir)?;
        Ok(Self { results_dir })
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Atomic write: tmp file first, then rename into place.
    pub fn save(&self, results: &Results) -> Result<PathBuf, RestoreError> {
        let path = self.results_dir.join("restore-results.json");
        let json = serde_json::to_vec_pretty(results)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), "restore results saved");
        Ok(path)
    }
}
