//! Cycle journal: one pretty-printed JSON file per trading cycle

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::common::errors::Result;
use crate::common::traits::AuditSink;
use crate::strategy::types::CycleRecord;

/// Writes `<root>/<YYYYMMDD>/<HHMMSS>_<subject>.json`, never overwriting
#[derive(Debug, Clone)]
pub struct JsonFileAuditSink {
    root: PathBuf,
}

impl JsonFileAuditSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target path for a record, suffixed when the name is already taken
    fn path_for(&self, record: &CycleRecord) -> PathBuf {
        let dir = self.root.join(record.started_at.format("%Y%m%d").to_string());
        let stem = format!(
            "{}_{}",
            record.started_at.format("%H%M%S"),
            sanitize(&record.subject)
        );

        let mut path = dir.join(format!("{}.json", stem));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{}_{}.json", stem, n));
            n += 1;
        }
        path
    }
}

impl AuditSink for JsonFileAuditSink {
    fn append(&self, record: &CycleRecord) -> Result<()> {
        let path = self.path_for(record);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        debug!("Cycle record written to {}", path.display());
        Ok(())
    }
}

fn sanitize(subject: &str) -> String {
    let cleaned: String = subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
