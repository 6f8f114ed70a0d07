// Upload history persisted by the CLI so that files can be hashed or
// deleted later without copying admin URLs around by hand.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::response::UploadResult;

const HISTORY_FILE: &str = ".oshi_history.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub filename: String,
    #[serde(flatten)]
    pub urls: UploadResult,
    /// Seconds since the unix epoch.
    pub uploaded_at: u64,
}

impl UploadRecord {
    pub fn now(filename: impl Into<String>, urls: UploadResult) -> Self {
        let uploaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        UploadRecord {
            filename: filename.into(),
            urls,
            uploaded_at,
        }
    }
}

#[derive(Debug)]
pub struct History {
    path: PathBuf,
    records: Vec<UploadRecord>,
}

impl History {
    /// `~/.oshi_history.json`, or the current directory when there is no home.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HISTORY_FILE)
    }

    /// Load the history at `path`. A missing file is an empty history.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Parsing upload history {}", path.display()))?
        } else {
            Vec::new()
        };
        Ok(History { path, records })
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn push(&mut self, record: UploadRecord) {
        self.records.push(record);
    }

    /// Forget the upload owning `admin_url`, returning it if it was known.
    pub fn remove_by_admin(&mut self, admin_url: &str) -> Option<UploadRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.urls.admin.as_deref() == Some(admin_url))?;
        Some(self.records.remove(idx))
    }

    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
