//! Figure reports cached by document content

use anyhow::{Context, Result};
use paperlens_common::{CacheConfig, FigureReport};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON files named by the SHA-256 of the PDF bytes
pub struct ResultCache {
    directory: PathBuf,
}

impl ResultCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `None` when caching is disabled or no cache directory can be found
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        config.resolved_directory().map(Self::new)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Cache key of a document: hex SHA-256 of its bytes
    pub fn key_for(pdf_path: &Path) -> Result<String> {
        let bytes = fs::read(pdf_path).with_context(|| format!("Failed to read {}", pdf_path.display()))?;
        Ok(compute_hash(&bytes))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }

    /// The cached report for `key`.
    ///
    /// Unreadable entries and entries whose figure images no longer exist
    /// are misses.
    pub fn load(&self, key: &str) -> Option<FigureReport> {
        let path = self.entry_path(key);
        let contents = fs::read_to_string(&path).ok()?;
        let report: FigureReport = match serde_json::from_str(&contents) {
            Ok(report) => report,
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if let Some(missing) = report.figures.iter().find(|f| !f.image_path.exists()) {
            debug!(
                "Cache entry {} is stale: {} is missing",
                key,
                missing.image_path.display()
            );
            return None;
        }
        info!("Using cached analysis {}", path.display());
        Some(report)
    }

    pub fn store(&self, key: &str, report: &FigureReport) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create cache directory {}", self.directory.display()))?;
        let path = self.entry_path(key);
        let json = serde_json::to_string_pretty(report).context("Failed to serialize figure report")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Cached analysis at {}", path.display());
        Ok(())
    }
}

fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
