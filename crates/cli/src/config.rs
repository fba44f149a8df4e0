use codeindex_indexer::IndexingOptions;
use serde::Deserialize;
use std::path::Path;

/// Project-local overrides for [`IndexingOptions`], loaded from a
/// `.codeindex.toml` file if one exists at the project root. Any field left
/// unset keeps the built-in default.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub directory_skip_pattern: Option<String>,
    pub max_filesize_mb: Option<f64>,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_workers: Option<usize>,
}

pub fn load(project_root: &Path) -> anyhow::Result<FileConfig> {
    let path = project_root.join(".codeindex.toml");
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(&path)?;
    Ok(toml::from_str(&raw)?)
}

impl FileConfig {
    pub fn apply_to(&self, options: &mut IndexingOptions) {
        if let Some(pattern) = &self.directory_skip_pattern {
            options.directory_skip_pattern = pattern.clone();
        }
        if let Some(max_filesize_mb) = self.max_filesize_mb {
            options.max_filesize_mb = max_filesize_mb;
        }
        if let Some(chunk_size) = self.chunk_size {
            options.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = self.chunk_overlap {
            options.chunk_overlap = chunk_overlap;
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size;
        }
        if let Some(max_workers) = self.max_workers {
            options.max_workers = max_workers;
        }
    }
}
