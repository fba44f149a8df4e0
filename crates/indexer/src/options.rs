use std::collections::HashMap;

/// Configuration for a single indexing run. Defaults mirror the reference
/// implementation's `configs/indexing.py` constants.
#[derive(Debug, Clone)]
pub struct IndexingOptions {
    /// Matched against directory basenames; matches are pruned during
    /// traversal.
    pub directory_skip_pattern: String,
    /// Files larger than this (in megabytes, fractional) are skipped.
    /// A float rather than a whole-MB count so callers can express
    /// byte-precise thresholds (e.g. `100.0 / (1024.0 * 1024.0)` for 100
    /// bytes), matching the reference implementation's `max_filesize` knob.
    pub max_filesize_mb: f64,
    /// Extensions (without the leading dot) eligible for vector indexing.
    pub indexed_extensions: Vec<String>,
    /// Extension -> language tag, used to select a parser.
    pub language_extensions: HashMap<String, String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
    pub max_workers: usize,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        let mut language_extensions = HashMap::new();
        language_extensions.insert("py".to_string(), "python".to_string());

        Self {
            directory_skip_pattern: r"^\..*|^__[A-Za-z]*__$|^node_modules$".to_string(),
            max_filesize_mb: 10.0,
            indexed_extensions: DEFAULT_INDEXED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            language_extensions,
            chunk_size: 400,
            chunk_overlap: 0,
            batch_size: 64,
            max_workers: 16,
        }
    }
}

const DEFAULT_INDEXED_EXTENSIONS: &[&str] = &[
    "txt", "md", "py", "cpp", "c", "hpp", "h", "sh", "zsh", "bash", "js", "jsx", "ts", "tsx",
    "rs", "cs", "java", "go", "r", "html", "css", "scss", "sass", "php", "rb", "conf", "ini",
    "json", "yaml", "yml", "toml", "lock",
];
