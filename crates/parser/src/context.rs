use codeindex_store::{File, Store};
use std::path::Path;
use tree_sitter::Tree;

/// Everything a `Parser` needs to populate the store from one file. One
/// `ParseContext` is built per file per pipeline stage; `extract_definitions`
/// and `extract_references` each parse `source` independently, matching the
/// two-phase contract where the two calls may run in different worker tasks.
pub struct ParseContext<'a> {
    pub project_id: i64,
    pub project_root: &'a Path,
    pub file: &'a File,
    pub store: &'a Store,
    pub source: &'a str,
    pub tree: Option<Tree>,
}

impl<'a> ParseContext<'a> {
    pub fn new(project_id: i64, project_root: &'a Path, file: &'a File, store: &'a Store, source: &'a str) -> Self {
        Self {
            project_id,
            project_root,
            file,
            store,
            source,
            tree: None,
        }
    }

    /// The file's path relative to the project root, as forward-slash
    /// separated dotted module segments, with a trailing `__init__` segment
    /// dropped.
    pub fn module_qualifier(&self) -> String {
        module_qualifier_for(self.project_root, &self.file.path)
    }
}

pub fn module_qualifier_for(project_root: &Path, file_path: &str) -> String {
    let relative = Path::new(file_path)
        .strip_prefix(project_root)
        .unwrap_or_else(|_| Path::new(file_path));
    let without_suffix = relative.with_extension("");
    let mut parts: Vec<String> = without_suffix
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }
    parts.join(".")
}
