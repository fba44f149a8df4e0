use codeindex_chunker::{ChunkType, Chunker, ChunkerConfig, CodeChunk};

const RUST_STORE_IMPLS: &str = r#"
mod catalog {
    pub struct FileRow<'a> {
        pub path: &'a str,
    }

    pub struct LockHandle;
}

use std::fmt;

impl fmt::Display for catalog::LockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = "lock held";
        write!(f, "{label}")
    }
}

impl<'a> catalog::FileRow<'a> {
    pub fn extension(&self) -> &str {
        let path = self.path;
        path.rsplit('.').next().unwrap_or("")
    }
}

impl<'a> AsRef<str> for &'a str {
    fn as_ref(&self) -> &str {
        let slice = *self;
        slice
    }
}
"#;

fn rust_chunks(code: &str) -> Vec<CodeChunk> {
    let chunker = Chunker::new(ChunkerConfig::default());
    chunker
        .chunk_str(code, Some("catalog.rs"))
        .expect("chunking Rust impls")
}

fn method_parent_scope(chunks: &[CodeChunk], name: &str) -> String {
    let chunk = chunks
        .iter()
        .find(|chunk| {
            chunk.metadata.chunk_type == Some(ChunkType::Method)
                && chunk.metadata.symbol_name.as_deref() == Some(name)
        })
        .unwrap_or_else(|| panic!("missing method chunk for {name}"));

    chunk
        .metadata
        .parent_scope
        .clone()
        .unwrap_or_else(|| panic!("missing parent_scope for {name}"))
}

#[test]
fn ast_analyzer_trait_impl_uses_type_after_for_keyword() {
    let chunks = rust_chunks(RUST_STORE_IMPLS);
    let fmt_scope = method_parent_scope(&chunks, "fmt");

    assert_eq!(fmt_scope, "catalog::LockHandle");
}

#[test]
fn ast_analyzer_preserves_scoped_and_reference_targets() {
    let chunks = rust_chunks(RUST_STORE_IMPLS);

    let extension_scope = method_parent_scope(&chunks, "extension");
    let as_ref_scope = method_parent_scope(&chunks, "as_ref");

    assert_eq!(extension_scope, "catalog::FileRow<'a>");
    assert_eq!(as_ref_scope, "&'a str");
}
