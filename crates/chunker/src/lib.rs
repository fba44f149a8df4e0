//! # Code Chunker
//!
//! Splits source files into size-bounded, language-aware chunks for semantic
//! indexing. For languages with AST support, chunks follow syntactic
//! boundaries (functions, methods, types) and carry identifier/import
//! metadata; other files fall back to line-oriented chunking.

mod chunker;
mod contextual_imports;
mod error;
mod language;

pub use chunker::{
    ChunkMetadata, ChunkType, Chunker, ChunkerConfig, ChunkingStrategy, CodeChunk, OverlapStrategy,
};
pub use contextual_imports::{
    extract_identifiers_from_import, extract_imports_from_lines, filter_relevant_imports,
};
pub use error::{ChunkerError, Result};
pub use language::Language;
