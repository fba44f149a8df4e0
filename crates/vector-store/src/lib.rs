//! # Code Index Vector Store
//!
//! Embeds and persists code chunks, and answers nearest-neighbor text
//! queries over them. `SqliteVectorStore` owns both the embedding call and
//! the storage — callers never handle raw vectors.

mod chunk;
mod embedding;
mod error;
mod store;

pub use chunk::{
    chunk_doc_id, chunk_doc_metadata, doc_id, doc_to_chunk, split_doc_id, split_doc_metadata,
    Chunk, ChunkMetadata, RankedChunk,
};
pub use embedding::{EmbeddingProvider, OrtEmbeddingProvider};
pub use error::{Result, VectorStoreError};
pub use store::{ChunkFilter, SqliteVectorStore};

#[cfg(any(test, feature = "test-util"))]
pub use embedding::test_support;
