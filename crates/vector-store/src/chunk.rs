use crate::error::{Result, VectorStoreError};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub file_id: Uuid,
    pub chunk_id: i64,
    pub text: String,
    pub token_count: usize,
    pub node_ids: Vec<Uuid>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RankedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// `"<file_id>:<chunk_id>"` — the composite id the vector store indexes
/// documents under.
pub fn doc_id(file_id: Uuid, chunk_id: i64) -> String {
    format!("{file_id}:{chunk_id}")
}

pub fn chunk_doc_id(chunk: &Chunk) -> String {
    doc_id(chunk.file_id, chunk.chunk_id)
}

pub fn split_doc_id(id: &str) -> Result<(Uuid, i64)> {
    let (file_id, chunk_id) = id
        .split_once(':')
        .ok_or_else(|| VectorStoreError::MalformedDocId(id.to_string()))?;
    let file_id = Uuid::parse_str(file_id).map_err(|_| VectorStoreError::MalformedDocId(id.to_string()))?;
    let chunk_id: i64 = chunk_id
        .parse()
        .map_err(|_| VectorStoreError::MalformedDocId(id.to_string()))?;
    Ok((file_id, chunk_id))
}

/// Metadata stored alongside a chunk's embedding: token count, comma-joined
/// node ids, and language, exactly as carried by the index document.
#[derive(Debug, Clone, Default)]
pub struct ChunkMetadata {
    pub token_count: usize,
    pub node_ids: String,
    pub language: String,
}

pub fn chunk_doc_metadata(chunk: &Chunk) -> ChunkMetadata {
    ChunkMetadata {
        token_count: chunk.token_count,
        node_ids: chunk
            .node_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(","),
        language: chunk.language.clone().unwrap_or_default(),
    }
}

pub fn split_doc_metadata(metadata: &ChunkMetadata) -> Vec<Uuid> {
    if metadata.node_ids.is_empty() {
        Vec::new()
    } else {
        metadata
            .node_ids
            .split(',')
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect()
    }
}

pub fn doc_to_chunk(id: &str, text: &str, metadata: &ChunkMetadata) -> Result<Chunk> {
    let (file_id, chunk_id) = split_doc_id(id)?;
    Ok(Chunk {
        file_id,
        chunk_id,
        text: text.to_string(),
        token_count: metadata.token_count,
        node_ids: split_doc_metadata(metadata),
        language: (!metadata.language.is_empty()).then(|| metadata.language.clone()),
    })
}
