use crate::chunk::{chunk_doc_id, chunk_doc_metadata, doc_to_chunk, Chunk, ChunkMetadata, RankedChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use ndarray::Array1;
use rusqlite::{params, Connection};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
    pub file_id: Option<Uuid>,
    pub language: Option<String>,
}

/// Persists chunk text and embeddings in SQLite and answers nearest-neighbor
/// queries with a brute-force cosine scan. Appropriate at the scale a
/// single-project per-file index needs; a dedicated ANN index would be
/// premature at this size.
pub struct SqliteVectorStore<E: EmbeddingProvider> {
    conn: Connection,
    embedder: E,
}

impl<E: EmbeddingProvider> SqliteVectorStore<E> {
    pub fn open(path: &Path, embedder: E) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, embedder)
    }

    pub fn open_in_memory(embedder: E) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, embedder)
    }

    fn from_connection(conn: Connection, embedder: E) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS vector_chunks (
                doc_id TEXT PRIMARY KEY,
                file_id TEXT NOT NULL,
                text TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                node_ids TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT '',
                embedding BLOB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS ix_vector_chunks_file ON vector_chunks(file_id);",
        )?;
        Ok(Self { conn, embedder })
    }

    pub fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for chunk in chunks {
            let embedding = self.embedder.embed(&chunk.text)?;
            let metadata = chunk_doc_metadata(chunk);
            tx.execute(
                "INSERT INTO vector_chunks (doc_id, file_id, text, token_count, node_ids, language, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (doc_id) DO UPDATE SET
                    text = excluded.text,
                    token_count = excluded.token_count,
                    node_ids = excluded.node_ids,
                    language = excluded.language,
                    embedding = excluded.embedding",
                params![
                    chunk_doc_id(chunk),
                    chunk.file_id.to_string(),
                    chunk.text,
                    chunk.token_count as i64,
                    metadata.node_ids,
                    metadata.language,
                    encode_embedding(&embedding),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete(&self, doc_ids: &[String]) -> Result<()> {
        for id in doc_ids {
            self.conn
                .execute("DELETE FROM vector_chunks WHERE doc_id = ?1", params![id])?;
        }
        Ok(())
    }

    pub fn get(&self, filter: &ChunkFilter, limit: usize, offset: usize) -> Result<Vec<Chunk>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, text, token_count, node_ids, language, file_id
             FROM vector_chunks
             WHERE (?1 IS NULL OR file_id = ?1) AND (?2 IS NULL OR language = ?2)
             ORDER BY doc_id
             LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt.query_map(
            params![
                filter.file_id.map(|id| id.to_string()),
                filter.language,
                limit as i64,
                offset as i64,
            ],
            |row| {
                let doc_id: String = row.get(0)?;
                let text: String = row.get(1)?;
                let token_count: i64 = row.get(2)?;
                let node_ids: String = row.get(3)?;
                let language: String = row.get(4)?;
                Ok((
                    doc_id,
                    text,
                    ChunkMetadata {
                        token_count: token_count as usize,
                        node_ids,
                        language,
                    },
                ))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (doc_id, text, metadata) = row?;
            out.push(doc_to_chunk(&doc_id, &text, &metadata)?);
        }
        Ok(out)
    }

    /// Embeds `text` and returns the `n` closest chunks, lowest score
    /// (closest) first. Score is `1 - cosine_similarity`.
    pub fn query(&self, text: &str, n: usize, filter: &ChunkFilter) -> Result<Vec<RankedChunk>> {
        let query_embedding = Array1::from_vec(self.embedder.embed(text)?);

        let mut stmt = self.conn.prepare(
            "SELECT doc_id, text, token_count, node_ids, language, embedding
             FROM vector_chunks
             WHERE (?1 IS NULL OR file_id = ?1) AND (?2 IS NULL OR language = ?2)",
        )?;
        let rows = stmt.query_map(
            params![filter.file_id.map(|id| id.to_string()), filter.language],
            |row| {
                let doc_id: String = row.get(0)?;
                let text: String = row.get(1)?;
                let token_count: i64 = row.get(2)?;
                let node_ids: String = row.get(3)?;
                let language: String = row.get(4)?;
                let embedding: Vec<u8> = row.get(5)?;
                Ok((doc_id, text, token_count, node_ids, language, embedding))
            },
        )?;

        let mut scored = Vec::new();
        for row in rows {
            let (doc_id, text, token_count, node_ids, language, embedding) = row?;
            let embedding = Array1::from_vec(decode_embedding(&embedding));
            let score = 1.0 - cosine_similarity(&query_embedding, &embedding);
            let metadata = ChunkMetadata {
                token_count: token_count as usize,
                node_ids,
                language,
            };
            scored.push(RankedChunk {
                chunk: doc_to_chunk(&doc_id, &text, &metadata)?,
                score,
            });
        }

        scored.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n);
        Ok(scored)
    }
}

fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    let dot = a.dot(b);
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn encode_embedding(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::test_support::StubEmbeddingProvider;

    fn chunk(file_id: Uuid, chunk_id: i64, text: &str) -> Chunk {
        Chunk {
            file_id,
            chunk_id,
            text: text.to_string(),
            token_count: text.split_whitespace().count(),
            node_ids: Vec::new(),
            language: Some("python".to_string()),
        }
    }

    #[test]
    fn upsert_then_get_round_trips_text() {
        let store = SqliteVectorStore::open_in_memory(StubEmbeddingProvider { dimensions: 8 }).unwrap();
        let file_id = Uuid::new_v4();
        store.upsert(&[chunk(file_id, 0, "def foo(): pass")]).unwrap();

        let fetched = store.get(&ChunkFilter::default(), 10, 0).unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].text, "def foo(): pass");
    }

    #[test]
    fn query_ranks_identical_text_first() {
        let store = SqliteVectorStore::open_in_memory(StubEmbeddingProvider { dimensions: 8 }).unwrap();
        let file_id = Uuid::new_v4();
        store
            .upsert(&[
                chunk(file_id, 0, "def foo(): pass"),
                chunk(file_id, 1, "completely unrelated text about cats"),
            ])
            .unwrap();

        let results = store.query("def foo(): pass", 2, &ChunkFilter::default()).unwrap();
        assert_eq!(results[0].chunk.text, "def foo(): pass");
        assert!(results[0].score <= results[1].score);
    }

    #[test]
    fn delete_removes_chunk() {
        let store = SqliteVectorStore::open_in_memory(StubEmbeddingProvider { dimensions: 8 }).unwrap();
        let file_id = Uuid::new_v4();
        let c = chunk(file_id, 0, "def foo(): pass");
        let id = chunk_doc_id(&c);
        store.upsert(&[c]).unwrap();
        store.delete(&[id]).unwrap();

        assert!(store.get(&ChunkFilter::default(), 10, 0).unwrap().is_empty());
    }

    #[test]
    fn get_filters_by_file_id() {
        let store = SqliteVectorStore::open_in_memory(StubEmbeddingProvider { dimensions: 8 }).unwrap();
        let file_a = Uuid::new_v4();
        let file_b = Uuid::new_v4();
        store
            .upsert(&[chunk(file_a, 0, "alpha"), chunk(file_b, 0, "beta")])
            .unwrap();

        let filtered = store
            .get(
                &ChunkFilter {
                    file_id: Some(file_a),
                    language: None,
                },
                10,
                0,
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text, "alpha");
    }
}
