use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] codeindex_store::StoreError),

    #[error("parser error: {0}")]
    Parser(#[from] codeindex_parser::ParserError),

    #[error("chunker error: {0}")]
    Chunker(#[from] codeindex_chunker::ChunkerError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] codeindex_vector_store::VectorStoreError),

    #[error("invalid project root: {0}")]
    InvalidPath(String),

    #[error("project {0} not found")]
    ProjectNotFound(i64),

    #[error("indexing lock for project {0} is already held")]
    LockHeld(i64),

    #[error("worker task panicked: {0}")]
    TaskPanicked(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
