use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error(transparent)]
    Store(#[from] codeindex_store::StoreError),

    #[error("tree-sitter failed to set language: {0}")]
    Language(String),

    #[error("file is not valid UTF-8: {0}")]
    Encoding(String),
}
