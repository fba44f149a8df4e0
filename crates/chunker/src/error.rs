use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkerError>;

#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("tree-sitter failed to parse the given source")]
    ParseFailed,

    #[error("invalid chunker configuration: {0}")]
    InvalidConfig(String),
}

impl ChunkerError {
    pub fn unsupported_language(name: &str) -> Self {
        Self::UnsupportedLanguage(name.to_string())
    }
}
