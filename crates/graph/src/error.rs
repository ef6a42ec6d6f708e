use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Language error: {0}")]
    LanguageError(String),

    #[error("File not in graph: {0}")]
    FileNotFound(PathBuf),
}
