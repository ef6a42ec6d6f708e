use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] ignore::Error),

    #[error("Graph error: {0}")]
    GraphError(#[from] depchunk_graph::GraphError),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] depchunk_chunker::ChunkerError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
