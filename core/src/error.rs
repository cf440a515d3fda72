use crate::DocId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A document identifier was indexed twice. The index refuses the
    /// second call instead of silently merging postings.
    #[error("document {0} is already indexed")]
    DuplicateDocument(DocId),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A persisted index failed structural validation on load.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Persist(#[from] bincode::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
