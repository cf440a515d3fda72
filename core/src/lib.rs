use serde::{Deserialize, Serialize};

pub mod error;
pub mod eval;
pub mod index;
pub mod metrics;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use error::{Error, Result};
pub use index::{IndexBuilder, InvertedIndex, Posting, TermEntry};
pub use query::{BooleanQueryProcessor, VectorQueryProcessor};

pub type DocId = u32;
pub type QueryId = u32;

/// A document from the collection. Identifiers are assigned by the
/// collection and stay stable for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub author: String,
    pub body: String,
}

/// A query as read from the query file: an identifier plus raw text.
#[derive(Debug, Clone)]
pub struct Query {
    pub id: QueryId,
    pub text: String,
}
