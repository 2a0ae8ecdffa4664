//! In-memory semantic vector store with composite ranking.
//!
//! Provides the embedding provider contract (with a deterministic local
//! fallback), the volatile record store keyed by item id, the embeddable
//! document builder, and filtered search blending semantic similarity with
//! importance, urgency, and recency.

pub mod document;
pub mod embedding;
pub mod search;
pub mod store;

pub use document::build_document;
pub use embedding::{DynEmbeddingProvider, EmbeddingProvider, HashEmbedding, ResilientEmbedding};
pub use search::{cosine_similarity, RankedResult, SearchFilters, SemanticSearch};
pub use store::{DerivedMetadata, EmbeddingRecord, VectorStore};
