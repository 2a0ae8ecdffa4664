//! Engine tying ingestion, scoring, indexing, and querying together.
//!
//! Writes flow repository -> vector index -> catalog; queries flow intent
//! analysis -> filtered semantic search -> response composition. The
//! repository is the only durable surface, everything else rebuilds from it.

pub mod engine;
pub mod repository;

pub use engine::{
    ContentEngine, DeleteOutcome, IngestOutcome, NewContent, QueryOptions, QueryOutcome,
};
pub use repository::{ContentRepository, MemoryRepository};
