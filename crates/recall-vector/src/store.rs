//! In-memory vector store keyed by content item id.
//!
//! The store is volatile and rebuildable: every record is rederived from
//! its `ContentItem` by re-embedding, never hand-edited. Upserts replace
//! whole records, so a concurrent search can never observe a partially
//! written entry. Dimensionality is pinned by the first upsert; a vector
//! of any other length afterwards is a configuration error.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recall_core::error::{RecallError, Result};
use recall_core::types::{ContentItem, ContentType, UrgencyLevel};

/// Flattened, query-filterable projection of a `ContentItem`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetadata {
    pub content_type: ContentType,
    /// Timestamp of the most recent submission.
    pub timestamp: DateTime<Utc>,
    pub importance_score: f64,
    pub urgency_level: UrgencyLevel,
    pub submission_count: usize,
    pub tags: Vec<String>,
    pub domain: Option<String>,
    pub url: Option<String>,
    pub file_name: Option<String>,
}

impl DerivedMetadata {
    /// Project an item into its filterable form.
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            content_type: item.content_type,
            timestamp: item.timestamp,
            importance_score: item.importance_score,
            urgency_level: item.urgency_level,
            submission_count: item.submission_count(),
            tags: item.contextual_tags.clone(),
            domain: item.metadata.domain().map(String::from),
            url: item.metadata.url().map(String::from),
            file_name: item.metadata.file_name().map(String::from),
        }
    }
}

/// One entry in the vector store, 1:1 with a `ContentItem`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub embedding: Vec<f32>,
    /// The exact text that was embedded, kept for snippets and explanation.
    pub document: String,
    pub metadata: DerivedMetadata,
}

struct StoreInner {
    records: HashMap<Uuid, EmbeddingRecord>,
    /// Pinned by the first upsert; never changes afterwards.
    dimensions: Option<usize>,
}

/// Thread-safe in-memory store of embedding records.
#[derive(Clone)]
pub struct VectorStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                records: HashMap::new(),
                dimensions: None,
            })),
        }
    }

    /// Insert or replace the record for an id.
    ///
    /// The replacement is atomic: readers see either the old record or the
    /// new one, never a mix. Returns `DimensionMismatch` if the vector
    /// length differs from the pinned store dimensionality.
    pub fn upsert(&self, id: Uuid, record: EmbeddingRecord) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| RecallError::Storage(format!("lock poisoned: {}", e)))?;

        match inner.dimensions {
            None => inner.dimensions = Some(record.embedding.len()),
            Some(expected) if expected != record.embedding.len() => {
                return Err(RecallError::DimensionMismatch {
                    expected,
                    actual: record.embedding.len(),
                });
            }
            Some(_) => {}
        }

        inner.records.insert(id, record);
        Ok(())
    }

    /// Remove the record for an id. Idempotent if absent.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| RecallError::Storage(format!("lock poisoned: {}", e)))?;
        inner.records.remove(&id);
        Ok(())
    }

    /// Fetch a single record by id.
    pub fn get(&self, id: Uuid) -> Option<EmbeddingRecord> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.records.get(&id).cloned())
    }

    /// Clone out the full record set for a linear scan.
    pub fn snapshot(&self) -> Vec<(Uuid, EmbeddingRecord)> {
        self.inner
            .read()
            .map(|inner| {
                inner
                    .records
                    .iter()
                    .map(|(id, rec)| (*id, rec.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every record and unpin the dimensionality.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| RecallError::Storage(format!("lock poisoned: {}", e)))?;
        inner.records.clear();
        inner.dimensions = None;
        Ok(())
    }

    /// The pinned vector dimensionality, if any record has been stored.
    pub fn dimensions(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|inner| inner.dimensions)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}
