//! Filtered similarity search with composite ranking.
//!
//! Every query is an O(n) scan over the store: records passing all filters
//! are scored by a weighted blend of semantic similarity, importance,
//! urgency, and recency, then sorted and truncated. The scan never mutates
//! the store, so cancelling a query has no side effects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recall_core::config::RankingConfig;
use recall_core::error::{RecallError, Result};
use recall_core::types::{ContentType, UrgencyLevel};

use crate::embedding::DynEmbeddingProvider;
use crate::store::{DerivedMetadata, VectorStore};

/// Filters applied before any record is scored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Minimum importance score (inclusive).
    pub min_importance: Option<f64>,
    /// Exact urgency level.
    pub urgency: Option<UrgencyLevel>,
    /// Exact content type.
    pub content_type: Option<ContentType>,
    /// Timestamp window start (inclusive).
    pub since: Option<DateTime<Utc>>,
    /// Timestamp window end (inclusive).
    pub until: Option<DateTime<Utc>>,
}

impl SearchFilters {
    /// Whether a record's metadata passes every set filter.
    pub fn matches(&self, meta: &DerivedMetadata) -> bool {
        if let Some(min) = self.min_importance {
            if meta.importance_score < min {
                return false;
            }
        }
        if let Some(urgency) = self.urgency {
            if meta.urgency_level != urgency {
                return false;
            }
        }
        if let Some(content_type) = self.content_type {
            if meta.content_type != content_type {
                return false;
            }
        }
        if let Some(since) = self.since {
            if meta.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if meta.timestamp > until {
                return false;
            }
        }
        true
    }
}

/// A single ranked search result with its score breakdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: Uuid,
    /// Weighted blend of the four factors below.
    pub composite: f64,
    pub semantic: f64,
    pub importance_norm: f64,
    pub urgency_factor: f64,
    pub recency_factor: f64,
    /// The text that was embedded, for snippets.
    pub document: String,
    pub metadata: DerivedMetadata,
    /// Short human-readable account of why this result ranked.
    pub explanation: String,
}

/// Search engine combining the vector store with an embedding provider.
pub struct SemanticSearch {
    store: VectorStore,
    embedder: Arc<dyn DynEmbeddingProvider>,
    ranking: RankingConfig,
}

impl SemanticSearch {
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn DynEmbeddingProvider>,
        ranking: RankingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            ranking,
        }
    }

    /// Embed the query and return the top `limit` filtered results.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<RankedResult>> {
        self.search_at(query, filters, limit, Utc::now()).await
    }

    /// Like [`search`](Self::search), with an explicit reference time for
    /// the recency factor.
    pub async fn search_at(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedResult>> {
        let query_vec = self.embedder.embed_boxed(query).await?;

        // A provider that changed dimensionality mid-process is a fatal
        // configuration error; reject rather than silently degrade.
        if let Some(expected) = self.store.dimensions() {
            if query_vec.len() != expected {
                return Err(RecallError::DimensionMismatch {
                    expected,
                    actual: query_vec.len(),
                });
            }
        }

        let mut results: Vec<RankedResult> = Vec::new();
        for (id, record) in self.store.snapshot() {
            if !filters.matches(&record.metadata) {
                continue;
            }

            let semantic = cosine_similarity(&query_vec, &record.embedding)?;
            let importance_norm = record.metadata.importance_score / 10.0;
            let urgency_factor = record.metadata.urgency_level.multiplier();
            let recency_factor = self.recency_factor(record.metadata.timestamp, now);

            let composite = self.ranking.semantic_weight * semantic
                + self.ranking.importance_weight * importance_norm
                + self.ranking.urgency_weight * urgency_factor
                + self.ranking.recency_weight * recency_factor;

            let explanation =
                explain(semantic, &record.metadata, hours_since(record.metadata.timestamp, now));

            results.push(RankedResult {
                id,
                composite,
                semantic,
                importance_norm,
                urgency_factor,
                recency_factor,
                document: record.document,
                metadata: record.metadata,
                explanation,
            });
        }

        results.sort_by(|a, b| {
            b.composite
                .partial_cmp(&a.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    /// Exponential decay against the time since the last submission,
    /// floored so old items never disappear from ranking entirely.
    fn recency_factor(&self, last_submitted: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let hours = hours_since(last_submitted, now);
        (-hours / self.ranking.recency_half_life_hours)
            .exp()
            .max(self.ranking.recency_floor)
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}

/// Cosine similarity of two equal-length vectors.
///
/// Mismatched lengths mean the embedding provider changed mid-process;
/// that is an error, not a zero score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RecallError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (mag_a * mag_b))
}

/// Assemble a short relevance explanation from threshold checks.
fn explain(semantic: f64, meta: &DerivedMetadata, hours_since_last: f64) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if semantic > 0.8 {
        parts.push("high semantic match");
    } else if semantic > 0.6 {
        parts.push("good semantic match");
    }
    if meta.importance_score >= 8.0 {
        parts.push("high importance");
    }
    if meta.urgency_level == UrgencyLevel::High {
        parts.push("marked urgent");
    }
    if meta.submission_count >= 3 {
        parts.push("submitted repeatedly");
    }
    if hours_since_last <= 24.0 {
        parts.push("recently active");
    }

    if parts.is_empty() {
        "related content".to_string()
    } else {
        parts.join(", ")
    }
}

fn hours_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - timestamp).num_seconds() as f64 / 3600.0).max(0.0)
}
