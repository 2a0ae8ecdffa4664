//! Embedding provider trait and implementations.
//!
//! - `EmbeddingProvider` is the contract with the external embedding
//!   collaborator: `embed(text) -> float[N]`, N fixed per process.
//! - `HashEmbedding` produces deterministic hash-derived vectors with no
//!   network dependency. It doubles as the local fallback and the test
//!   embedding.
//! - `ResilientEmbedding` wraps a primary provider with a bounded timeout
//!   and falls back to `HashEmbedding` on failure, so ingestion never
//!   stalls on a slow or absent provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use recall_core::error::{RecallError, Result};

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors that capture
/// semantic meaning. Used for both ingestion (indexing) and search (query).
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(&self, text: &str) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;

    /// Return the dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingProvider`] for dynamic dispatch.
///
/// Because `EmbeddingProvider::embed` returns `impl Future` it is not
/// object-safe. This trait uses a boxed future instead, allowing
/// `Arc<dyn DynEmbeddingProvider>` to be stored in structs without
/// generics. A blanket implementation covers every `EmbeddingProvider`.
pub trait DynEmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>>;

    /// Return the dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingProvider> DynEmbeddingProvider for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingProvider::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// HashEmbedding - deterministic local vectors
// ---------------------------------------------------------------------------

/// Deterministic hash-based embedding of configurable dimensionality.
///
/// Identical inputs always produce identical L2-normalized vectors, which
/// keeps search and dedup behavior reproducible without a real model.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dimensions: usize,
}

impl HashEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize to unit length, matching a real provider's output.
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingProvider for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(RecallError::MalformedInput(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// ResilientEmbedding - bounded timeout with deterministic fallback
// ---------------------------------------------------------------------------

/// Decorator that bounds every provider call and falls back locally.
///
/// A primary provider failure or timeout is recovered by re-embedding with
/// the deterministic hash fallback of the same dimensionality; it is never
/// surfaced to the caller as an error.
pub struct ResilientEmbedding {
    primary: Arc<dyn DynEmbeddingProvider>,
    fallback: HashEmbedding,
    timeout: Duration,
}

impl ResilientEmbedding {
    /// Wrap a primary provider. The fallback uses the primary's declared
    /// dimensionality so that the store never sees mixed vector lengths.
    pub fn new(primary: Arc<dyn DynEmbeddingProvider>, timeout: Duration) -> Self {
        let dimensions = primary.dimensions();
        Self {
            primary,
            fallback: HashEmbedding::new(dimensions),
            timeout,
        }
    }
}

impl EmbeddingProvider for ResilientEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match tokio::time::timeout(self.timeout, self.primary.embed_boxed(text)).await {
            Ok(Ok(vector)) => Ok(vector),
            Ok(Err(e)) => {
                // Input errors are the caller's fault, not the provider's.
                if matches!(e, RecallError::MalformedInput(_)) {
                    return Err(e);
                }
                warn!("Embedding provider failed, using local fallback: {}", e);
                self.fallback.embed(text).await
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Embedding provider timed out, using local fallback"
                );
                self.fallback.embed(text).await
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.fallback.dimensions
    }
}
