//! The content engine: ingestion, indexing, querying, and deletion.
//!
//! The engine holds three views of the same data and keeps them aligned:
//! the repository (system of record), the in-memory catalog keyed by id and
//! fingerprint, and the vector store. Writes go repository first, then
//! index, then catalog; ingestion of one fingerprint is serialized so two
//! concurrent submissions of the same content cannot both create an item.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use recall_core::config::RecallConfig;
use recall_core::error::{RecallError, Result};
use recall_core::types::{
    ContentItem, ContentMetadata, ContentType, FileMetadata, Fingerprint, Submission, UrlMetadata,
};
use recall_ingest::{fingerprint, merge_submission, new_item};
use recall_query::{
    build_search_options, ComposedResponse, EnrichedComposer, LanguageProvider, QueryAnalysis,
    QueryAnalyzer, ResponseComposer,
};
use recall_vector::{
    build_document, DerivedMetadata, DynEmbeddingProvider, EmbeddingRecord, HashEmbedding,
    RankedResult, ResilientEmbedding, SearchFilters, SemanticSearch, VectorStore,
};

use crate::repository::ContentRepository;

/// A piece of content submitted for ingestion.
#[derive(Clone, Debug)]
pub struct NewContent {
    pub content_type: ContentType,
    pub raw_content: String,
    pub metadata: ContentMetadata,
    /// Where the submission came from ("note", "email", "browser", ...).
    pub source: String,
    pub note: Option<String>,
}

impl NewContent {
    pub fn text(raw_content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            raw_content: raw_content.into(),
            metadata: ContentMetadata::default(),
            source: source.into(),
            note: None,
        }
    }

    pub fn url(metadata: UrlMetadata, source: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Url,
            raw_content: metadata.url.clone(),
            metadata: ContentMetadata::Url(metadata),
            source: source.into(),
            note: None,
        }
    }

    pub fn file(raw_content: impl Into<String>, metadata: FileMetadata, source: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::File,
            raw_content: raw_content.into(),
            metadata: ContentMetadata::File(metadata),
            source: source.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// What happened to an ingested submission.
#[derive(Clone, Debug)]
pub enum IngestOutcome {
    /// First sighting of this content; a new item was created.
    Created(ContentItem),
    /// Known content; the submission was merged into the existing item.
    Merged(ContentItem),
}

impl IngestOutcome {
    pub fn item(&self) -> &ContentItem {
        match self {
            IngestOutcome::Created(item) | IngestOutcome::Merged(item) => item,
        }
    }
}

/// Result of a delete request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The id was unknown; nothing changed.
    NotFound,
}

/// Caller-side overrides for a query. Anything set here wins over the
/// values derived from intent analysis.
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    pub min_importance: Option<f64>,
    pub content_type: Option<ContentType>,
}

/// Everything produced by answering one query.
#[derive(Clone, Debug)]
pub struct QueryOutcome {
    pub analysis: QueryAnalysis,
    pub results: Vec<RankedResult>,
    pub response: ComposedResponse,
}

#[derive(Default)]
struct Catalog {
    items: HashMap<Uuid, ContentItem>,
    by_fingerprint: HashMap<Fingerprint, Uuid>,
}

/// Central coordinator over repository, catalog, and vector index.
pub struct ContentEngine {
    config: RecallConfig,
    repository: Arc<dyn ContentRepository>,
    store: VectorStore,
    embedder: Arc<dyn DynEmbeddingProvider>,
    search: SemanticSearch,
    analyzer: QueryAnalyzer,
    composer: EnrichedComposer,
    catalog: RwLock<Catalog>,
    /// One mutex per fingerprint so concurrent resubmissions of the same
    /// content serialize instead of racing to create duplicate items.
    ingest_locks: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
}

impl ContentEngine {
    pub fn new(
        config: RecallConfig,
        repository: Arc<dyn ContentRepository>,
        provider: Arc<dyn DynEmbeddingProvider>,
    ) -> Self {
        // Every embedding call goes through the resilient decorator so a
        // failing or stalled provider degrades to the local fallback
        // instead of surfacing from ingest or query.
        let embedder: Arc<dyn DynEmbeddingProvider> = Arc::new(ResilientEmbedding::new(
            provider,
            Duration::from_millis(config.embedding.timeout_ms),
        ));
        let store = VectorStore::new();
        let search = SemanticSearch::new(store.clone(), embedder.clone(), config.ranking.clone());
        Self {
            composer: EnrichedComposer::template_only(ResponseComposer::default()),
            config,
            repository,
            store,
            embedder,
            search,
            analyzer: QueryAnalyzer::new(),
            catalog: RwLock::new(Catalog::default()),
            ingest_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Build an engine with no external embedding provider, using the
    /// deterministic local embedding at the configured dimensionality.
    pub fn with_local_embedding(
        config: RecallConfig,
        repository: Arc<dyn ContentRepository>,
    ) -> Self {
        let embedder: Arc<dyn DynEmbeddingProvider> =
            Arc::new(HashEmbedding::new(config.embedding.dimensions));
        Self::new(config, repository, embedder)
    }

    /// Enable response enrichment through a language provider.
    pub fn with_language_provider(
        mut self,
        provider: Box<dyn LanguageProvider>,
        timeout: Duration,
    ) -> Self {
        self.composer =
            EnrichedComposer::with_provider(ResponseComposer::default(), provider, timeout);
        self
    }

    /// Reload the catalog and vector index from the repository.
    ///
    /// Returns the number of items indexed. Intended for startup; the
    /// vector store is volatile and never persisted.
    pub async fn rebuild(&self) -> Result<usize> {
        let items = self.repository.get_all().await?;
        self.store.clear()?;

        let mut catalog = self.catalog.write().await;
        catalog.items.clear();
        catalog.by_fingerprint.clear();

        for item in items {
            self.index_item(&item).await?;
            catalog.by_fingerprint.insert(item.fingerprint.clone(), item.id);
            catalog.items.insert(item.id, item);
        }

        let count = catalog.items.len();
        info!(count, "Rebuilt catalog and vector index from repository");
        Ok(count)
    }

    /// Ingest one submission, creating a new item or merging into an
    /// existing one with the same fingerprint.
    pub async fn ingest(&self, content: NewContent) -> Result<IngestOutcome> {
        if content.raw_content.trim().is_empty() {
            return Err(RecallError::MalformedInput(
                "content must not be empty".to_string(),
            ));
        }

        let fp = fingerprint(&content.raw_content);
        if fp == fingerprint("") {
            return Err(RecallError::MalformedInput(
                "content has no indexable text".to_string(),
            ));
        }

        let fp_lock = self.fingerprint_lock(&fp).await;
        let result = {
            let _serialized = fp_lock.lock().await;
            self.ingest_locked(content, &fp).await
        };
        self.release_fingerprint_lock(&fp, fp_lock).await;
        result
    }

    /// The ingest critical section. Callers hold the fingerprint lock.
    async fn ingest_locked(
        &self,
        content: NewContent,
        fp: &Fingerprint,
    ) -> Result<IngestOutcome> {
        let now = Utc::now();
        let mut submission = Submission::new(now, content.source, content.content_type);
        submission.note = content.note;

        let existing_id = self.catalog.read().await.by_fingerprint.get(fp).copied();
        let (item, merged) = match existing_id {
            Some(id) => {
                let mut item = self
                    .catalog
                    .read()
                    .await
                    .items
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| {
                        RecallError::Storage(format!("catalog missing item {}", id))
                    })?;
                merge_submission(&mut item, submission, &self.config.scoring, now);
                (item, true)
            }
            None => {
                let item = new_item(
                    content.content_type,
                    content.raw_content,
                    content.metadata,
                    submission,
                    &self.config.scoring,
                    now,
                );
                (item, false)
            }
        };

        self.repository.upsert(&item).await?;
        self.index_item(&item).await?;

        {
            let mut catalog = self.catalog.write().await;
            catalog.by_fingerprint.insert(item.fingerprint.clone(), item.id);
            catalog.items.insert(item.id, item.clone());
        }

        info!(
            id = %item.id,
            merged,
            submissions = item.submission_count(),
            score = item.importance_score,
            "Ingested submission"
        );
        Ok(if merged {
            IngestOutcome::Merged(item)
        } else {
            IngestOutcome::Created(item)
        })
    }

    /// Delete an item everywhere. Unknown ids are reported, not errors.
    ///
    /// Takes the same per-fingerprint lock as [`ingest`](Self::ingest) so a
    /// delete cannot interleave with a merge of the same content and leave
    /// the item half-removed.
    pub async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        let fp = {
            let catalog = self.catalog.read().await;
            catalog.items.get(&id).map(|item| item.fingerprint.clone())
        };
        let Some(fp) = fp else {
            info!(%id, "Delete requested for unknown item");
            return Ok(DeleteOutcome::NotFound);
        };

        let fp_lock = self.fingerprint_lock(&fp).await;
        let result = {
            let _serialized = fp_lock.lock().await;
            self.delete_locked(id).await
        };
        self.release_fingerprint_lock(&fp, fp_lock).await;
        result
    }

    /// The delete critical section. Callers hold the fingerprint lock.
    async fn delete_locked(&self, id: Uuid) -> Result<DeleteOutcome> {
        let removed = {
            let mut catalog = self.catalog.write().await;
            match catalog.items.remove(&id) {
                Some(item) => {
                    catalog.by_fingerprint.remove(&item.fingerprint);
                    true
                }
                None => false,
            }
        };
        if !removed {
            // The item went away while we waited for the lock.
            info!(%id, "Delete requested for unknown item");
            return Ok(DeleteOutcome::NotFound);
        }

        self.repository.delete(id).await?;
        self.store.remove(id)?;
        info!(%id, "Deleted item");
        Ok(DeleteOutcome::Deleted)
    }

    /// Answer a free-text query: analyze intent, search, compose.
    pub async fn query(&self, text: &str) -> Result<QueryOutcome> {
        self.query_with(text, QueryOptions::default()).await
    }

    /// Like [`query`](Self::query), with caller overrides for the derived
    /// filters and limit.
    pub async fn query_with(&self, text: &str, options: QueryOptions) -> Result<QueryOutcome> {
        if text.trim().is_empty() {
            return Err(RecallError::MalformedInput(
                "query must not be empty".to_string(),
            ));
        }

        let analysis = self.analyzer.analyze(text);
        let now = Utc::now();
        let (derived, derived_limit) = build_search_options(&analysis, &self.config.query, now);
        let filters = SearchFilters {
            min_importance: options.min_importance.or(derived.min_importance),
            content_type: options.content_type.or(derived.content_type),
            ..derived
        };
        let limit = options.limit.unwrap_or(derived_limit);
        let results = self.search.search_at(text, &filters, limit, now).await?;
        let response = self.composer.compose(&analysis, &results).await;

        info!(
            intent = ?analysis.primary_intent,
            results = results.len(),
            "Answered query"
        );
        Ok(QueryOutcome {
            analysis,
            results,
            response,
        })
    }

    pub async fn get(&self, id: Uuid) -> Option<ContentItem> {
        self.catalog.read().await.items.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn fingerprint_lock(&self, fp: &Fingerprint) -> Arc<Mutex<()>> {
        let mut locks = self.ingest_locks.lock().await;
        locks
            .entry(fp.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Remove a fingerprint's lock entry once no other task holds a handle.
    /// Clones are only handed out under the map mutex, so a strong count of
    /// two means only the map entry and `handle` remain.
    async fn release_fingerprint_lock(&self, fp: &Fingerprint, handle: Arc<Mutex<()>>) {
        let mut locks = self.ingest_locks.lock().await;
        if Arc::strong_count(&handle) == 2 {
            locks.remove(fp);
        }
    }

    #[cfg(test)]
    pub(crate) async fn fingerprint_lock_count(&self) -> usize {
        self.ingest_locks.lock().await.len()
    }

    /// Embed the item's searchable document and upsert it into the store.
    async fn index_item(&self, item: &ContentItem) -> Result<()> {
        let document = build_document(item);
        let embedding = self.embedder.embed_boxed(&document).await?;
        self.store.upsert(
            item.id,
            EmbeddingRecord {
                embedding,
                document,
                metadata: DerivedMetadata::from_item(item),
            },
        )
    }
}
