//! Durable storage contract for content items.
//!
//! The engine owns the in-memory catalog and the vector store; the
//! repository is the system of record it writes through to. The vector
//! store is never persisted, it is rebuilt from the repository on startup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use recall_core::error::Result;
use recall_core::types::ContentItem;

/// System-of-record storage for content items.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Load every stored item.
    async fn get_all(&self) -> Result<Vec<ContentItem>>;

    /// Insert or replace an item by id.
    async fn upsert(&self, item: &ContentItem) -> Result<()>;

    /// Remove an item by id. Removing an unknown id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository backed by a process-local map. Suitable for tests and
/// single-process deployments without durability requirements.
#[derive(Default)]
pub struct MemoryRepository {
    items: RwLock<HashMap<Uuid, ContentItem>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn get_all(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn upsert(&self, item: &ContentItem) -> Result<()> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.items.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recall_core::config::ScoringConfig;
    use recall_core::types::{ContentMetadata, ContentType, Submission};
    use recall_ingest::new_item;

    fn item(text: &str) -> ContentItem {
        let now = Utc::now();
        new_item(
            ContentType::Text,
            text.to_string(),
            ContentMetadata::default(),
            Submission::new(now, "note", ContentType::Text),
            &ScoringConfig::default(),
            now,
        )
    }

    #[tokio::test]
    async fn test_upsert_and_get_all() {
        let repo = MemoryRepository::new();
        repo.upsert(&item("buy milk")).await.unwrap();
        repo.upsert(&item("read the paper")).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let repo = MemoryRepository::new();
        let mut stored = item("buy milk");
        repo.upsert(&stored).await.unwrap();

        stored.importance_score = 9.0;
        repo.upsert(&stored).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].importance_score, 9.0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryRepository::new();
        let stored = item("buy milk");
        repo.upsert(&stored).await.unwrap();

        repo.delete(stored.id).await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());

        repo.delete(stored.id).await.unwrap();
    }
}
