//! In-process document store, used for tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Document, DocumentId, DocumentList, DocumentQuery, DocumentStore, Fields, SortOrder, StoreError};

/// Collections kept in insertion order, which is creation order
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn create_document(
        &self,
        collection: &str,
        id: DocumentId,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let id = id.resolve();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.iter().any(|doc| doc.id == id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id,
            });
        }

        let now = Utc::now();
        let document = Document {
            id,
            collection: collection.to_string(),
            created_at: now,
            updated_at: now,
            fields,
        };
        docs.push(document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        document.fields.extend(fields);
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn list_documents(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<DocumentList, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(DocumentList::default());
        };

        let mut matching: Vec<&Document> = docs.iter().filter(|doc| query.matches(&doc.fields)).collect();
        if query.order == SortOrder::CreatedDesc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let documents = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(limit)
            .cloned()
            .collect();

        Ok(DocumentList { total, documents })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
