//! Document store abstraction
//!
//! The service persists everything as schemaless documents grouped into
//! collections. Each document carries store-assigned metadata (id and
//! timestamps) next to its JSON fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// JSON fields of a document
pub type Fields = Map<String, Value>;

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Fields,
}

/// Id for a new document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    /// Let the store generate a unique id
    Unique,
    Fixed(String),
}

impl DocumentId {
    pub fn resolve(self) -> String {
        match self {
            DocumentId::Unique => Uuid::new_v4().simple().to_string(),
            DocumentId::Fixed(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Top-level field equals the given JSON value
    Equal(String, Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first (insertion order)
    #[default]
    CreatedAsc,
    CreatedDesc,
}

/// Filtered, ordered, paged listing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<Filter>,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal(field.into(), value.into()));
        self
    }

    pub fn order_desc_created(mut self) -> Self {
        self.order = SortOrder::CreatedDesc;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a document's fields satisfy every filter
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Equal(field, value) => fields.get(field) == Some(value),
        })
    }
}

/// Result of a listing: `total` counts every match, not just the page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("document {id} already exists in {collection}")]
    AlreadyExists { collection: String, id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Generic document storage used by every service
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn create_document(
        &self,
        collection: &str,
        id: DocumentId,
        fields: Fields,
    ) -> Result<Document, StoreError>;

    /// Merge `fields` into an existing document
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError>;

    async fn list_documents(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<DocumentList, StoreError>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> Result<(), StoreError>;
}
