//! PostgreSQL-backed document store
//!
//! Documents live in a single `documents` table keyed by (collection, id),
//! with fields stored as JSONB. A sequence column keeps ordering stable when
//! two documents share a creation timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{
    Document, DocumentId, DocumentList, DocumentQuery, DocumentStore, Fields, Filter, SortOrder,
    StoreError,
};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        let fields = match row.data {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        Document {
            id: row.id,
            collection: row.collection,
            created_at: row.created_at,
            updated_at: row.updated_at,
            fields,
        }
    }
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
        for filter in filters {
            match filter {
                Filter::Equal(field, value) => {
                    builder.push(" AND data -> ");
                    builder.push_bind(field.clone());
                    builder.push(" = ");
                    builder.push_bind(value.clone());
                    builder.push("::jsonb");
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn create_document(
        &self,
        collection: &str,
        id: DocumentId,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let id = id.resolve();

        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Value::Object(fields))
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::AlreadyExists {
                    collection: collection.to_string(),
                    id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(fields))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        Ok(row.into())
    }

    async fn list_documents(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<DocumentList, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        count.push_bind(collection.to_string());
        Self::push_filters(&mut count, &query.filters);

        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, collection, data, created_at, updated_at FROM documents WHERE collection = ",
        );
        select.push_bind(collection.to_string());
        Self::push_filters(&mut select, &query.filters);

        match query.order {
            SortOrder::CreatedAsc => select.push(" ORDER BY created_at ASC, seq ASC"),
            SortOrder::CreatedDesc => select.push(" ORDER BY created_at DESC, seq DESC"),
        };

        if let Some(limit) = query.limit {
            select.push(" LIMIT ");
            select.push_bind(i64::from(limit));
        }
        select.push(" OFFSET ");
        select.push_bind(i64::from(query.offset));

        let rows = select
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(DocumentList {
            total: total.max(0) as u64,
            documents: rows.into_iter().map(Document::from).collect(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
