//! Farm settings service
//!
//! Settings live in a single document with a fixed id. Reads never fail:
//! a missing, unreadable or malformed document yields the configured defaults.

use std::sync::Arc;

use shared::{validate_farm_settings, FarmSettings};

use crate::error::{AppError, AppResult};
use crate::store::{Document, DocumentId, DocumentStore, Fields, StoreError};

#[derive(Clone)]
pub struct FarmSettingsService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    document_id: String,
    defaults: FarmSettings,
}

impl FarmSettingsService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        defaults: FarmSettings,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            document_id: document_id.into(),
            defaults,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn defaults(&self) -> &FarmSettings {
        &self.defaults
    }

    /// Current settings, creating the settings document on first use
    pub async fn get_settings(&self) -> FarmSettings {
        match self.store.get_document(&self.collection, &self.document_id).await {
            Ok(Some(document)) => self.settings_from_document(document),
            Ok(None) => {
                tracing::info!(
                    "Settings document {} not found, creating it with defaults",
                    self.document_id
                );
                self.create_defaults().await;
                self.defaults.clone()
            }
            Err(e) => {
                tracing::warn!("Failed to read farm settings, using defaults: {}", e);
                self.defaults.clone()
            }
        }
    }

    /// Validate and persist new settings. Nothing is written when validation fails.
    pub async fn update_settings(&self, settings: FarmSettings) -> AppResult<FarmSettings> {
        validate_farm_settings(&settings)?;

        let fields = settings.to_fields().map_err(StoreError::from)?;
        let document = self.upsert(fields).await?;

        tracing::info!("Farm settings updated");

        FarmSettings::from_partial(&self.defaults, document.fields).map_err(|e| {
            AppError::DataIntegrity(format!("stored farm settings are unreadable: {}", e))
        })
    }

    async fn upsert(&self, fields: Fields) -> Result<Document, StoreError> {
        match self
            .store
            .update_document(&self.collection, &self.document_id, fields.clone())
            .await
        {
            Err(StoreError::NotFound { .. }) => {
                let created = self
                    .store
                    .create_document(
                        &self.collection,
                        DocumentId::Fixed(self.document_id.clone()),
                        fields.clone(),
                    )
                    .await;

                match created {
                    // Someone else created it first
                    Err(StoreError::AlreadyExists { .. }) => {
                        self.store
                            .update_document(&self.collection, &self.document_id, fields)
                            .await
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn create_defaults(&self) {
        let fields = match self.defaults.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                tracing::error!("Failed to serialize default farm settings: {}", e);
                return;
            }
        };

        match self
            .store
            .create_document(
                &self.collection,
                DocumentId::Fixed(self.document_id.clone()),
                fields,
            )
            .await
        {
            Ok(_) | Err(StoreError::AlreadyExists { .. }) => {}
            Err(e) => tracing::warn!("Failed to create default farm settings: {}", e),
        }
    }

    fn settings_from_document(&self, document: Document) -> FarmSettings {
        match FarmSettings::from_partial(&self.defaults, document.fields) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Stored farm settings are malformed, using defaults: {}", e);
                self.defaults.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    fn service(store: Arc<MemoryDocumentStore>) -> FarmSettingsService {
        FarmSettingsService::new(store, "farm_settings", "farm_settings", FarmSettings::default())
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    #[tokio::test]
    async fn test_first_read_creates_defaults() {
        let store = Arc::new(MemoryDocumentStore::new());
        let settings = service(store.clone()).get_settings().await;

        assert_eq!(settings, FarmSettings::default());
        assert_eq!(store.count("farm_settings").await, 1);

        let doc = store
            .get_document("farm_settings", "farm_settings")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["update_frequency"], json!(30));
    }

    #[tokio::test]
    async fn test_partial_document_is_completed_from_defaults() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .create_document(
                "farm_settings",
                DocumentId::Fixed("farm_settings".into()),
                fields(json!({ "units": "imperial", "update_frequency": 15 })),
            )
            .await
            .unwrap();

        let settings = service(store).get_settings().await;
        assert_eq!(settings.units, shared::Units::Imperial);
        assert_eq!(settings.update_frequency, 15);
        assert_eq!(settings.farm_latitude, FarmSettings::default().farm_latitude);
    }

    #[tokio::test]
    async fn test_malformed_document_reads_as_defaults() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .create_document(
                "farm_settings",
                DocumentId::Fixed("farm_settings".into()),
                fields(json!({ "update_frequency": "often" })),
            )
            .await
            .unwrap();

        assert_eq!(service(store).get_settings().await, FarmSettings::default());
    }

    #[tokio::test]
    async fn test_update_creates_then_overwrites() {
        let store = Arc::new(MemoryDocumentStore::new());
        let service = service(store.clone());

        let mut settings = FarmSettings::default();
        settings.update_frequency = 60;
        let saved = service.update_settings(settings.clone()).await.unwrap();
        assert_eq!(saved, settings);

        settings.farm_latitude = Decimal::new(-335, 1);
        service.update_settings(settings.clone()).await.unwrap();

        assert_eq!(service.get_settings().await, settings);
        assert_eq!(store.count("farm_settings").await, 1);
    }

    #[tokio::test]
    async fn test_invalid_update_writes_nothing() {
        let store = Arc::new(MemoryDocumentStore::new());
        let service = service(store.clone());

        let mut settings = FarmSettings::default();
        settings.farm_latitude = Decimal::from(95);

        let err = service.update_settings(settings).await.unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "farm_latitude"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.count("farm_settings").await, 0);
    }
}
