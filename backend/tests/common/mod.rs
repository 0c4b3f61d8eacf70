//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use farm_weather_backend::{
    error::{AppError, AppResult},
    external::WeatherProvider,
    store::{
        Document, DocumentId, DocumentList, DocumentQuery, DocumentStore, Fields,
        MemoryDocumentStore, StoreError,
    },
    AppState, Config,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::Units;

pub fn sample_payload() -> Value {
    json!({
        "coord": { "lon": -8.61, "lat": 41.15 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": 21.5, "feels_like": 21.1, "pressure": 1018, "humidity": 60 },
        "visibility": 10000,
        "wind": { "speed": 4.1, "deg": 320 },
        "dt": 1700000000,
        "sys": { "sunrise": 1699945000, "sunset": 1699981000 },
        "name": "Porto"
    })
}

pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Provider returning a canned payload, or failing when none is set
pub struct StubProvider {
    response: Option<Value>,
    delay: Duration,
    calls: AtomicUsize,
    last_request: Mutex<Option<(Decimal, Decimal, Units)>>,
}

impl StubProvider {
    pub fn returning(payload: Value) -> Self {
        Self {
            response: Some(payload),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(Decimal, Decimal, Units)> {
        *self.last_request.lock().unwrap()
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn fetch_current(
        &self,
        latitude: Decimal,
        longitude: Decimal,
        units: Units,
    ) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((latitude, longitude, units));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.response {
            Some(payload) => Ok(payload.clone()),
            None => Err(AppError::Fetch(
                "Weather API error: 401 Unauthorized - invalid API key".to_string(),
            )),
        }
    }
}

/// In-memory store that refuses writes to one collection
pub struct ReadOnlyCollectionStore {
    pub inner: MemoryDocumentStore,
    pub read_only: String,
}

#[async_trait]
impl DocumentStore for ReadOnlyCollectionStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get_document(collection, id).await
    }

    async fn create_document(
        &self,
        collection: &str,
        id: DocumentId,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        if collection == self.read_only {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }
        self.inner.create_document(collection, id, fields).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        self.inner.update_document(collection, id, fields).await
    }

    async fn list_documents(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<DocumentList, StoreError> {
        self.inner.list_documents(collection, query).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn app_state(store: Arc<dyn DocumentStore>, provider: Arc<dyn WeatherProvider>) -> AppState {
    AppState::new(Config::for_memory_store(), store, provider)
}
