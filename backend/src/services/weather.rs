//! Weather pipeline: fetch, transform, persist and read back observations

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use shared::{
    validate_page_request, CombinedResult, PageRequest, WeatherHistory, WeatherObservation,
    WeatherRecord,
};

use crate::error::{AppError, AppResult, CycleError};
use crate::external::WeatherProvider;
use crate::services::recommendation::RecommendationService;
use crate::services::settings::FarmSettingsService;
use crate::services::transform::{transform_observation, ConditionInputs};
use crate::store::{Document, DocumentId, DocumentQuery, DocumentStore, Fields};

type CycleFuture = Shared<BoxFuture<'static, Result<CombinedResult, CycleError>>>;

pub struct WeatherPipeline {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn WeatherProvider>,
    settings: FarmSettingsService,
    recommendations: RecommendationService,
    collection: String,
    single_flight: bool,
    in_flight: Mutex<Option<CycleFuture>>,
}

impl WeatherPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn WeatherProvider>,
        settings: FarmSettingsService,
        recommendations: RecommendationService,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
            recommendations,
            collection: collection.into(),
            single_flight: true,
            in_flight: Mutex::new(None),
        }
    }

    /// When enabled, callers arriving while a cycle runs share its outcome
    /// instead of starting another one.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Run one fetch-update cycle.
    ///
    /// With single-flight on, the cycle runs in its own task and clears the
    /// in-flight slot when it finishes, so it completes even if every caller
    /// stops waiting.
    pub async fn run_update_cycle(self: &Arc<Self>) -> Result<CombinedResult, CycleError> {
        if !self.single_flight {
            return self.execute_cycle().await;
        }

        let cycle = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(running) if running.peek().is_none() => {
                    tracing::debug!("Joining in-flight weather update");
                    running.clone()
                }
                _ => {
                    let cycle = self.spawn_cycle();
                    *slot = Some(cycle.clone());
                    cycle
                }
            }
        };

        cycle.await
    }

    fn spawn_cycle(self: &Arc<Self>) -> CycleFuture {
        let pipeline = Arc::clone(self);
        let task = tokio::spawn(async move {
            let outcome = pipeline.execute_cycle().await;
            // Cleared before the task returns, so no caller can observe a
            // finished cycle still parked in the slot
            pipeline
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            outcome
        });

        async move {
            task.await.unwrap_or_else(|e| {
                tracing::error!("Weather update task failed: {}", e);
                Err(CycleError::Aborted(e.to_string()))
            })
        }
        .boxed()
        .shared()
    }

    async fn execute_cycle(&self) -> Result<CombinedResult, CycleError> {
        let settings = self.settings.get_settings().await;
        let coordinates = settings.coordinates();

        tracing::info!(
            "Fetching weather for {}, {} ({})",
            coordinates.latitude,
            coordinates.longitude,
            settings.units
        );

        let raw = self
            .provider
            .fetch_current(coordinates.latitude, coordinates.longitude, settings.units)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch weather data: {}", e);
                CycleError::Fetch(e.to_string())
            })?;

        let observation = transform_observation(&raw, coordinates).map_err(|e| {
            tracing::error!("Failed to transform weather data: {}", e);
            CycleError::Transform(e.to_string())
        })?;

        let document = self.persist(&observation).await?;

        let category = ConditionInputs::from_payload(&raw).classify();
        let recommendations = self.recommendations.recommendations_for(category).await;

        let weather = record_from_document(document).map_err(|e| {
            tracing::error!("Stored weather record could not be read back: {}", e);
            CycleError::Persist(e.to_string())
        })?;

        tracing::info!(id = %weather.id, condition = %category, "Weather data updated");

        Ok(CombinedResult {
            weather,
            recommendations,
        })
    }

    async fn persist(&self, observation: &WeatherObservation) -> Result<Document, CycleError> {
        let fields = match serde_json::to_value(observation) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Fields::new(),
            Err(e) => {
                tracing::error!("Failed to serialize weather observation: {}", e);
                return Err(CycleError::Persist(e.to_string()));
            }
        };

        self.store
            .create_document(&self.collection, DocumentId::Unique, fields)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save weather data: {}", e);
                CycleError::Persist(e.to_string())
            })
    }

    /// Most recent stored record with recommendations recomputed from it
    pub async fn get_latest(&self) -> AppResult<CombinedResult> {
        let query = DocumentQuery::new().order_desc_created().limit(1);
        let list = self.store.list_documents(&self.collection, &query).await?;

        let document = list
            .documents
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Weather data".to_string()))?;

        let weather = record_from_document(document)?;
        let recommendations = self
            .recommendations
            .recommendations_for(weather.observation.classify())
            .await;

        Ok(CombinedResult {
            weather,
            recommendations,
        })
    }

    /// Page of stored records, most recent first
    pub async fn get_history(&self, page: PageRequest) -> AppResult<WeatherHistory> {
        validate_page_request(&page)?;

        let query = DocumentQuery::new()
            .order_desc_created()
            .limit(page.limit)
            .offset(page.offset);
        let list = self.store.list_documents(&self.collection, &query).await?;

        let documents = list
            .documents
            .into_iter()
            .map(record_from_document)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(WeatherHistory {
            total: list.total,
            documents,
        })
    }
}

/// Rebuild a typed record from a stored document
pub fn record_from_document(document: Document) -> AppResult<WeatherRecord> {
    let mut fields = document.fields;
    fields.insert("id".to_string(), Value::String(document.id.clone()));
    fields.insert(
        "created_at".to_string(),
        Value::String(document.created_at.to_rfc3339()),
    );
    fields.insert(
        "updated_at".to_string(),
        Value::String(document.updated_at.to_rfc3339()),
    );

    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        AppError::DataIntegrity(format!("weather record {} is malformed: {}", document.id, e))
    })
}
