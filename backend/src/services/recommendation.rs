//! Farming recommendations per weather condition

use std::sync::Arc;

use serde_json::Value;
use shared::ConditionCategory;

use crate::store::{DocumentQuery, DocumentStore, StoreError};

/// Maximum number of curated recommendations returned per condition
pub const MAX_RECOMMENDATIONS: u32 = 5;

/// Resolves recommendation texts, preferring curated entries from the store
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn DocumentStore>,
    collection: Option<String>,
}

impl RecommendationService {
    /// A `None` or empty collection disables curated lookups
    pub fn new(store: Arc<dyn DocumentStore>, collection: Option<String>) -> Self {
        Self {
            store,
            collection: collection.filter(|c| !c.is_empty()),
        }
    }

    /// Recommendations for a condition. Never empty and never fails: store
    /// problems fall back to the built-in text.
    pub async fn recommendations_for(&self, category: ConditionCategory) -> Vec<String> {
        if let Some(collection) = &self.collection {
            match self.curated(collection, category).await {
                Ok(texts) if !texts.is_empty() => return texts,
                Ok(_) => {
                    tracing::debug!("No curated recommendations for condition {}", category);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load recommendations for condition {}: {}",
                        category,
                        e
                    );
                }
            }
        }

        vec![fallback_recommendation(category).to_string()]
    }

    async fn curated(
        &self,
        collection: &str,
        category: ConditionCategory,
    ) -> Result<Vec<String>, StoreError> {
        let query = DocumentQuery::new()
            .equal("condition_value", category.as_str())
            .limit(MAX_RECOMMENDATIONS);

        let list = self.store.list_documents(collection, &query).await?;

        Ok(list
            .documents
            .into_iter()
            .filter_map(|doc| {
                doc.fields
                    .get("recommendation_text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }
}

/// Built-in recommendation for each condition
pub fn fallback_recommendation(category: ConditionCategory) -> &'static str {
    match category {
        ConditionCategory::Cold => "Cold weather: Consider protecting sensitive plants.",
        ConditionCategory::Hot => "Hot weather: Increase watering frequency.",
        ConditionCategory::Dry => "Low humidity: Monitor soil moisture.",
        ConditionCategory::Humid => "High humidity: Watch for fungal diseases.",
        ConditionCategory::Windy => "Strong winds: Check plant support systems.",
        ConditionCategory::Normal => "Weather conditions are optimal.",
    }
}
