use crate::application::RemoteStore;
use crate::domain::{Product, ProductFields, ProductId};
use async_trait::async_trait;
use dashmap::DashMap;
use productmap_errors::AppError;
use std::sync::Arc;

type RecordKey = (String, ProductId);

/// Process-local stand-in for the remote store, used when no database URL is
/// configured. Records are addressed by `(city, id)` like the real store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<DashMap<RecordKey, Product>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn key(id: &ProductId, city: &str) -> RecordKey {
        (city.to_string(), id.clone())
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn create(&self, product: &Product) -> Result<ProductId, AppError> {
        if product.city.is_empty() {
            return Err(AppError::StoreCreateFailure(
                "record has no city".to_string(),
            ));
        }
        let id = ProductId::new(format!("-{}", uuid::Uuid::new_v4().simple()));
        let record = product.clone().with_id(id.clone());
        self.records.insert(Self::key(&id, &product.city), record);
        Ok(id)
    }

    async fn update(
        &self,
        id: &ProductId,
        city: &str,
        fields: &ProductFields,
    ) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(&Self::key(id, city))
            .ok_or_else(|| AppError::StoreUpdateFailure(format!("no record {city}/{id}")))?;
        record.title = fields.title.clone();
        record.description = fields.description.clone();
        Ok(())
    }

    async fn delete(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        self.records.remove(&Self::key(id, city));
        Ok(())
    }

    async fn increment_upvote(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(&Self::key(id, city))
            .ok_or_else(|| AppError::StoreIncrementFailure(format!("no record {city}/{id}")))?;
        record.upvote_count = record.upvote_count.saturating_add(1);
        Ok(())
    }

    async fn fetch(&self, id: &ProductId, city: &str) -> Result<Option<Product>, AppError> {
        Ok(self
            .records
            .get(&Self::key(id, city))
            .map(|r| r.value().clone()))
    }

    async fn list_city(&self, city: &str) -> Result<Vec<Product>, AppError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.key().0 == city)
            .map(|r| r.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;

    #[tokio::test]
    async fn test_record_lifecycle() {
        let store = InMemoryStore::new();
        let placeholder = Product::placeholder(Coordinate::new(37.0, -122.0), "Palo Alto".into());

        let id = store.create(&placeholder).await.unwrap();
        store
            .update(&id, "Palo Alto", &ProductFields::new("Taco Cart", "Great tacos"))
            .await
            .unwrap();
        store.increment_upvote(&id, "Palo Alto").await.unwrap();

        let stored = store.fetch(&id, "Palo Alto").await.unwrap().unwrap();
        assert_eq!(stored.id, Some(id.clone()));
        assert_eq!(stored.title, "Taco Cart");
        assert_eq!(stored.upvote_count, 1);
        assert_eq!(store.list_city("Palo Alto").await.unwrap().len(), 1);
        assert!(store.list_city("Oakland").await.unwrap().is_empty());

        store.delete(&id, "Palo Alto").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_failures_use_operation_kinds() {
        let store = InMemoryStore::new();
        let id = ProductId::new("nope");
        assert!(matches!(
            store.increment_upvote(&id, "Palo Alto").await,
            Err(AppError::StoreIncrementFailure(_))
        ));
        assert!(matches!(
            store.update(&id, "Palo Alto", &ProductFields::new("a", "b")).await,
            Err(AppError::StoreUpdateFailure(_))
        ));
    }
}
