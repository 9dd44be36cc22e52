//! Seams to the external collaborators of the placement core.
//!
//! None of these calls is retried here; retry policy, if any, belongs to the
//! adapter behind the trait.

use crate::domain::{Coordinate, Product, ProductFields, ProductId};
use async_trait::async_trait;
use productmap_errors::AppError;

/// Document store holding product records under `Products/{city}/{id}`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates the record and returns the server-generated key.
    /// Fails with `AppError::StoreCreateFailure`.
    async fn create(&self, product: &Product) -> Result<ProductId, AppError>;

    /// Writes `title` and `description` only. Fails with `AppError::StoreUpdateFailure`.
    async fn update(
        &self,
        id: &ProductId,
        city: &str,
        fields: &ProductFields,
    ) -> Result<(), AppError>;

    /// Fails with `AppError::StoreDeleteFailure`.
    async fn delete(&self, id: &ProductId, city: &str) -> Result<(), AppError>;

    /// Server-side `upvoteCount += 1`. Fails with `AppError::StoreIncrementFailure`.
    async fn increment_upvote(&self, id: &ProductId, city: &str) -> Result<(), AppError>;

    async fn fetch(&self, id: &ProductId, city: &str) -> Result<Option<Product>, AppError>;

    async fn list_city(&self, city: &str) -> Result<Vec<Product>, AppError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves the city name containing `coordinate`.
    /// Fails with `AppError::GeocodeFailure`.
    async fn resolve_city(&self, coordinate: Coordinate) -> Result<String, AppError>;
}
