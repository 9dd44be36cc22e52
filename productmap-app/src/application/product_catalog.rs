use super::RemoteStore;
use crate::domain::{MapEvent, Product, ProductId};
use crate::infrastructure::cache::ProductCache;
use crate::infrastructure::events::EventBus;
use productmap_errors::AppError;
use std::sync::Arc;

/// Loads confirmed products of a city for display and detail views.
#[derive(Clone)]
pub struct ProductCatalog {
    store: Arc<dyn RemoteStore>,
    cache: ProductCache,
    events: EventBus,
}

impl ProductCatalog {
    pub fn new(store: Arc<dyn RemoteStore>, cache: ProductCache, events: EventBus) -> Self {
        Self {
            store,
            cache,
            events,
        }
    }

    /// Reloads `city` from the store and announces every marker.
    ///
    /// Records still missing a title are left-overs of an unfinished placement
    /// and are not shown, unless this process confirmed them and the update
    /// is still on its way.
    pub async fn refresh_city(&self, city: &str) -> Result<Vec<Product>, AppError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::InvalidInput("City must not be empty".to_string()));
        }

        let records = self.store.list_city(city).await?;
        let total = records.len();
        let products: Vec<Product> = records.into_iter().filter(|p| !p.is_provisional()).collect();
        tracing::info!(city, shown = products.len(), skipped = total - products.len(), "Products loaded");

        self.cache.merge_city(city, products);
        let products = self.cache.by_city(city);
        for product in &products {
            self.events.emit(MapEvent::MarkerAdded {
                product: product.clone(),
            });
        }
        Ok(products)
    }

    /// Detail lookup: cached first, then the store.
    pub async fn product(&self, id: &ProductId, city: &str) -> Result<Product, AppError> {
        if let Some(product) = self.cache.get(id) {
            return Ok(product);
        }

        let product = self
            .store
            .fetch(id, city)
            .await?
            .filter(|p| !p.is_provisional())
            .ok_or(AppError::NotFound)?;
        self.cache.insert(product.clone())?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{drain, FakeStore, StoreOp};
    use crate::domain::{Coordinate, ProductFields};

    fn stored(id: &str, title: &str, votes: u32) -> Product {
        let mut product = Product::placeholder(Coordinate::new(37.0, -122.0), "Palo Alto".into())
            .with_id(ProductId::new(id))
            .with_fields(&ProductFields::new(title, ""));
        product.upvote_count = votes;
        product
    }

    fn catalog(store: FakeStore) -> (ProductCatalog, ProductCache, EventBus) {
        let cache = ProductCache::new();
        let events = EventBus::new(64);
        let catalog = ProductCatalog::new(Arc::new(store), cache.clone(), events.clone());
        (catalog, cache, events)
    }

    #[tokio::test]
    async fn test_refresh_skips_provisional_records() {
        let store = FakeStore::new().listing(vec![
            stored("a", "Taco Cart", 2),
            stored("b", "", 0),
            stored("c", "Boba", 7),
        ]);
        let (catalog, cache, events) = catalog(store);
        let mut rx = events.subscribe();

        let products = catalog.refresh_city("Palo Alto").await.unwrap();

        let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Boba", "Taco Cart"]);
        assert_eq!(cache.len(), 2);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_propagates_read_failure() {
        let (catalog, cache, _events) = catalog(FakeStore::new().fail(StoreOp::Read));
        assert!(matches!(
            catalog.refresh_city("Palo Alto").await,
            Err(AppError::StoreReadFailure(_))
        ));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_product_falls_back_to_store() {
        let store = FakeStore::new().listing(vec![stored("a", "Taco Cart", 2)]);
        let (catalog, cache, _events) = catalog(store);

        let product = catalog.product(&ProductId::new("a"), "Palo Alto").await.unwrap();
        assert_eq!(product.title, "Taco Cart");
        assert!(cache.get(&ProductId::new("a")).is_some());

        assert_eq!(
            catalog.product(&ProductId::new("zzz"), "Palo Alto").await,
            Err(AppError::NotFound)
        );
    }
}
