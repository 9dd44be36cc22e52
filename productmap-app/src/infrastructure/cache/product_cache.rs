use crate::domain::{Product, ProductId};
use dashmap::{DashMap, DashSet};
use productmap_errors::AppError;
use std::collections::HashSet;
use std::sync::Arc;

/// Confirmed products currently shown on the map, keyed by record id.
///
/// Lives for the process only. Placeholders without an id are never stored.
#[derive(Clone, Default)]
pub struct ProductCache {
    products: Arc<DashMap<ProductId, Product>>,
    /// Confirmed here but not yet seen with its metadata in the store.
    unsynced: Arc<DashSet<ProductId>>,
}

impl ProductCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) -> Result<(), AppError> {
        let id = product
            .id
            .clone()
            .ok_or_else(|| AppError::InvalidInput("product has no id".to_string()))?;
        self.products.insert(id, product);
        Ok(())
    }

    /// Inserts a product confirmed by this process. It survives refreshes
    /// until the store returns it with its metadata.
    pub fn publish(&self, product: Product) -> Result<(), AppError> {
        let id = product
            .id
            .clone()
            .ok_or_else(|| AppError::InvalidInput("product has no id".to_string()))?;
        self.unsynced.insert(id.clone());
        self.products.insert(id, product);
        Ok(())
    }

    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).map(|p| p.value().clone())
    }

    /// Adds one upvote and returns the new count.
    pub fn increment_upvotes(&self, id: &ProductId) -> Option<u32> {
        self.products.get_mut(id).map(|mut p| {
            p.upvote_count = p.upvote_count.saturating_add(1);
            p.upvote_count
        })
    }

    /// Takes one upvote back and returns the new count; never goes below zero.
    pub fn decrement_upvotes(&self, id: &ProductId) -> Option<u32> {
        self.products.get_mut(id).map(|mut p| {
            p.upvote_count = p.upvote_count.saturating_sub(1);
            p.upvote_count
        })
    }

    /// Products of `city`, most upvoted first.
    pub fn by_city(&self, city: &str) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.city == city)
            .map(|p| p.value().clone())
            .collect();
        products.sort_by(|a, b| {
            b.upvote_count
                .cmp(&a.upvote_count)
                .then_with(|| a.title.cmp(&b.title))
        });
        products
    }

    /// Brings `city` in line with the confirmed records read from the store.
    ///
    /// Products published here stay while the store still lacks their
    /// metadata. Counts never drop below the local value, since increments
    /// may still be in flight.
    pub fn merge_city(&self, city: &str, products: Vec<Product>) {
        let mut remote_ids = HashSet::new();
        for mut product in products {
            let Some(id) = product.id.clone() else {
                continue;
            };
            if let Some(local_count) = self.products.get(&id).map(|p| p.upvote_count) {
                product.upvote_count = product.upvote_count.max(local_count);
            }
            self.unsynced.remove(&id);
            remote_ids.insert(id.clone());
            self.products.insert(id, product);
        }

        let unsynced = &self.unsynced;
        self.products
            .retain(|id, p| p.city != city || remote_ids.contains(id) || unsynced.contains(id));
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, ProductFields};

    fn product(id: &str, city: &str, title: &str, votes: u32) -> Product {
        let mut p = Product::placeholder(Coordinate::new(37.0, -122.0), city.to_string())
            .with_id(ProductId::new(id))
            .with_fields(&ProductFields::new(title, ""));
        p.upvote_count = votes;
        p
    }

    #[test]
    fn test_rejects_placeholder_without_id() {
        let cache = ProductCache::new();
        let placeholder = Product::placeholder(Coordinate::new(0.0, 0.0), "X".into());
        assert!(cache.insert(placeholder).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_increment_and_decrement() {
        let cache = ProductCache::new();
        cache.insert(product("a", "Palo Alto", "Taco", 3)).unwrap();
        let id = ProductId::new("a");

        assert_eq!(cache.increment_upvotes(&id), Some(4));
        assert_eq!(cache.decrement_upvotes(&id), Some(3));
        assert_eq!(cache.increment_upvotes(&ProductId::new("missing")), None);
    }

    #[test]
    fn test_decrement_saturates_at_zero() {
        let cache = ProductCache::new();
        cache.insert(product("a", "Palo Alto", "Taco", 0)).unwrap();
        assert_eq!(cache.decrement_upvotes(&ProductId::new("a")), Some(0));
    }

    #[test]
    fn test_merge_city_only_touches_that_city() {
        let cache = ProductCache::new();
        cache.insert(product("a", "Palo Alto", "Taco", 1)).unwrap();
        cache.insert(product("b", "Oakland", "Burger", 1)).unwrap();

        cache.merge_city(
            "Palo Alto",
            vec![
                product("c", "Palo Alto", "Crepes", 2),
                product("d", "Palo Alto", "Boba", 5),
            ],
        );

        assert!(cache.get(&ProductId::new("a")).is_none());
        assert!(cache.get(&ProductId::new("b")).is_some());
        let titles: Vec<_> = cache
            .by_city("Palo Alto")
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Boba", "Crepes"]);
    }

    #[test]
    fn test_merge_keeps_published_product_until_store_has_it() {
        let cache = ProductCache::new();
        cache.publish(product("a", "Palo Alto", "Taco", 0)).unwrap();
        cache.increment_upvotes(&ProductId::new("a"));

        cache.merge_city("Palo Alto", vec![]);
        assert_eq!(cache.get(&ProductId::new("a")).unwrap().upvote_count, 1);

        cache.merge_city("Palo Alto", vec![product("a", "Palo Alto", "Taco", 1)]);
        cache.merge_city("Palo Alto", vec![]);
        assert!(cache.get(&ProductId::new("a")).is_none());
    }

    #[test]
    fn test_merge_never_lowers_local_count() {
        let cache = ProductCache::new();
        cache.insert(product("a", "Palo Alto", "Taco", 5)).unwrap();

        cache.merge_city("Palo Alto", vec![product("a", "Palo Alto", "Taco", 3)]);
        assert_eq!(cache.get(&ProductId::new("a")).unwrap().upvote_count, 5);

        cache.merge_city("Palo Alto", vec![product("a", "Palo Alto", "Tacos", 9)]);
        let merged = cache.get(&ProductId::new("a")).unwrap();
        assert_eq!(merged.upvote_count, 9);
        assert_eq!(merged.title, "Tacos");
    }
}
