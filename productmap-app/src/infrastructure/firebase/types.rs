use crate::domain::{Coordinate, Product, ProductFields, ProductId};
use productmap_errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A record as stored under `Products/{city}/{id}`. The id is the key and is
/// never part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: String,
    pub coordinates: CoordinatesDocument,
    #[serde(default)]
    pub upvote_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesDocument {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            city: product.city.clone(),
            coordinates: CoordinatesDocument {
                latitude: product.coordinate.latitude,
                longitude: product.coordinate.longitude,
            },
            upvote_count: product.upvote_count,
            image_url: product.image_url.clone(),
            created_at: product.created_at,
        }
    }
}

impl ProductDocument {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id: Some(id),
            title: self.title,
            description: self.description,
            city: self.city,
            coordinate: Coordinate::new(self.coordinates.latitude, self.coordinates.longitude),
            upvote_count: self.upvote_count,
            image_url: self.image_url,
            created_at: self.created_at,
        }
    }
}

/// Body of a POST response: the generated child key.
#[derive(Debug, Deserialize)]
pub struct PushResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FieldsPatch<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a ProductFields> for FieldsPatch<'a> {
    fn from(fields: &'a ProductFields) -> Self {
        Self {
            title: &fields.title,
            description: &fields.description,
        }
    }
}

/// A city collection; the database answers `null` for an empty one.
pub type CityCollection = Option<HashMap<String, serde_json::Value>>;

/// Characters a database key may not contain. `%` is escaped too so the
/// mapping stays one-to-one.
const RESERVED_KEY_CHARS: [char; 7] = ['%', '.', '$', '#', '[', ']', '/'];

/// Database key for a city name: reserved characters become `%XX`, control
/// characters are dropped.
pub fn city_key(city: &str) -> String {
    let mut key = String::with_capacity(city.len());
    for c in city.chars().filter(|c| !c.is_control()) {
        if RESERVED_KEY_CHARS.contains(&c) {
            key.push_str(&format!("%{:02X}", c as u32));
        } else {
            key.push(c);
        }
    }
    key
}

/// Value written by one upvote, given the count read from the store.
/// A missing count means the record is gone.
pub fn next_upvote_count(current: Option<u32>) -> Result<u32, AppError> {
    current
        .map(|count| count.saturating_add(1))
        .ok_or_else(|| AppError::StoreIncrementFailure("record no longer exists".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_round_trips_product_without_id() {
        let product = Product::placeholder(Coordinate::new(37.4, -122.1), "Palo Alto".into())
            .with_fields(&ProductFields::new("Taco Cart", "Great tacos"));
        let value = serde_json::to_value(ProductDocument::from(&product)).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["coordinates"]["latitude"], json!(37.4));
        assert_eq!(value["upvoteCount"], json!(0));
        assert!(value.get("imageUrl").is_none());

        let back: ProductDocument = serde_json::from_value(value).unwrap();
        let restored = back.into_product(ProductId::new("abc123"));
        assert_eq!(restored.id, Some(ProductId::new("abc123")));
        assert_eq!(restored.title, "Taco Cart");
    }

    #[test]
    fn test_sparse_document_uses_defaults() {
        let doc: ProductDocument = serde_json::from_value(json!({
            "coordinates": {"latitude": 1.0, "longitude": 2.0}
        }))
        .unwrap();
        assert_eq!(doc.title, "");
        assert_eq!(doc.upvote_count, 0);
        assert!(doc.into_product(ProductId::new("x")).is_provisional());
    }

    #[test]
    fn test_city_key_escapes_reserved_characters() {
        assert_eq!(city_key("Palo Alto"), "Palo Alto");
        assert_eq!(city_key("St. Louis"), "St%2E Louis");
        assert_eq!(city_key("Biel/Bienne"), "Biel%2FBienne");
        assert_eq!(city_key("100% [#$]"), "100%25 %5B%23%24%5D");
        assert_eq!(city_key("Zürich\u{7}"), "Zürich");
    }

    #[test]
    fn test_next_upvote_count() {
        assert_eq!(next_upvote_count(Some(4)), Ok(5));
        assert_eq!(next_upvote_count(Some(u32::MAX)), Ok(u32::MAX));
        assert!(matches!(
            next_upvote_count(None),
            Err(AppError::StoreIncrementFailure(_))
        ));
    }
}
