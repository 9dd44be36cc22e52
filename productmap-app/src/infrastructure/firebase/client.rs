use super::types::{
    city_key, next_upvote_count, CityCollection, FieldsPatch, ProductDocument, PushResponse,
};
use crate::application::RemoteStore;
use crate::domain::{Product, ProductFields, ProductId};
use async_trait::async_trait;
use productmap_errors::AppError;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

const COLLECTION: &str = "Products";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const UPVOTE_FIELD: &str = "upvoteCount";
/// Asks the database to return the `ETag` of the value read.
const ETAG_REQUEST: &str = "X-Firebase-ETag";
const MAX_INCREMENT_ATTEMPTS: usize = 3;

/// Realtime Database REST client for product records.
pub struct FirebaseStore {
    http_client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl FirebaseStore {
    pub fn new(database_url: &str, auth_token: Option<String>) -> Result<Self, AppError> {
        let base_url = Url::parse(database_url)
            .map_err(|e| AppError::Internal(format!("invalid database URL {database_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!(
                "database URL {database_url} cannot hold paths"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    fn city_url(&self, city: &str) -> Url {
        self.url(&[&city_key(city)])
    }

    fn record_url(&self, id: &ProductId, city: &str) -> Url {
        self.url(&[&city_key(city), id.as_str()])
    }

    fn upvote_url(&self, id: &ProductId, city: &str) -> Url {
        self.url(&[&city_key(city), id.as_str(), UPVOTE_FIELD])
    }

    /// `{base}/Products/{segments...}.json`, percent-encoded, plus `auth`.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(COLLECTION);
            if let Some((last, rest)) = segments.split_last() {
                path.extend(rest);
                path.push(&format!("{last}.json"));
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        url
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        failure: fn(String) -> AppError,
    ) -> Result<reqwest::Response, AppError> {
        let response = request.send().await.map_err(|e| failure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Database error: {} - {}", status, body);
            return Err(failure(format!("API error: {}", status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn create(&self, product: &Product) -> Result<ProductId, AppError> {
        let request = self
            .http_client
            .post(self.city_url(&product.city))
            .json(&ProductDocument::from(product));
        let pushed: PushResponse = self
            .send(request, AppError::StoreCreateFailure)
            .await?
            .json()
            .await
            .map_err(|e| AppError::StoreCreateFailure(e.to_string()))?;

        tracing::debug!(city = %product.city, key = %pushed.name, "Record created");
        Ok(ProductId::new(pushed.name))
    }

    async fn update(
        &self,
        id: &ProductId,
        city: &str,
        fields: &ProductFields,
    ) -> Result<(), AppError> {
        let request = self
            .http_client
            .patch(self.record_url(id, city))
            .json(&FieldsPatch::from(fields));
        self.send(request, AppError::StoreUpdateFailure).await?;
        Ok(())
    }

    async fn delete(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        let request = self.http_client.delete(self.record_url(id, city));
        self.send(request, AppError::StoreDeleteFailure).await?;
        Ok(())
    }

    /// Read-modify-write guarded by the record's `ETag`, so an upvote never
    /// recreates a record that was deleted meanwhile.
    async fn increment_upvote(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        let url = self.upvote_url(id, city);
        let request = self.http_client.get(url.clone()).header(ETAG_REQUEST, "true");
        let (mut etag, mut current) =
            read_versioned(self.send(request, AppError::StoreIncrementFailure).await?).await?;

        for attempt in 1..=MAX_INCREMENT_ATTEMPTS {
            let next = next_upvote_count(current)?;
            let response = self
                .http_client
                .put(url.clone())
                .header(IF_MATCH, etag.as_str())
                .json(&next)
                .send()
                .await
                .map_err(|e| AppError::StoreIncrementFailure(e.to_string()))?;

            if response.status() == StatusCode::PRECONDITION_FAILED {
                tracing::debug!(product_id = %id, attempt, "Upvote count changed concurrently");
                (etag, current) = read_versioned(response).await?;
                continue;
            }
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!("Database error: {} - {}", status, body);
                return Err(AppError::StoreIncrementFailure(format!("API error: {}", status)));
            }
            return Ok(());
        }

        Err(AppError::StoreIncrementFailure(format!(
            "upvote count kept changing after {} attempts",
            MAX_INCREMENT_ATTEMPTS
        )))
    }

    async fn fetch(&self, id: &ProductId, city: &str) -> Result<Option<Product>, AppError> {
        let request = self.http_client.get(self.record_url(id, city));
        let document: Option<ProductDocument> = self
            .send(request, AppError::StoreReadFailure)
            .await?
            .json()
            .await
            .map_err(|e| AppError::StoreReadFailure(e.to_string()))?;

        Ok(document.map(|d| d.into_product(id.clone())))
    }

    async fn list_city(&self, city: &str) -> Result<Vec<Product>, AppError> {
        let request = self.http_client.get(self.city_url(city));
        let collection: CityCollection = self
            .send(request, AppError::StoreReadFailure)
            .await?
            .json()
            .await
            .map_err(|e| AppError::StoreReadFailure(e.to_string()))?;

        let products = collection
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value::<ProductDocument>(value) {
                Ok(document) => Some(document.into_product(ProductId::new(key))),
                Err(e) => {
                    tracing::warn!(city, key = %key, "Skipping malformed record: {}", e);
                    None
                }
            })
            .collect();
        Ok(products)
    }
}

/// The `ETag` header and the upvote count of a versioned read. A 412 answer
/// carries the same pair for the current value.
async fn read_versioned(response: reqwest::Response) -> Result<(String, Option<u32>), AppError> {
    let etag = response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::StoreIncrementFailure("response has no ETag".to_string()))?;
    let count = response
        .json()
        .await
        .map_err(|e| AppError::StoreIncrementFailure(e.to_string()))?;
    Ok((etag, count))
}
