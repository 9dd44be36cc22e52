use super::types::ReverseResponse;
use crate::application::Geocoder;
use crate::domain::Coordinate;
use async_trait::async_trait;
use productmap_errors::AppError;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("productmap/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Address detail level of a city.
const CITY_ZOOM: &str = "10";

/// Reverse geocoder backed by a Nominatim-compatible `/reverse` endpoint.
pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    reverse_url: Url,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        // Without a trailing slash `join` would replace the last segment.
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let reverse_url = Url::parse(&base)
            .and_then(|base| base.join("reverse"))
            .map_err(|e| AppError::Internal(format!("invalid geocoder URL {base_url}: {e}")))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            reverse_url,
        })
    }

    fn request_url(&self, coordinate: Coordinate) -> Url {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("zoom", CITY_ZOOM)
            .append_pair("lat", &coordinate.latitude.to_string())
            .append_pair("lon", &coordinate.longitude.to_string());
        url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve_city(&self, coordinate: Coordinate) -> Result<String, AppError> {
        let response = self
            .http_client
            .get(self.request_url(coordinate))
            .send()
            .await
            .map_err(|e| AppError::GeocodeFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%coordinate, "Geocoder error: {}", status);
            return Err(AppError::GeocodeFailure(format!("API error: {}", status)));
        }

        let reverse: ReverseResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeocodeFailure(e.to_string()))?;

        if let Some(error) = reverse.error {
            return Err(AppError::GeocodeFailure(error));
        }

        reverse
            .address
            .as_ref()
            .and_then(|a| a.locality())
            .map(str::to_string)
            .ok_or_else(|| AppError::GeocodeFailure(format!("no city at {coordinate}")))
    }
}
