//! reqwest-backed [`TravelApi`] over the hotel REST backend.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{TravelApi, TravelApiError, code_for_status};
use crate::types::{AvailabilityRequest, AvailabilityResponse, HealthStatus, Hotel, HotelsResponse};

pub struct RestTravelClient {
    base_url: reqwest::Url,
    timeout: Duration,
    client: reqwest::Client,
}

impl RestTravelClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TravelApiError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| TravelApiError::Network(format!("Invalid backend URL {base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TravelApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    pub fn from_config(config: &concierge_config::TravelApiConfig) -> Result<Self, TravelApiError> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, TravelApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TravelApiError::Network(format!("Backend URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, TravelApiError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TravelApiError::Timeout(format!(
                        "Request to {path} timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    TravelApiError::Network(format!("Network error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // {message?, error?, details?: [{code?}]}; each field is optional on its own.
            let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
            let code = body
                .pointer("/details/0/code")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| code_for_status(status.as_u16()));
            let message = ["message", "error"]
                .iter()
                .find_map(|key| body.get(key).and_then(serde_json::Value::as_str))
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            warn!(path, status = status.as_u16(), code = %code, "Travel backend returned error");
            return Err(TravelApiError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TravelApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TravelApi for RestTravelClient {
    async fn hotels(&self, refresh: bool) -> Result<HotelsResponse, TravelApiError> {
        let mut request = self.client.get(self.url(&["api", "hotels"])?);
        if refresh {
            request = request.query(&[("refresh", "true")]);
        }
        debug!(refresh, "Fetching hotel catalog");
        self.send(request, "/api/hotels").await
    }

    async fn hotel(&self, code: &str) -> Result<Hotel, TravelApiError> {
        let request = self.client.get(self.url(&["api", "hotels", code])?);
        debug!(code, "Fetching hotel");
        self.send(request, "/api/hotels/{code}").await
    }

    async fn search_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResponse, TravelApiError> {
        let builder = self
            .client
            .post(self.url(&["api", "availability"])?)
            .json(request);
        debug!(city = %request.city_code, start = %request.start_date, end = %request.end_date, "Searching availability");
        self.send(builder, "/api/availability").await
    }

    async fn health(&self) -> Result<HealthStatus, TravelApiError> {
        let request = self.client.get(self.url(&["health"])?);
        self.send(request, "/health").await
    }
}
