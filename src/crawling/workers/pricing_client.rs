//! Pricing API GET

use serde_json::Value;
use tracing::debug;

use super::WorkerError;
use crate::infrastructure::config::EndpointConfig;
use crate::infrastructure::http_client::HttpClient;

pub struct PricingClient {
    http_client: HttpClient,
    endpoints: EndpointConfig,
}

impl PricingClient {
    pub fn new(http_client: HttpClient, endpoints: &EndpointConfig) -> Self {
        Self {
            http_client,
            endpoints: endpoints.clone(),
        }
    }

    pub fn pricing_url(&self, product_id: &str) -> String {
        self.endpoints.pricing_url(product_id)
    }

    /// Raw pricing document for `product_id`.
    ///
    /// Transport and status failures are `NetworkError`; a body that is not
    /// JSON is `ParseError`.
    pub async fn fetch_pricing(&self, product_id: &str) -> Result<Value, WorkerError> {
        if product_id.trim().is_empty() {
            return Err(WorkerError::InvalidInput("empty product id".to_string()));
        }

        let url = self.pricing_url(product_id);
        debug!("Fetching pricing document: {url}");
        let body = self
            .http_client
            .fetch_text(&url)
            .await
            .map_err(|e| WorkerError::NetworkError(format!("{e:#}")))?;

        serde_json::from_str(&body).map_err(|e| WorkerError::ParseError(e.to_string()))
    }
}
