use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::config::LodClientConfig;
use crate::features::boundaries::dtos::{BoundaryFeatureCollectionDto, BoundaryStatsDto};
use crate::features::boundaries::models::ViewportBounds;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("server reported failure: {0}")]
    Api(String),
}

/// Source of boundary collections for the LOD controller
#[async_trait]
pub trait BoundaryFetcher: Send + Sync {
    async fn fetch(
        &self,
        zoom: i32,
        bounds: Option<ViewportBounds>,
    ) -> Result<BoundaryFeatureCollectionDto, ClientError>;
}

/// Fetches boundaries from the HTTP API
pub struct HttpBoundaryFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBoundaryFetcher {
    pub fn new(config: &LodClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent("KawalBanjirLodClient/1.0")
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn boundaries_url(&self, zoom: i32, bounds: Option<&ViewportBounds>) -> String {
        let mut url = format!("{}/boundaries?zoom={}", self.base_url, zoom);
        if let Some(bounds) = bounds {
            url.push_str("&bounds=");
            url.push_str(&urlencoding::encode(&bounds.to_query_value()));
        }
        url
    }

    /// Per-level zoom envelope, used to derive the client's LOD tiers
    pub async fn fetch_stats(&self) -> Result<BoundaryStatsDto, ClientError> {
        self.get_json(&format!("{}/boundaries/stats", self.base_url))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiResponse<()>>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        match body {
            ApiResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            ApiResponse { message, .. } => Err(ClientError::Api(
                message.unwrap_or_else(|| "empty response".to_string()),
            )),
        }
    }
}

#[async_trait]
impl BoundaryFetcher for HttpBoundaryFetcher {
    async fn fetch(
        &self,
        zoom: i32,
        bounds: Option<ViewportBounds>,
    ) -> Result<BoundaryFeatureCollectionDto, ClientError> {
        self.get_json(&self.boundaries_url(zoom, bounds.as_ref()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_url() {
        let config = LodClientConfig {
            api_base_url: "http://localhost:5000/api".to_string(),
            ..Default::default()
        };
        let fetcher = HttpBoundaryFetcher::new(&config).unwrap();

        assert_eq!(
            fetcher.boundaries_url(8, None),
            "http://localhost:5000/api/boundaries?zoom=8"
        );

        let bounds = ViewportBounds::new(95.0, 2.0, 98.5, 6.0).unwrap();
        let url = fetcher.boundaries_url(8, Some(&bounds));
        assert!(url.starts_with("http://localhost:5000/api/boundaries?zoom=8&bounds=%7B"));
        assert!(!url.contains('"'));
    }
}
