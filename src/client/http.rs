use super::ConvertService;
use crate::models::{ConversionRequest, ConversionResult};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

pub const CONVERT_PATH: &str = "/api/convert";

/// Client for the HTTP conversion endpoint.
///
/// Requests carry no timeout and are never retried.
pub struct HttpConvertClient {
    client: Client,
    base_url: String,
}

impl HttpConvertClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, CONVERT_PATH)
    }
}

#[async_trait]
impl ConvertService for HttpConvertClient {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let url = self.endpoint_url();
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send conversion request to {}: {}", url, e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse conversion response: {}\nBody: {}", e, body);
            Error::Serialization(e)
        })
    }
}
