//! HTTP transport for the recommendation API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::{ErrorBody, NextStepRequest, RecommendationClient, parse_next_step};
use crate::advisor::model::{NextStep, ServiceType};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// `POST`s the answers so far as JSON and decodes the tagged reply.
pub struct HttpRecommendationClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpRecommendationClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationClient for HttpRecommendationClient {
    async fn fetch_next(
        &self,
        answers: &[String],
        service_type: ServiceType,
    ) -> Result<NextStep, ClientError> {
        let body = NextStepRequest {
            answers: answers.to_vec(),
            service_type,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        debug!(
            endpoint = %self.endpoint,
            answers = answers.len(),
            service_type = %service_type,
            "Requesting next advisor step"
        );

        let response = request.send().await.map_err(|e| ClientError::Transport {
            reason: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ClientError::Transport {
            reason: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error);
            warn!(
                status = status.as_u16(),
                error = message.as_deref().unwrap_or(""),
                "Recommendation API returned an error status"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_next_step(&text)
    }
}
