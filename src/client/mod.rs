//! Recommendation API client.
//!
//! The advisor asks an external API, one exchange at a time, for either the
//! next question or the final recommendation. The transport lives behind
//! `RecommendationClient` so the controller can be driven by stubs in tests.

pub mod http;

pub use http::HttpRecommendationClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::advisor::model::{NextStep, Question, ServiceType};
use crate::error::ClientError;

/// One request/response exchange with the recommendation API.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    /// Ask for the step that follows `answers` (oldest first).
    async fn fetch_next(
        &self,
        answers: &[String],
        service_type: ServiceType,
    ) -> Result<NextStep, ClientError>;
}

/// Request body sent to the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStepRequest {
    pub answers: Vec<String>,
    pub service_type: ServiceType,
}

/// Successful response body.
///
/// Any `type` other than these two fails to deserialize and is reported as a
/// protocol error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NextStepResponse {
    Question {
        question: String,
        #[serde(default)]
        options: Option<Vec<String>>,
    },
    Recommendation {
        #[serde(default)]
        recommendation: Option<String>,
    },
}

impl From<NextStepResponse> for NextStep {
    fn from(response: NextStepResponse) -> Self {
        match response {
            NextStepResponse::Question { question, options } => {
                NextStep::Question(Question::new(question, options.unwrap_or_default()))
            }
            NextStepResponse::Recommendation { recommendation } => {
                NextStep::Recommendation(recommendation.unwrap_or_default())
            }
        }
    }
}

/// Error body the API sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Decode a successful response body.
pub fn parse_next_step(body: &str) -> Result<NextStep, ClientError> {
    serde_json::from_str::<NextStepResponse>(body)
        .map(NextStep::from)
        .map_err(|e| ClientError::Protocol {
            reason: e.to_string(),
        })
}
