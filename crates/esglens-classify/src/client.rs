//! HTTP client for the classification inference service.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::rating::sentiment_rating;
use crate::types::{AcceleratorInfo, Classification, TopicScore};

/// Inference-service client.
///
/// Each fan-out worker constructs its own client; workers share no state.
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct SentimentProbabilities {
    positive: f64,
    negative: f64,
    neutral: f64,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    sentiment: SentimentProbabilities,
    topics: Vec<TopicScore>,
}

impl InferenceClient {
    /// Create a new `InferenceClient`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Classify one article text.
    ///
    /// Returns the sentiment rating (converted from the service's 3-class
    /// probabilities) and the topic scores ranked by descending probability.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] on network failure,
    /// [`ClassifyError::UnexpectedStatus`] on a non-success response, or
    /// [`ClassifyError::Decode`] if the payload cannot be parsed.
    pub async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let url = format!("{}/classify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest { inputs: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifyError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let payload: ClassifyResponse =
            response.json().await.map_err(|e| ClassifyError::Decode {
                context: "classify response".to_string(),
                source: e,
            })?;

        let mut topics = payload.topics;
        // The ranking is part of the capability contract; enforce it here
        // rather than trusting the service's ordering.
        topics.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Classification {
            sentiment: sentiment_rating(
                payload.sentiment.positive,
                payload.sentiment.negative,
                payload.sentiment.neutral,
            ),
            topics,
        })
    }

    /// Query the service's accelerator status, used to size the fan-out
    /// worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError`] if the request fails; callers degrade to
    /// "no accelerator" on error.
    pub async fn accelerator_info(&self) -> Result<AcceleratorInfo, ClassifyError> {
        let url = format!("{}/info", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClassifyError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        response.json().await.map_err(|e| ClassifyError::Decode {
            context: "info response".to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn classify_converts_sentiment_and_ranks_topics() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sentiment": { "positive": 0.0, "negative": 1.0, "neutral": 0.0 },
                "topics": [
                    { "label": "Not Relevant to ESG", "probability": 0.1 },
                    { "label": "Surface Water Pollution", "probability": 0.8 },
                    { "label": "Biodiversity", "probability": 0.4 }
                ]
            })))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&server.uri());
        let classification = client.classify("some article text").await.unwrap();

        assert!(classification.sentiment.abs() < f64::EPSILON);
        let labels: Vec<&str> = classification
            .topics
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["Surface Water Pollution", "Biodiversity", "Not Relevant to ESG"]
        );
    }

    #[tokio::test]
    async fn classify_maps_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&server.uri());
        let result = client.classify("text").await;
        assert!(
            matches!(result, Err(ClassifyError::UnexpectedStatus { status: 500, .. })),
            "expected UnexpectedStatus, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn accelerator_info_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accelerator": true,
                "accelerator_memory_gb": 9
            })))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&server.uri());
        let info = client.accelerator_info().await.unwrap();
        assert!(info.available);
        assert_eq!(info.memory_gb, 9);
    }

    #[tokio::test]
    async fn accelerator_info_defaults_memory_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "accelerator": false })),
            )
            .mount(&server)
            .await;

        let client = InferenceClient::new(&server.uri());
        let info = client.accelerator_info().await.unwrap();
        assert!(!info.available);
        assert_eq!(info.memory_gb, 0);
    }
}
