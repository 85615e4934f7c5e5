//! Gemini API client
//!
//! One request per call: no retries, no circuit breaking, no streaming.
//! A failed call fails the run.

use crate::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use relay_core::{GeneratorConfig, RelayError, Result, TextGenerator};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client from the generator settings and API key
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RelayError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Requesting generation from {} ({} prompt chars)", self.model, prompt.chars().count());

        let request = GenerateRequest::single_prompt(prompt);
        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::Api(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(RelayError::Api(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Api(format!("Failed to parse response: {}", e)))?;

        let output = body
            .text()
            .ok_or_else(|| RelayError::Api("No content in response".to_string()))?;

        if let Some(ref usage) = body.usage_metadata {
            tracing::info!(
                "Generation complete ({} chars, {} prompt tokens, {} output tokens)",
                output.chars().count(),
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        } else {
            tracing::info!("Generation complete ({} chars)", output.chars().count());
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let config = GeneratorConfig {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new(&config, "key").unwrap();

        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_api_error() {
        let config = GeneratorConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new(&config, "key").unwrap();

        let result = client.generate("prompt").await;
        assert!(matches!(result, Err(RelayError::Api(_))));
    }
}
