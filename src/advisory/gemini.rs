//! Hosted model client for the Generative Language REST API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdvisoryError, AdvisoryModel};
use crate::config::AdvisoryConfig;

/// generateContent request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// generateContent response (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().map(|p| p.text).collect();
        Some(text)
    }
}

/// Characters of an error body kept in `AdvisoryError::Status`
const MAX_ERROR_BODY: usize = 200;

fn status_error(status: u16, body: &str) -> AdvisoryError {
    AdvisoryError::Status {
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

pub struct GeminiClient {
    config: AdvisoryConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: AdvisoryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, AdvisoryError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("Calling advisory model {}", self.config.model);
        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout(self.config.timeout())
                } else if e.is_connect() {
                    AdvisoryError::Transport(format!("cannot connect to {}", self.config.base_url))
                } else {
                    // without_url keeps the key out of the message
                    AdvisoryError::Transport(e.without_url().to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::MalformedResponse(e.without_url().to_string()))?;

        parsed.into_text().ok_or(AdvisoryError::EmptyCompletion)
    }
}

impl AdvisoryModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisoryError> {
        match self.config.api_key.as_deref() {
            Some(key) => self.generate(key, prompt).await,
            None => Err(AdvisoryError::MissingCredential),
        }
    }
}
