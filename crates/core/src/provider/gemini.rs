//! Gemini REST binding for the resolution provider.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info};

use super::{build_prompt, clean_suggestion, ResolutionProvider};
use crate::config::Config;
use crate::conflict::ConflictHunk;
use crate::errors::{ConfigError, ProviderError};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// Wire types (response side)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Pull the first candidate's first text part, if any.
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|part| part.text)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Asynchronous client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl GeminiProvider {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("merge-resolve/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");
        info!(api_url = %api_url, "created GeminiProvider");
        Self {
            http,
            api_url,
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Build a provider from the effective configuration. Fails when the
    /// credential is absent.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(
            DEFAULT_API_URL,
            api_key,
            &config.model,
            config.temperature,
        ))
    }
}

#[async_trait]
impl ResolutionProvider for GeminiProvider {
    async fn resolve(&self, hunk: &ConflictHunk) -> Result<String, ProviderError> {
        let prompt = build_prompt(hunk);
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        debug!(model = %self.model, "requesting resolution");

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(detail));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        let text = parsed
            .first_text()
            .ok_or_else(|| ProviderError::ParseError("response has no candidate text".into()))?;

        clean_suggestion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_first_text() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "merged();" } ] } }
            ]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("merged();"));
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.first_text().is_none());

        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(resp.first_text().is_none());
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let provider = GeminiProvider::new("https://example.test/v1beta/", "k", "m", 0.2);
        assert_eq!(provider.api_url, "https://example.test/v1beta");
    }
}
