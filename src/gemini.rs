//! Gemini REST backend keyed by an API key.
//!
//! Candidate models come from the `models.list` endpoint (cached for the
//! process lifetime once a non-empty list is seen) or, failing that, from the
//! configured fallback list. Candidates are tried in order until one yields
//! text.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::wire::{self, GenerateContentRequest, ModelList};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub model: String,
    pub text: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    fallback_models: Arc<Vec<String>>,
    timeout: Duration,
    model_cache: RwLock<Option<Arc<Vec<String>>>>,
}

impl GeminiClient {
    pub fn new(config: &Config, api_key: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: wire::build_http_client(config.request_timeout)?,
            api_key: api_key.to_string(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            fallback_models: Arc::new(config.fallback_models.clone()),
            timeout: config.request_timeout,
            model_cache: RwLock::new(None),
        })
    }

    /// Tries each candidate model in order and returns the first non-empty reply.
    pub async fn generate(&self, prompt: &str) -> Result<ModelReply, ApiError> {
        let candidates = self.candidate_models().await;
        let body = GenerateContentRequest::user_prompt(prompt);

        for model in candidates.iter() {
            match self.generate_with(model, &body).await {
                Ok(text) => {
                    debug!(model = %model, "candidate model replied");
                    return Ok(ModelReply {
                        model: model.clone(),
                        text,
                    });
                }
                Err(e) => {
                    debug!(model = %model, error = %e, "candidate model failed, trying next");
                }
            }
        }

        Err(ApiError::Exhausted {
            tried: candidates.len(),
        })
    }

    /// Cached discovery result, a fresh discovery, or the fallback list, in that order.
    pub async fn candidate_models(&self) -> Arc<Vec<String>> {
        let cached = self.model_cache.read().clone();
        if let Some(cached) = cached.filter(|models| !models.is_empty()) {
            return cached;
        }

        match self.discover_models().await {
            Ok(models) if !models.is_empty() => {
                info!(count = models.len(), "discovered Gemini models");
                let models = Arc::new(models);
                *self.model_cache.write() = Some(models.clone());
                models
            }
            Ok(_) => {
                warn!("model listing returned no usable Gemini models, using fallback list");
                self.fallback_models.clone()
            }
            Err(e) => {
                warn!(error = %e, "model discovery failed, using fallback list");
                self.fallback_models.clone()
            }
        }
    }

    async fn discover_models(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .query(&[("pageSize", "1000")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::status(status, &body));
        }

        let list: ModelList = serde_json::from_str(&body)
            .map_err(|e| ApiError::Malformed(format!("model list: {}", e)))?;
        Ok(list
            .models
            .iter()
            .filter_map(|m| m.gemini_id())
            .map(str::to_string)
            .collect())
    }

    async fn generate_with(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, ApiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let request = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout);
        wire::send_generate(request, body).await
    }
}
