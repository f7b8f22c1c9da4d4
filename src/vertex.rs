//! Vertex AI backend authenticated with Application Default Credentials.

use std::sync::Arc;
use std::time::Duration;

use gcp_auth::TokenProvider;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::ApiError;
use crate::wire::{self, GenerateContentRequest};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

enum Credentials {
    Adc(Arc<dyn TokenProvider>),
    #[cfg(test)]
    Static(String),
}

pub struct VertexClient {
    http: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl VertexClient {
    /// Discovers ADC credentials. Fails when no project is configured or no
    /// credential source can be found.
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or_else(|| ApiError::Config("GOOGLE_PROJECT_ID is not set".to_string()))?;

        let provider = timeout(config.request_timeout, gcp_auth::provider())
            .await
            .map_err(|_| ApiError::Timeout(config.request_timeout))?
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        Self::with_credentials(config, project_id, Credentials::Adc(provider))
    }

    #[cfg(test)]
    pub fn with_static_token(config: &Config, token: &str) -> Result<Self, ApiError> {
        let project_id = config.project_id.as_deref().unwrap_or("test-project");
        Self::with_credentials(config, project_id, Credentials::Static(token.to_string()))
    }

    fn with_credentials(
        config: &Config,
        project_id: &str,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let base = config
            .vertex_base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&config.location));

        Ok(Self {
            http: wire::build_http_client(config.request_timeout)?,
            credentials,
            endpoint: generate_endpoint(&base, project_id, &config.location, &config.vertex_model),
            model: config.vertex_model.clone(),
            timeout: config.request_timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let token = self.bearer_token().await?;
        let request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .timeout(self.timeout);
        wire::send_generate(request, &GenerateContentRequest::user_prompt(prompt)).await
    }

    async fn bearer_token(&self) -> Result<String, ApiError> {
        match &self.credentials {
            Credentials::Adc(provider) => {
                let token = timeout(self.timeout, provider.token(&[CLOUD_PLATFORM_SCOPE]))
                    .await
                    .map_err(|_| ApiError::Timeout(self.timeout))?
                    .map_err(|e| ApiError::Auth(e.to_string()))?;
                Ok(token.as_str().to_string())
            }
            #[cfg(test)]
            Credentials::Static(token) => Ok(token.clone()),
        }
    }
}

// `global` has no regional host.
fn default_base_url(location: &str) -> String {
    if location == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{}-aiplatform.googleapis.com", location)
    }
}

fn generate_endpoint(base: &str, project_id: &str, location: &str, model: &str) -> String {
    format!(
        "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
        base.trim_end_matches('/'),
        project_id,
        location,
        model
    )
}
