use std::fmt;
use std::future::Future;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::gemini::GeminiClient;
use crate::mock::mock_reply;
use crate::vertex::VertexClient;
use crate::wire::build_prompt;

/// Backend chosen once at startup.
pub enum Strategy {
    ApiKey(GeminiClient),
    Sdk(VertexClient),
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    ApiKey,
    Sdk,
    Mock,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::ApiKey => write!(f, "gemini-api-key"),
            StrategyKind::Sdk => write!(f, "vertex-ai"),
            StrategyKind::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplySource {
    Gemini(String),
    Vertex(String),
    Mock,
    /// An upstream was configured but every attempt failed.
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Gemini(_) => "gemini",
            ReplySource::Vertex(_) => "vertex",
            ReplySource::Mock => "mock",
            ReplySource::Fallback => "fallback",
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            ReplySource::Gemini(model) | ReplySource::Vertex(model) => Some(model),
            ReplySource::Mock | ReplySource::Fallback => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub struct ReplyGenerator {
    strategy: Strategy,
}

impl ReplyGenerator {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub async fn from_config(config: &Config) -> Self {
        Self::resolve(config, VertexClient::connect).await
    }

    /// Picks the API key strategy, then Vertex, then the mock. A backend that
    /// fails to construct degrades to the next one.
    pub async fn resolve<'a, F, Fut>(config: &'a Config, connect_sdk: F) -> Self
    where
        F: FnOnce(&'a Config) -> Fut,
        Fut: Future<Output = Result<VertexClient, ApiError>>,
    {
        if let Some(api_key) = config.api_key.as_deref() {
            match GeminiClient::new(config, api_key) {
                Ok(client) => return Self::new(Strategy::ApiKey(client)),
                Err(e) => warn!(error = %e, "could not build Gemini client"),
            }
        }

        if config.project_id.is_some() {
            match connect_sdk(config).await {
                Ok(client) => return Self::new(Strategy::Sdk(client)),
                Err(e) => warn!(error = %e, "Vertex AI client unavailable, falling back to mock replies"),
            }
        } else {
            info!("no Google credentials configured, serving mock replies");
        }

        Self::new(Strategy::Mock)
    }

    pub fn kind(&self) -> StrategyKind {
        match self.strategy {
            Strategy::ApiKey(_) => StrategyKind::ApiKey,
            Strategy::Sdk(_) => StrategyKind::Sdk,
            Strategy::Mock => StrategyKind::Mock,
        }
    }

    /// Always produces a non-empty reply; upstream failures degrade to the mock.
    pub async fn generate_reply(&self, text: &str, language: &str) -> Reply {
        let result = match &self.strategy {
            Strategy::Mock => {
                return Reply {
                    text: mock_reply(text, language),
                    source: ReplySource::Mock,
                };
            }
            Strategy::ApiKey(client) => client
                .generate(&build_prompt(text, language))
                .await
                .map(|reply| (reply.text, ReplySource::Gemini(reply.model))),
            Strategy::Sdk(client) => client
                .generate(&build_prompt(text, language))
                .await
                .map(|reply| (reply, ReplySource::Vertex(client.model().to_string()))),
        };

        match result {
            Ok((text, source)) => Reply { text, source },
            Err(e) => {
                warn!(strategy = %self.kind(), error = %e, "upstream failed, replying with mock");
                Reply {
                    text: mock_reply(text, language),
                    source: ReplySource::Fallback,
                }
            }
        }
    }
}
