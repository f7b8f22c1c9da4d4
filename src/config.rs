use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_VERTEX_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tried in order when model discovery is unavailable.
pub const FALLBACK_MODELS: [&str; 3] = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"];

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub location: String,
    pub vertex_model: String,
    pub port: u16,
    pub gemini_base_url: String,
    pub vertex_base_url: Option<String>,
    pub fallback_models: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let fallback_models = var("GEMINI_FALLBACK_MODELS")
            .map(|list| {
                list.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| FALLBACK_MODELS.iter().map(|m| m.to_string()).collect());

        let timeout_secs = var("AI_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key: var("GOOGLE_API_KEY"),
            project_id: var("GOOGLE_PROJECT_ID"),
            location: var("GOOGLE_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            vertex_model: var("GOOGLE_MODEL").unwrap_or_else(|| DEFAULT_VERTEX_MODEL.to_string()),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            gemini_base_url: var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE.to_string()),
            vertex_base_url: var("VERTEX_API_BASE"),
            fallback_models,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[cfg(test)]
impl Config {
    /// No credentials, built-in defaults.
    pub fn empty() -> Self {
        Self::from_lookup(|_| None)
    }
}
