//! Provider configuration and credential selection

use super::openrouter::REQUEST_TIMEOUT;
use std::time::Duration;

/// Default Anthropic Messages endpoint
pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default OpenRouter chat completions endpoint
pub const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// `X-Title` sent to OpenRouter when none is configured
pub const DEFAULT_APP_TITLE: &str = "Claude Lite";

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub anthropic_url: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_url: String,
    pub openrouter_referer: Option<String>,
    /// `None` when explicitly configured empty
    pub openrouter_title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_url: ANTHROPIC_MESSAGES_URL.to_string(),
            openrouter_api_key: None,
            openrouter_url: OPENROUTER_CHAT_URL.to_string(),
            openrouter_referer: None,
            openrouter_title: Some(DEFAULT_APP_TITLE.to_string()),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty keys count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            anthropic_url: non_empty("ANTHROPIC_API_URL")
                .unwrap_or_else(|| ANTHROPIC_MESSAGES_URL.to_string()),
            openrouter_api_key: non_empty("OPENROUTER_API_KEY"),
            openrouter_url: non_empty("OPENROUTER_CHAT_URL")
                .unwrap_or_else(|| OPENROUTER_CHAT_URL.to_string()),
            openrouter_referer: non_empty("OPENROUTER_HTTP_REFERER"),
            openrouter_title: Some(
                lookup("OPENROUTER_APP_TITLE").unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
            )
            .filter(|t| !t.is_empty()),
        }
    }

    /// Pick the upstream. The proxy key wins whenever it is present.
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(key) = &self.openrouter_api_key {
            return Some(Credentials::Proxy(ProxyConfig {
                api_key: key.clone(),
                url: self.openrouter_url.clone(),
                referer: self.openrouter_referer.clone(),
                title: self.openrouter_title.clone(),
                timeout: REQUEST_TIMEOUT,
            }));
        }

        self.anthropic_api_key
            .as_ref()
            .map(|key| Credentials::Direct(DirectConfig {
                api_key: key.clone(),
                url: self.anthropic_url.clone(),
            }))
    }
}

/// Resolved upstream for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Direct(DirectConfig),
    Proxy(ProxyConfig),
}

impl Credentials {
    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::Direct(_) => "direct",
            Credentials::Proxy(_) => "proxy",
        }
    }
}

/// Anthropic Messages API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectConfig {
    pub api_key: String,
    pub url: String,
}

/// OpenRouter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub api_key: String,
    pub url: String,
    pub referer: Option<String>,
    pub title: Option<String>,
    /// Whole round trip, connect through body
    pub timeout: Duration,
}
