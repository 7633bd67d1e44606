//! Model selector table
//!
//! Human-readable model names shown in the selector, mapped to the concrete
//! Anthropic model identifiers sent upstream.

use regex::Regex;
use std::sync::OnceLock;

/// Identifier used when the selected name is not in the table
pub const FALLBACK_MODEL_ID: &str = "claude-3-haiku-20240307";

/// Provider namespace OpenRouter routes Anthropic models under
pub const PROXY_NAMESPACE: &str = "anthropic/";

/// Selectable models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChatModel {
    Claude37Sonnet,
    Claude35Opus,
    #[default]
    Claude3Haiku,
}

impl ChatModel {
    pub const ALL: [ChatModel; 3] = [
        ChatModel::Claude37Sonnet,
        ChatModel::Claude35Opus,
        ChatModel::Claude3Haiku,
    ];

    /// Name shown in the selector
    pub fn display_name(self) -> &'static str {
        match self {
            ChatModel::Claude37Sonnet => "Claude 3.7 Sonnet",
            ChatModel::Claude35Opus => "Claude 3.5 Opus",
            ChatModel::Claude3Haiku => "Claude 3 Haiku",
        }
    }

    /// Identifier sent to the provider
    pub fn api_name(self) -> &'static str {
        match self {
            ChatModel::Claude37Sonnet => "claude-3-5-sonnet-20240620",
            ChatModel::Claude35Opus => "claude-3-opus-20240229",
            ChatModel::Claude3Haiku => "claude-3-haiku-20240307",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.display_name() == name)
    }
}

/// Resolve a selector name to a provider model id, falling back for
/// unrecognized names.
pub fn resolve_model_id(selected: &str) -> &'static str {
    ChatModel::from_display_name(selected).map_or(FALLBACK_MODEL_ID, ChatModel::api_name)
}

fn date_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\d{8}$").expect("valid date suffix pattern"))
}

/// OpenRouter model id for an Anthropic model id: the trailing `-YYYYMMDD`
/// is dropped and the id is namespaced under `anthropic/`.
pub fn proxy_model_id(model_id: &str) -> String {
    let core = date_suffix().replace(model_id, "");
    if core.starts_with(PROXY_NAMESPACE) {
        core.into_owned()
    } else {
        format!("{PROXY_NAMESPACE}{core}")
    }
}
