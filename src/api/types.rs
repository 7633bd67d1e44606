//! API request and response types

use crate::chat::{Conversation, Notice, SendOutcome};
use crate::llm::ChatModel;
use serde::{Deserialize, Serialize};

/// Request carrying free-form prompt text
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Request to start a conversation from a suggestion chip
#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub suggestion: String,
}

/// Request to change the selected model
#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model: String,
}

/// Response for the send actions
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SendResponse {
    pub started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl From<SendOutcome> for SendResponse {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            // The fetch keeps running detached
            SendOutcome::Started { navigate_to, .. } => Self {
                started: true,
                redirect: navigate_to.map(|view| view.path().to_string()),
                notice: None,
            },
            SendOutcome::EmptyPrompt(notice) => Self {
                started: false,
                redirect: None,
                notice: Some(notice),
            },
            SendOutcome::Busy => Self {
                started: false,
                redirect: None,
                notice: None,
            },
        }
    }
}

/// Response for the clear action
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub redirect: String,
}

/// Response for the cancel action
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Response with the current conversation
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Conversation,
}

/// Entry of the model table
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub id: String,
}

impl From<ChatModel> for ModelInfo {
    fn from(model: ChatModel) -> Self {
        Self {
            name: model.display_name().to_string(),
            id: model.api_name().to_string(),
        }
    }
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
    pub selected: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
