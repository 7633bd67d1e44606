//! Property-based tests for the conversation model
//!
//! - Outbound history never carries greetings, blank messages or the placeholder
//! - The prompt of the current exchange is sent exactly once, last
//! - Blank prompts never change the conversation
//! - Exchange numbers only move forward

use super::state::{Conversation, Message};
use super::testing::{direct_config, store_with, MockCompletionService};
use super::SendOutcome;
use crate::llm::{LlmMessage, MessageRole};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_content() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t\n]{1,4}",
        "[a-z ]{1,20}",
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (any::<bool>(), arb_content(), proptest::option::of(any::<bool>())).prop_map(
        |(is_user, content, greeting)| {
            if is_user {
                Message::user(content)
            } else {
                Message {
                    role: MessageRole::Assistant,
                    content,
                    is_initial_greeting: greeting,
                }
            }
        },
    )
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec(arb_message(), 0..12)
}

#[derive(Debug, Clone)]
enum Op {
    Begin(String),
    Reset,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Op::Begin),
        Just(Op::Reset),
    ]
}

fn sendable(m: &Message) -> bool {
    !m.content.trim().is_empty() && !m.is_greeting()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_outbound_is_filtered_history(history in arb_history(), prompt in "[a-z]{1,10}") {
        let mut conv = Conversation::default();
        conv.messages.clone_from(&history);
        conv.begin_exchange(&prompt);

        let expected: Vec<LlmMessage> = history
            .iter()
            .filter(|m| sendable(m))
            .map(|m| LlmMessage { role: m.role, content: m.content.clone() })
            .chain(std::iter::once(LlmMessage::user(prompt.clone())))
            .collect();

        let outbound = conv.outbound_messages();
        prop_assert!(outbound.iter().all(|m| !m.content.trim().is_empty()));
        prop_assert_eq!(outbound, expected);
    }

    #[test]
    fn prop_current_prompt_sent_once(history in arb_history(), prompt in "[A-Z]{1,10}") {
        // Uppercase prompts cannot collide with the lowercase history
        let mut conv = Conversation::default();
        conv.messages = history;
        conv.begin_exchange(&prompt);

        let outbound = conv.outbound_messages();
        let count = outbound.iter().filter(|m| m.content == prompt).count();
        prop_assert_eq!(count, 1);
        prop_assert_eq!(outbound.last(), Some(&LlmMessage::user(prompt)));
    }

    #[test]
    fn prop_blank_prompts_change_nothing(prompt in "[ \t\n\r]{0,8}") {
        let store = store_with(Arc::new(MockCompletionService::new()), direct_config());
        let before = store.snapshot();

        prop_assert!(matches!(store.send_message(&prompt), SendOutcome::EmptyPrompt(_)));
        prop_assert!(matches!(store.send_initial_message(&prompt), SendOutcome::EmptyPrompt(_)));
        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn prop_exchange_monotonic(ops in proptest::collection::vec(arb_op(), 1..20)) {
        let mut conv = Conversation::default();
        let mut last = conv.exchange();
        for op in ops {
            match op {
                Op::Begin(prompt) => {
                    conv.begin_exchange(&prompt);
                    prop_assert!(conv.is_streaming);
                    prop_assert_eq!(conv.placeholder_index(), Some(conv.messages.len() - 1));
                }
                Op::Reset => {
                    conv.reset();
                    prop_assert!(conv.messages.is_empty());
                    prop_assert!(!conv.is_streaming);
                }
            }
            prop_assert!(conv.exchange() > last);
            last = conv.exchange();
        }
    }
}
