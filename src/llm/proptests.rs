//! Property-based tests for the provider wire layers
//!
//! - SSE decoding does not depend on how the body is chunked or which line
//!   ending it uses
//! - Proxy model ids are always namespaced and never keep a date suffix
//! - The first choice's content survives proxy reply parsing

use super::models::{proxy_model_id, PROXY_NAMESPACE};
use super::openrouter::test_helpers::parse_reply;
use super::stream::{SseDecoder, SseFrame};
use super::types::ProxyReply;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Frame payload without newlines
fn arb_data() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}\":,_.é]{1,40}"
}

fn arb_frames() -> impl Strategy<Value = Vec<(Option<String>, String)>> {
    proptest::collection::vec(
        (proptest::option::of("[a-z_]{3,20}"), arb_data()),
        1..8,
    )
}

fn arb_line_ending() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\r\n"), Just("\r")]
}

fn encode(frames: &[(Option<String>, String)], eol: &str) -> Vec<u8> {
    let mut body = String::new();
    for (event, data) in frames {
        if let Some(event) = event {
            body.push_str(&format!("event: {event}{eol}"));
        }
        body.push_str(&format!("data: {data}{eol}{eol}"));
    }
    body.into_bytes()
}

fn decode_in_chunks(body: &[u8], cuts: &[usize]) -> Vec<SseFrame> {
    let mut decoder = SseDecoder::new();
    let mut frames = Vec::new();
    let mut start = 0;
    let mut cuts: Vec<usize> = cuts.iter().map(|c| c % (body.len() + 1)).collect();
    cuts.sort_unstable();
    for cut in cuts {
        if cut > start {
            frames.extend(decoder.push(&body[start..cut]));
            start = cut;
        }
    }
    frames.extend(decoder.push(&body[start..]));
    frames
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Arbitrary chunk boundaries yield the same frames as one whole body,
    /// whichever line ending the server uses
    #[test]
    fn prop_sse_chunking_invariant(
        frames in arb_frames(),
        eol in arb_line_ending(),
        cuts in proptest::collection::vec(any::<usize>(), 0..12),
    ) {
        let body = encode(&frames, eol);
        let whole = decode_in_chunks(&body, &[]);
        let chunked = decode_in_chunks(&body, &cuts);
        prop_assert_eq!(&whole, &chunked);
        prop_assert_eq!(whole.len(), frames.len());
        for (frame, (event, data)) in whole.iter().zip(frames.iter()) {
            prop_assert_eq!(&frame.event, event);
            prop_assert_eq!(&frame.data, data);
        }
    }

    /// Rewritten ids are namespaced exactly once and lose the date suffix
    #[test]
    fn prop_proxy_model_id_normalized(
        namespaced in any::<bool>(),
        core in "[a-z.]{1,10}(-[a-z0-9.]{1,6}){0,3}",
        date in proptest::option::of("[0-9]{8}"),
    ) {
        let mut id = String::new();
        if namespaced {
            id.push_str(PROXY_NAMESPACE);
        }
        id.push_str(&core);
        if let Some(date) = &date {
            id.push('-');
            id.push_str(date);
        }

        let rewritten = proxy_model_id(&id);
        prop_assert_eq!(&rewritten, &format!("{PROXY_NAMESPACE}{core}"));
        prop_assert_eq!(proxy_model_id(&rewritten), rewritten);
    }

    /// Whatever the first choice says is exactly what comes back
    #[test]
    fn prop_first_choice_content_preserved(
        content in "[a-zA-Z0-9 \n\"\\\\.!?]{0,80}",
        extra in proptest::collection::vec("[a-z ]{0,20}", 0..3),
    ) {
        let mut choices = vec![serde_json::json!({
            "message": {"role": "assistant", "content": content}
        })];
        choices.extend(extra.iter().map(|e| serde_json::json!({"message": {"content": e}})));
        let body = serde_json::json!({"choices": choices}).to_string();
        prop_assert_eq!(parse_reply(&body).unwrap(), ProxyReply::Answer(content));
    }
}
