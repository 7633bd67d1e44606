//! Trait abstractions for fetcher I/O
//!
//! These traits enable testing the fetcher without touching the process
//! environment or the network.

use crate::llm::LlmConfig;
use std::sync::Arc;

/// Where the fetcher reads provider credentials from. Consulted once per
/// fetch, so key changes take effect on the next send.
pub trait CredentialSource: Send + Sync {
    fn load(&self) -> LlmConfig;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn load(&self) -> LlmConfig {
        LlmConfig::from_env()
    }
}

/// A fixed configuration
impl CredentialSource for LlmConfig {
    fn load(&self) -> LlmConfig {
        self.clone()
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn load(&self) -> LlmConfig {
        (**self).load()
    }
}
