//! Capability seams the engine depends on but does not implement.
//!
//! The hosting system supplies one chat-streaming capability and one
//! embedding capability at `FlowRunner` construction. Tests substitute
//! deterministic fakes; the CLI wires in the simulator from [`crate::sim`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An ordered, finite sequence of text fragments from a chat model.
///
/// The stream may yield an error mid-sequence; the engine treats that as a
/// per-node failure, not a reason to unwind.
pub type TokenStream = BoxStream<'static, Result<String, CapabilityError>>;

/// One entry of a chat conversation in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Failure raised by a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The named provider is not configured or reachable.
    #[error("provider '{0}' is not available")]
    Unavailable(String),

    /// The call was issued but failed outright.
    #[error("request failed: {0}")]
    Request(String),

    /// The call failed partway through a streamed response.
    #[error("stream interrupted: {0}")]
    Stream(String),
}

/// Streaming chat completion, supplied by the hosting system.
#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Start a chat call and return its fragment stream.
    ///
    /// `model` is the bare model name, already stripped of its provider
    /// prefix; `messages` arrive in wire order.
    async fn chat_stream(
        &self,
        provider: &str,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<TokenStream, CapabilityError>;
}

/// Text embedding, supplied by the hosting system.
#[async_trait]
pub trait EmbedCapability: Send + Sync {
    /// Embed `text` and return the fixed-size vector.
    async fn embed(
        &self,
        provider: &str,
        model: &str,
        text: &str,
    ) -> Result<Vec<f32>, CapabilityError>;
}
