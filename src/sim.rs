//! Deterministic in-process capabilities.
//!
//! The `run` command needs something to execute against without network
//! access, and demo scripts need output that is stable from run to run.
//! [`SimulatedChat`] streams an acknowledgment of what it was asked, word by
//! word with a typing delay; [`SimulatedEmbed`] derives its vector from a
//! hash of the request, so embedding previews never change between runs.

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::stream::StreamExt;
use sha2::{Digest, Sha256};
use tokio::time::sleep;

use crate::diagnostics::excerpt;
use crate::engine::capability::{
    CapabilityError, ChatCapability, ChatMessage, EmbedCapability, TokenStream,
};

/// Chat capability that echoes the request back as its reply.
pub struct SimulatedChat {
    word_delay: Duration,
}

impl SimulatedChat {
    pub fn new(word_delay_ms: u64) -> Self {
        Self {
            word_delay: Duration::from_millis(word_delay_ms),
        }
    }
}

#[async_trait]
impl ChatCapability for SimulatedChat {
    async fn chat_stream(
        &self,
        provider: &str,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<TokenStream, CapabilityError> {
        let reply = compose_reply(provider, model, &messages);
        let words: Vec<String> = reply.split_whitespace().map(|w| format!("{w} ")).collect();
        let delay = self.word_delay;
        Ok(stream! {
            for word in words {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                yield Ok(word);
            }
        }
        .boxed())
    }
}

fn compose_reply(provider: &str, model: &str, messages: &[ChatMessage]) -> String {
    let part = |role: &str| {
        messages
            .iter()
            .find(|message| message.role == role)
            .map(|message| excerpt(&message.content))
            .unwrap_or_default()
    };
    format!(
        "[{provider}/{model}] prompt: {} | input: {}",
        part("system"),
        part("user"),
    )
}

/// Embedding capability derived from a SHA-256 of the request.
pub struct SimulatedEmbed {
    dims: usize,
}

impl SimulatedEmbed {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl EmbedCapability for SimulatedEmbed {
    async fn embed(
        &self,
        _provider: &str,
        model: &str,
        text: &str,
    ) -> Result<Vec<f32>, CapabilityError> {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();

        Ok(digest
            .iter()
            .cycle()
            .take(self.dims)
            .map(|&byte| f32::from(byte) / 255.0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_chat_echoes_provider_model_and_request() {
        let chat = SimulatedChat::new(0);
        let stream = chat
            .chat_stream(
                "prov",
                "m",
                vec![
                    ChatMessage::system("stay brief"),
                    ChatMessage::user("the question"),
                ],
            )
            .await
            .unwrap();

        let chunks: Vec<String> = stream.map(|piece| piece.unwrap()).collect().await;
        assert!(chunks.iter().all(|chunk| chunk.ends_with(' ')));

        let full = chunks.concat();
        assert!(full.starts_with("[prov/m]"));
        assert!(full.contains("stay brief"));
        assert!(full.contains("the question"));
    }

    #[tokio::test]
    async fn test_simulated_embed_is_stable_and_sized() {
        let embed = SimulatedEmbed::new(16);

        let first = embed.embed("prov", "m", "payload").await.unwrap();
        let again = embed.embed("prov", "m", "payload").await.unwrap();
        let other = embed.embed("prov", "m", "different").await.unwrap();

        assert_eq!(first.len(), 16);
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert!(first.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
