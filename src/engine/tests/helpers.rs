//! Test doubles for the two capabilities plus transcript collection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

use crate::engine::capability::{
    CapabilityError, ChatCapability, ChatMessage, EmbedCapability, TokenStream,
};
use crate::engine::FlowRunner;

/// One recorded chat invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCall {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// One recorded embedding invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedCall {
    pub provider: String,
    pub model: String,
    pub text: String,
}

#[derive(Debug, Clone)]
struct ModelScript {
    chunks: Vec<String>,
    delay: Duration,
    fail_with: Option<String>,
}

/// Chat capability with a scripted reply per model name.
///
/// Replies stream chunk by chunk after an optional virtual-time delay, and
/// every invocation is recorded for later assertions. Calling a model with
/// no script is a request failure, which keeps miswired tests loud.
#[derive(Default)]
pub struct ScriptedChat {
    scripts: HashMap<String, ModelScript>,
    calls: Mutex<Vec<ChatCall>>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, model: &str, chunks: &[&str]) -> Self {
        self.reply_after(model, chunks, Duration::ZERO)
    }

    pub fn reply_after(mut self, model: &str, chunks: &[&str], delay: Duration) -> Self {
        self.scripts.insert(
            model.to_string(),
            ModelScript {
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
                delay,
                fail_with: None,
            },
        );
        self
    }

    /// Yield `chunks`, then break the stream with `reason`.
    pub fn fail_mid_stream(mut self, model: &str, chunks: &[&str], reason: &str) -> Self {
        self.scripts.insert(
            model.to_string(),
            ModelScript {
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
                delay: Duration::ZERO,
                fail_with: Some(reason.to_string()),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_for<'a>(calls: &'a [ChatCall], model: &str) -> &'a ChatCall {
        calls
            .iter()
            .find(|call| call.model == model)
            .unwrap_or_else(|| panic!("no recorded call for model {model:?}"))
    }
}

#[async_trait]
impl ChatCapability for ScriptedChat {
    async fn chat_stream(
        &self,
        provider: &str,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<TokenStream, CapabilityError> {
        self.calls.lock().unwrap().push(ChatCall {
            provider: provider.to_string(),
            model: model.to_string(),
            messages,
        });
        let script = self
            .scripts
            .get(model)
            .cloned()
            .ok_or_else(|| CapabilityError::Request(format!("no scripted reply for model '{model}'")))?;
        Ok(async_stream::stream! {
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            for chunk in script.chunks {
                yield Ok(chunk);
            }
            if let Some(reason) = script.fail_with {
                yield Err(CapabilityError::Stream(reason));
            }
        }
        .boxed())
    }
}

/// Chat capability that refuses every call.
pub struct FailingChat {
    reason: String,
}

impl FailingChat {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ChatCapability for FailingChat {
    async fn chat_stream(
        &self,
        _provider: &str,
        _model: &str,
        _messages: Vec<ChatMessage>,
    ) -> Result<TokenStream, CapabilityError> {
        Err(CapabilityError::Request(self.reason.clone()))
    }
}

/// Embedding capability returning one fixed vector, or one fixed failure.
pub struct ScriptedEmbed {
    outcome: Result<Vec<f32>, String>,
    calls: Mutex<Vec<EmbedCall>>,
}

impl ScriptedEmbed {
    pub fn of(vector: Vec<f32>) -> Self {
        Self {
            outcome: Ok(vector),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<EmbedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbedCapability for ScriptedEmbed {
    async fn embed(
        &self,
        provider: &str,
        model: &str,
        text: &str,
    ) -> Result<Vec<f32>, CapabilityError> {
        self.calls.lock().unwrap().push(EmbedCall {
            provider: provider.to_string(),
            model: model.to_string(),
            text: text.to_string(),
        });
        self.outcome.clone().map_err(CapabilityError::Request)
    }
}

/// Build a runner over already-shared fakes.
pub fn runner(chat: &Arc<ScriptedChat>, embed: &Arc<ScriptedEmbed>) -> FlowRunner {
    let chat = Arc::clone(chat);
    let embed = Arc::clone(embed);
    FlowRunner::new(chat, embed)
}

/// Drain a transcript stream into one string.
pub async fn collect(stream: BoxStream<'static, String>) -> String {
    stream.collect::<Vec<String>>().await.concat()
}

/// Position of `needle` in the transcript, panicking with context when missing.
pub fn index_of(transcript: &str, needle: &str) -> usize {
    transcript
        .find(needle)
        .unwrap_or_else(|| panic!("transcript is missing {needle:?}:\n{transcript}"))
}
