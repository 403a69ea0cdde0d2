//! Single-node evaluation.
//!
//! A node runs as a stream of [`NodeEvent`]s so the same driver code works
//! for an inline single stage and for a fan-out task feeding a channel. All
//! transcript text a node produces, markers included, travels as `Chunk`
//! events; exactly one `Finished` event closes the stream.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::{Stream, StreamExt};
use tracing::debug;

use crate::ast::{Namespaces, OperatorNode};
use crate::diagnostics::ExecutionError;

use super::capability::{ChatCapability, ChatMessage, EmbedCapability};

/// One event from a running node.
#[derive(Debug)]
pub(super) enum NodeEvent {
    /// Transcript text, forwarded verbatim.
    Chunk(String),
    /// The node's contribution to the stage join.
    Finished(Result<String, ExecutionError>),
}

/// What a resolved model name is for, decided at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ModelKind {
    Chat,
    Embedding,
}

pub(super) fn model_kind(model: &str) -> ModelKind {
    if model.to_ascii_lowercase().contains("embedding") {
        ModelKind::Embedding
    } else {
        ModelKind::Chat
    }
}

/// Evaluate one operator node against the stage input.
///
/// Missing model or prompt bindings skip the node. A missing extra input is
/// only warned about. Everything past those checks is a capability call;
/// any failure there is rendered inline and becomes an `Err` outcome, never
/// a panic or an engine stop.
pub(super) fn run_node(
    node: OperatorNode,
    current_input: String,
    namespaces: Arc<Namespaces>,
    chat: Arc<dyn ChatCapability>,
    embed: Arc<dyn EmbedCapability>,
) -> impl Stream<Item = NodeEvent> + Send {
    stream! {
        let resolved = (
            namespaces.models.get(&node.model).cloned(),
            namespaces.prompts.get(&node.prompt).cloned(),
        );
        let (model_id, prompt_text) = match resolved {
            (Some(model_id), Some(prompt_text)) => (model_id, prompt_text),
            _ => {
                debug!(node = %node, "skipping node with unresolved bindings");
                let err = ExecutionError::NodeSkipped { node: node.to_string() };
                yield NodeEvent::Chunk(format!("\n**[Skip]** {err}. "));
                yield NodeEvent::Finished(Err(err));
                return;
            }
        };

        let mut final_input = current_input;
        if let Some(extra) = &node.extra_input {
            match namespaces.inputs.get(extra) {
                Some(content) => {
                    final_input.push_str("\n\n");
                    final_input.push_str(content);
                }
                None => {
                    let warning = ExecutionError::UndefinedExtraInput {
                        name: extra.clone(),
                        node: node.to_string(),
                    };
                    yield NodeEvent::Chunk(format!("\n**[Warning]** {warning}. Ignoring."));
                }
            }
        }

        yield NodeEvent::Chunk(format!("\n**Model:** `{model_id}`\n\n"));

        let (provider, model) = match model_id.split_once(':') {
            Some((provider, model)) => (provider.to_ascii_lowercase(), model.to_string()),
            None => {
                let err = ExecutionError::MalformedModelId { model: model_id.clone() };
                yield NodeEvent::Chunk(call_failure(&model_id, &err));
                yield NodeEvent::Finished(Err(err));
                return;
            }
        };

        match model_kind(&model) {
            ModelKind::Chat => {
                let messages = vec![
                    ChatMessage::system(prompt_text),
                    ChatMessage::user(final_input),
                ];
                match chat.chat_stream(&provider, &model, messages).await {
                    Ok(tokens) => {
                        let mut tokens = tokens;
                        let mut full_output = String::new();
                        let mut failure = None;
                        while let Some(piece) = tokens.next().await {
                            match piece {
                                Ok(chunk) => {
                                    full_output.push_str(&chunk);
                                    yield NodeEvent::Chunk(chunk);
                                }
                                Err(err) => {
                                    failure = Some(ExecutionError::from(err));
                                    break;
                                }
                            }
                        }
                        match failure {
                            // A partial transcript stays visible, but an
                            // interrupted node contributes nothing downstream.
                            Some(err) => {
                                yield NodeEvent::Chunk(call_failure(&model_id, &err));
                                yield NodeEvent::Finished(Err(err));
                            }
                            None => yield NodeEvent::Finished(Ok(full_output)),
                        }
                    }
                    Err(err) => {
                        let err = ExecutionError::from(err);
                        yield NodeEvent::Chunk(call_failure(&model_id, &err));
                        yield NodeEvent::Finished(Err(err));
                    }
                }
            }
            ModelKind::Embedding => {
                yield NodeEvent::Chunk("(Running Embedding model...)\n".to_string());
                match embed.embed(&provider, &model, &final_input).await {
                    Ok(vector) => {
                        let preview = embedding_preview(&vector);
                        yield NodeEvent::Chunk(preview.clone());
                        yield NodeEvent::Finished(Ok(preview));
                    }
                    Err(err) => {
                        let err = ExecutionError::from(err);
                        yield NodeEvent::Chunk(call_failure(&model_id, &err));
                        yield NodeEvent::Finished(Err(err));
                    }
                }
            }
        }
    }
}

fn call_failure(model_id: &str, err: &ExecutionError) -> String {
    format!("\n\n**[Execution Error]** Failed to call model {model_id}: {err}")
}

/// The preview string is the node's whole contribution; the vector itself
/// goes no further.
fn embedding_preview(vector: &[f32]) -> String {
    let shown = &vector[..vector.len().min(5)];
    format!("Embedding Vector (first 5 dims): {shown:?}...")
}
