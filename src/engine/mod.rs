//! Streaming execution engine.
//!
//! [`FlowRunner`] turns a parsed script into a transcript stream. The stream
//! is the engine's whole asynchronous contract: it is pull-based and lazy,
//! so dropping it stops execution at the next suspension point, and nothing
//! runs before the first poll. Parse diagnostics, stage markers, model
//! output, and inline notices all arrive through the same `String` items.

pub mod capability;
mod node;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_stream::stream;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::ast::{ParsedScript, Stage};
use crate::diagnostics::ExecutionError;
use crate::parser;

use self::capability::{ChatCapability, EmbedCapability};
use self::node::{run_node, NodeEvent};

/* ===================== Runner ===================== */

/// The execution engine, bound to its two capabilities at construction.
pub struct FlowRunner {
    chat: Arc<dyn ChatCapability>,
    embed: Arc<dyn EmbedCapability>,
}

impl FlowRunner {
    pub fn new(chat: Arc<dyn ChatCapability>, embed: Arc<dyn EmbedCapability>) -> Self {
        Self { chat, embed }
    }

    /// Parse and execute a script in one step.
    pub fn run_script(&self, script: &str) -> BoxStream<'static, String> {
        self.execute(parser::parse(script))
    }

    /// Execute a parsed script, streaming the transcript.
    ///
    /// Any parse diagnostic blocks execution: the stream carries the labeled
    /// error list and nothing else. At run time only an undefined start
    /// input is fatal; every other problem is rendered inline and the run
    /// continues. The returned stream owns everything it needs, so it may
    /// outlive the runner.
    pub fn execute(&self, script: ParsedScript) -> BoxStream<'static, String> {
        let chat = Arc::clone(&self.chat);
        let embed = Arc::clone(&self.embed);

        let transcript = stream! {
            if !script.errors.is_empty() {
                yield "**[Flowscript Parse Error]**\n".to_string();
                for error in &script.errors {
                    yield format!("- {error}\n");
                }
                return;
            }

            let workflow = match script.workflow {
                Some(workflow) => workflow,
                None => {
                    yield "**[Flowscript Execution Error]**\n- No valid workflow found to execute.".to_string();
                    return;
                }
            };

            let namespaces = Arc::new(script.namespaces);
            let mut current_input = match namespaces.inputs.get(&workflow.start_input) {
                Some(value) => value.clone(),
                None => {
                    let err = ExecutionError::UndefinedStartInput {
                        name: workflow.start_input.clone(),
                    };
                    yield format!("**[Flowscript Execution Error]**\n- {err}.");
                    return;
                }
            };

            let stage_count = workflow.stages.len();
            for (index, stage) in workflow.stages.into_iter().enumerate() {
                debug!(stage = index + 1, of = stage_count, "executing stage");
                yield format!("\n\n---\n**Executing Stage {}**\n---\n", index + 1);

                let mut outcomes: Vec<Result<String, ExecutionError>> = Vec::new();
                match stage {
                    Stage::Single { node } => {
                        let mut events = Box::pin(run_node(
                            node,
                            current_input.clone(),
                            Arc::clone(&namespaces),
                            Arc::clone(&chat),
                            Arc::clone(&embed),
                        ));
                        while let Some(event) = events.next().await {
                            match event {
                                NodeEvent::Chunk(text) => yield text,
                                NodeEvent::Finished(outcome) => outcomes.push(outcome),
                            }
                        }
                    }
                    Stage::Parallel { nodes } => {
                        // One task per node; each channel buffers its node's
                        // events while earlier nodes are being drained, so
                        // transcript order is the declared node order no
                        // matter which call finishes first.
                        let mut receivers = Vec::with_capacity(nodes.len());
                        for node in nodes {
                            let (sender, receiver) = mpsc::unbounded_channel();
                            let events = run_node(
                                node,
                                current_input.clone(),
                                Arc::clone(&namespaces),
                                Arc::clone(&chat),
                                Arc::clone(&embed),
                            );
                            tokio::spawn(async move {
                                let mut events = Box::pin(events);
                                while let Some(event) = events.next().await {
                                    if sender.send(event).is_err() {
                                        break;
                                    }
                                }
                            });
                            receivers.push(receiver);
                        }
                        for mut receiver in receivers {
                            while let Some(event) = receiver.recv().await {
                                match event {
                                    NodeEvent::Chunk(text) => yield text,
                                    NodeEvent::Finished(outcome) => outcomes.push(outcome),
                                }
                            }
                        }
                    }
                }

                current_input = join_contributions(outcomes);
            }

            yield "\n\n---\n**Flowscript Execution Finished**\n---".to_string();
        };

        transcript.boxed()
    }
}

/// Fold a stage's outcomes into the next stage's input.
///
/// `Ok` texts join with a blank line in declared node order; an empty
/// success still occupies a slot. `Err` outcomes vanish entirely, so a
/// stage of only skipped or failed nodes hands the next stage an empty
/// input rather than stopping the run.
fn join_contributions(outcomes: Vec<Result<String, ExecutionError>>) -> String {
    let texts: Vec<String> = outcomes.into_iter().filter_map(Result::ok).collect();
    texts.join("\n\n")
}
