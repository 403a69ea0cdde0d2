//! Flowscript: a tiny streaming workflow language for chat models.
//!
//! A script declares single-letter model bindings, `i…` inputs, and `p…`
//! prompts, then wires them into a pipeline of sequential and fan-out
//! stages:
//!
//! ```text
//! A = Anthropic:claude-sonnet, B = OpenAI:gpt-4o
//! i = What is ownership in Rust?
//! p1 = Answer in one paragraph.
//! p2 = Answer with a code example.
//! p3 = Merge the two answers.
//! i -> {A_p1, B_p2} -> A_p3(i)
//! ```
//!
//! [`parser::parse`] turns script text into an immutable [`ParsedScript`];
//! [`FlowRunner`] executes one against two injected capabilities, yielding
//! the whole transcript as a pull-based stream of strings.

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod parser;
pub mod report;
pub mod sim;

// Re-export the main types
pub use ast::{Namespaces, OperatorNode, ParsedScript, Stage, WorkflowAst};
pub use diagnostics::{ExecutionError, SyntaxError};
pub use engine::capability::{
    CapabilityError, ChatCapability, ChatMessage, EmbedCapability, TokenStream,
};
pub use engine::FlowRunner;
pub use parser::parse;
