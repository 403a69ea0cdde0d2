//! Parse-time and run-time diagnostics.
//!
//! The two taxonomies have different fatality policies. Syntax errors are
//! accumulated during parsing and never raised one at a time; any accumulated
//! entry blocks execution, and the whole list is surfaced to the caller
//! instead of output. Execution errors are rendered inline into the output
//! stream as the run proceeds; only an undefined start input aborts the run.

use thiserror::Error;

use crate::engine::capability::CapabilityError;

/// Longest statement excerpt embedded in a diagnostic message.
const EXCERPT_LEN: usize = 70;

/// Truncate an offending statement for embedding in a message.
pub(crate) fn excerpt(statement: &str) -> String {
    let mut chars = statement.chars();
    let head: String = chars.by_ref().take(EXCERPT_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// A parse-time problem. Accumulated, never raised individually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Invalid variable name format '{name}' in statement: '{statement}'")]
    InvalidVariableName { name: String, statement: String },

    #[error("Assignment variable or value is empty in statement: '{statement}'")]
    EmptyAssignment { statement: String },

    #[error("Unrecognized content in assignments block: '{content}'")]
    UnrecognizedAssignments { content: String },

    #[error("Loop repetition count must be a positive integer in statement: '{statement}'")]
    NonPositiveLoopCount { statement: String },

    #[error("Invalid operator syntax '{node}'")]
    InvalidOperator { node: String },

    #[error("Parallel block '{{}}' cannot be empty in statement: '{statement}'")]
    EmptyParallelBlock { statement: String },

    #[error("Invalid content within parallel block in statement: '{statement}'")]
    InvalidParallelBlock { statement: String },

    #[error("Multiple workflow definitions found, only one is allowed in statement: '{statement}'")]
    MultipleWorkflows { statement: String },

    #[error("Workflow must start with an input variable (e.g., i, i1), but found '{found}'")]
    MissingStartInput { found: String },

    #[error("Workflow must contain at least one '->' operator and a starting input")]
    MissingStages,

    #[error("No workflow statement ('->') found in the code")]
    NoWorkflow,
}

/// A run-time condition observed while walking the stage list.
///
/// All variants except `UndefinedStartInput` degrade a single node and let
/// the run continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Start input variable '{name}' is not defined")]
    UndefinedStartInput { name: String },

    #[error("Node {node}: Model or Prompt variable not defined")]
    NodeSkipped { node: String },

    #[error("Extra input '{name}' for node {node} not defined")]
    UndefinedExtraInput { name: String, node: String },

    #[error("model identifier '{model}' has no 'Provider:' prefix")]
    MalformedModelId { model: String },

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
