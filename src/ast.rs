//! Script data model: namespaces, operator nodes, stages, and the workflow AST.
//!
//! Everything here is built fresh by one `parse` call and owned by the caller;
//! no type in this module carries state between invocations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::diagnostics::SyntaxError;

/// The three disjoint variable tables a script declares.
///
/// A name's lexical shape decides its table: a single uppercase letter is a
/// model binding, `i` followed by alphanumerics is an input text, `p` followed
/// by alphanumerics is a prompt text. Keys are case-sensitive and unique per
/// table; re-declaring a key overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    /// Model bindings: key is one uppercase letter, value is `Provider:model`.
    pub models: HashMap<String, String>,
    /// Input texts: key starts with `i`.
    pub inputs: HashMap<String, String>,
    /// Prompt texts: key starts with `p`.
    pub prompts: HashMap<String, String>,
}

impl Namespaces {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.inputs.is_empty() && self.prompts.is_empty()
    }
}

/// One model invocation: a model binding, a prompt, and an optional extra
/// input appended to the stage's flowing text.
///
/// References are stored as names and resolved against the namespaces at
/// execution time, not at parse time; a reference may be declared later in
/// the script, or never, in which case it is a run-time condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_input: Option<String>,
}

impl fmt::Display for OperatorNode {
    /// The `A_p1` label used by runtime notices.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.model, self.prompt)
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Stage {
    /// A single operator node; its output becomes the next stage's input.
    Single { node: OperatorNode },
    /// A fan-out block `{a, b, …}`; outputs are joined in declared order.
    Parallel { nodes: Vec<OperatorNode> },
}

impl Stage {
    /// The nodes this stage will run, in declared order.
    pub fn nodes(&self) -> &[OperatorNode] {
        match self {
            Stage::Single { node } => std::slice::from_ref(node),
            Stage::Parallel { nodes } => nodes,
        }
    }
}

/// A parsed pipeline: the starting input reference and the ordered stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAst {
    /// Name of the input that seeds the first stage. Shape-checked at parse
    /// time, resolved (and possibly found missing) at execution time.
    pub start_input: String,
    pub stages: Vec<Stage>,
}

/// Immutable result of parsing one script.
///
/// `workflow` is `None` when no pipeline could be built; `errors` holds every
/// accumulated parse diagnostic. Execution refuses to start while `errors` is
/// non-empty. The formatted fields preserve what the parser understood, for
/// the `check` report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    pub namespaces: Namespaces,
    pub workflow: Option<WorkflowAst>,
    pub errors: Vec<SyntaxError>,
    /// Re-printed `name = value` lines, one per recognized assignment.
    pub formatted_assignments: Vec<String>,
    /// The workflow text after loop expansion, before stage splitting.
    pub expanded_workflow: String,
}

impl ParsedScript {
    /// True when the parse produced no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
