//! Workflow-region parsing: an arrow chain into a start input and stages.

use crate::ast::{OperatorNode, Stage, WorkflowAst};
use crate::diagnostics::{excerpt, SyntaxError};

use super::is_input_name;

/// Parse the expanded workflow text into an AST.
///
/// The chain is split on `->` with empty tokens dropped. Each remaining
/// token is either a `{…}` parallel block or a single operator node. The two
/// forms degrade differently: a parallel block keeps its valid nodes and
/// drops itself only when none parse, letting later stages continue, while a
/// bare token that fails to parse invalidates the whole workflow; a single
/// malformed stage leaves no defensible reading of the chain around it.
pub(super) fn parse_workflow(
    text: &str,
    errors: &mut Vec<SyntaxError>,
) -> Option<WorkflowAst> {
    let parts: Vec<&str> = text
        .split("->")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() < 2 {
        errors.push(SyntaxError::MissingStages);
        return None;
    }

    let start_input = parts[0];
    if !is_input_name(start_input) {
        errors.push(SyntaxError::MissingStartInput {
            found: start_input.to_string(),
        });
        return None;
    }

    let mut stages = Vec::new();
    for part in &parts[1..] {
        if let Some(interior) = part.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
            if let Some(stage) = parse_parallel_block(part, interior, errors) {
                stages.push(stage);
            }
        } else {
            match parse_operator(part) {
                Some(node) => stages.push(Stage::Single { node }),
                None => {
                    errors.push(SyntaxError::InvalidOperator {
                        node: (*part).to_string(),
                    });
                    return None;
                }
            }
        }
    }

    if stages.is_empty() {
        // Every stage token failed; the diagnostics above already say why.
        return None;
    }

    Some(WorkflowAst {
        start_input: start_input.to_string(),
        stages,
    })
}

/// Parse the interior of a `{a, b, c}` block. Invalid nodes are reported
/// individually; the block survives as long as one node parses.
fn parse_parallel_block(
    part: &str,
    interior: &str,
    errors: &mut Vec<SyntaxError>,
) -> Option<Stage> {
    let node_texts: Vec<&str> = interior
        .split(',')
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    if node_texts.is_empty() {
        errors.push(SyntaxError::EmptyParallelBlock {
            statement: excerpt(part),
        });
        return None;
    }

    let mut nodes = Vec::new();
    for node_text in node_texts {
        match parse_operator(node_text) {
            Some(node) => nodes.push(node),
            None => errors.push(SyntaxError::InvalidOperator {
                node: node_text.to_string(),
            }),
        }
    }

    if nodes.is_empty() {
        errors.push(SyntaxError::InvalidParallelBlock {
            statement: excerpt(part),
        });
        return None;
    }

    Some(Stage::Parallel { nodes })
}

/* ===================== Operator Grammar ===================== */

/// Parse one operator node: `M_prompt` or `M_prompt(input)`.
///
/// One uppercase model letter, an underscore, a lowercase-started
/// alphanumeric prompt name, and an optional parenthesized input name. The
/// shape is small and fixed, so this walks bytes directly; anything left
/// over after the shape is a failure.
fn parse_operator(text: &str) -> Option<OperatorNode> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut pos = 0;

    let model = *bytes.first().filter(|b| b.is_ascii_uppercase())?;
    pos += 1;
    if bytes.get(pos) != Some(&b'_') {
        return None;
    }
    pos += 1;

    let prompt_start = pos;
    match bytes.get(pos) {
        Some(b) if b.is_ascii_lowercase() => pos += 1,
        _ => return None,
    }
    while matches!(bytes.get(pos), Some(b) if b.is_ascii_alphanumeric()) {
        pos += 1;
    }
    let prompt = &text[prompt_start..pos];

    let extra_input = if bytes.get(pos) == Some(&b'(') {
        pos += 1;
        let arg_start = pos;
        if bytes.get(pos) != Some(&b'i') {
            return None;
        }
        pos += 1;
        while matches!(bytes.get(pos), Some(b) if b.is_ascii_alphanumeric()) {
            pos += 1;
        }
        let arg = &text[arg_start..pos];
        if bytes.get(pos) != Some(&b')') {
            return None;
        }
        pos += 1;
        Some(arg.to_string())
    } else {
        None
    };

    (pos == bytes.len()).then(|| OperatorNode {
        model: (model as char).to_string(),
        prompt: prompt.to_string(),
        extra_input,
    })
}
