//! Flowscript parser.
//!
//! `parse` is a pure function from script text to an immutable
//! [`ParsedScript`]; nothing is cached between calls. The pipeline is:
//! split the raw text into a declaration region and a workflow region
//! (this module), parse declarations into the three namespaces
//! ([`assignments`]), expand bounded repetition textually ([`loops`]), then
//! build the stage list ([`workflow`]). Diagnostics accumulate across all
//! four phases; none of them aborts the others.

use regex::Regex;
use std::sync::OnceLock;

use crate::ast::ParsedScript;
use crate::diagnostics::{excerpt, SyntaxError};

mod assignments;
mod loops;
mod workflow;


/// Parse a complete script into namespaces, a workflow AST, and diagnostics.
pub fn parse(script: &str) -> ParsedScript {
    let mut errors = Vec::new();

    let extraction = extract(script);
    let (namespaces, formatted_assignments) =
        assignments::parse_assignments(&extraction.declarations, &mut errors);

    let mut parsed_workflow = None;
    let mut expanded_workflow = String::new();
    match extraction.workflow {
        Some(raw) => {
            let expanded = loops::expand(&raw, &mut errors);
            parsed_workflow = workflow::parse_workflow(&expanded, &mut errors);
            expanded_workflow = expanded;
        }
        None => errors.push(SyntaxError::NoWorkflow),
    }

    for extra in extraction.extra_workflows {
        errors.push(SyntaxError::MultipleWorkflows {
            statement: excerpt(&extra),
        });
    }

    ParsedScript {
        namespaces,
        workflow: parsed_workflow,
        errors,
        formatted_assignments,
        expanded_workflow,
    }
}

/* ===================== Region Extraction ===================== */

/// Raw script text split into its two regions.
struct Extraction {
    /// Everything before the workflow token, joined with single spaces.
    declarations: String,
    /// The workflow region, if a workflow token was found.
    workflow: Option<String>,
    /// Later lines that opened a second pipeline; reported and dropped.
    extra_workflows: Vec<String>,
}

/// Split the script at the first workflow-start token.
///
/// The token is an input name followed by `[` or `->`. On the line where it
/// first appears, text before the token still belongs to the declaration
/// region. Every later line is appended to the workflow region wholesale,
/// since a pipeline may span lines and a line that merely looks like a
/// declaration is workflow text by then. The exception is a line that
/// *begins* with a fresh workflow-start token, which can only be an attempt
/// at a second pipeline and is set aside for a `MultipleWorkflows`
/// diagnostic.
fn extract(script: &str) -> Extraction {
    let pattern = workflow_start_pattern();
    let mut declaration_lines: Vec<String> = Vec::new();
    let mut workflow_parts: Vec<String> = Vec::new();
    let mut extra_workflows: Vec<String> = Vec::new();

    for line in script.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if workflow_parts.is_empty() {
            match pattern.find(trimmed) {
                Some(found) => {
                    let before = &trimmed[..found.start()];
                    if !before.trim().is_empty() {
                        declaration_lines.push(before.to_string());
                    }
                    workflow_parts.push(trimmed[found.start()..].trim().to_string());
                }
                None => declaration_lines.push(line.to_string()),
            }
        } else if pattern.find(trimmed).is_some_and(|m| m.start() == 0) {
            extra_workflows.push(trimmed.to_string());
        } else {
            workflow_parts.push(trimmed.to_string());
        }
    }

    Extraction {
        declarations: declaration_lines.join(" "),
        workflow: (!workflow_parts.is_empty()).then(|| workflow_parts.join(" ")),
        extra_workflows,
    }
}

/* ===================== Lexical Shapes ===================== */

/// `i` followed by alphanumerics: an input name.
pub(crate) fn is_input_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('i') && chars.all(|c| c.is_ascii_alphanumeric())
}

/// A single uppercase ASCII letter: a model name.
pub(crate) fn is_model_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.next().is_none()
}

/// `p` followed by alphanumerics: a prompt name.
pub(crate) fn is_prompt_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('p') && chars.all(|c| c.is_ascii_alphanumeric())
}

fn workflow_start_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"i[a-zA-Z0-9]*\s*(?:\[|->)").expect("workflow-start pattern compiles")
    })
}
