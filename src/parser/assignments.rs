//! Declaration-region parsing.
//!
//! Declarations are free-form text: `NAME = value` pairs separated by
//! whitespace or commas, with no quoting. The only reliable anchor is the
//! variable-start token (`name =`), so parsing scans for those tokens and
//! treats everything between one token and the next as the value of the
//! first.

use regex::Regex;
use std::sync::OnceLock;

use crate::ast::Namespaces;
use crate::diagnostics::{excerpt, SyntaxError};

use super::{is_input_name, is_model_name, is_prompt_name};

/// Parse the declaration blob into the three namespaces.
///
/// Returns the namespaces together with the reconstructed `name = value`
/// lines. Later assignments of the same name overwrite earlier ones. Bad
/// statements record a diagnostic and are skipped without aborting the rest.
pub(super) fn parse_assignments(
    text: &str,
    errors: &mut Vec<SyntaxError>,
) -> (Namespaces, Vec<String>) {
    let mut namespaces = Namespaces::default();
    let mut formatted = Vec::new();

    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return (namespaces, formatted);
    }

    // (match start, value start, name) for every variable-start token.
    let starts: Vec<(usize, usize, &str)> = variable_start_pattern()
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.start(), whole.end(), name.as_str()))
        })
        .collect();

    if starts.is_empty() {
        errors.push(SyntaxError::UnrecognizedAssignments {
            content: excerpt(&normalized),
        });
        return (namespaces, formatted);
    }

    for (idx, &(start, value_start, name)) in starts.iter().enumerate() {
        let value_end = starts
            .get(idx + 1)
            .map_or(normalized.len(), |&(next_start, _, _)| next_start);
        let mut value = normalized[value_start..value_end].trim();
        // A comma may separate this statement from the next.
        if let Some(stripped) = value.strip_suffix(',') {
            value = stripped.trim_end();
        }
        let statement = normalized[start..value_end].trim();

        if value.is_empty() {
            errors.push(SyntaxError::EmptyAssignment {
                statement: excerpt(statement),
            });
            continue;
        }

        formatted.push(format!("{name} = {value}"));

        if is_model_name(name) {
            namespaces.models.insert(name.to_string(), value.to_string());
        } else if is_input_name(name) {
            namespaces.inputs.insert(name.to_string(), value.to_string());
        } else if is_prompt_name(name) {
            namespaces.prompts.insert(name.to_string(), value.to_string());
        } else {
            errors.push(SyntaxError::InvalidVariableName {
                name: name.to_string(),
                statement: excerpt(statement),
            });
        }
    }

    (namespaces, formatted)
}

fn normalize_whitespace(text: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let whitespace = PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));
    whitespace.replace_all(text, " ").trim().to_string()
}

/// A declaration name followed by `=`. The name arm is wider than the three
/// legal shapes so that near-miss names (`X1 = …`) are seen, bound to their
/// value, and rejected with a targeted diagnostic instead of dissolving into
/// the neighboring value text.
fn variable_start_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([A-Z][a-zA-Z0-9]*|i[a-zA-Z0-9]*|p[a-zA-Z0-9]*)\s*=")
            .expect("variable-start pattern compiles")
    })
}
