//! Bounded repetition.
//!
//! `[-> A_p1 -> B_p2]*3` is sugar: the bracketed run of arrows is repeated
//! three times as plain text before the workflow is split into stages. The
//! stage parser never sees a loop.

use regex::Regex;
use std::sync::OnceLock;

use crate::diagnostics::{excerpt, SyntaxError};

/// Expand every `[-> …]*N` group in the workflow text.
///
/// Single non-overlapping pass, no re-scan of substituted text, so loops do
/// not nest. The bracket interior keeps its leading `->`, which splices it
/// into the surrounding arrow chain without a separator. `N` is matched with
/// an optional sign; zero and negative counts record a diagnostic and expand
/// to nothing.
pub(super) fn expand(workflow: &str, errors: &mut Vec<SyntaxError>) -> String {
    let expanded = loop_pattern().replace_all(workflow, |caps: &regex::Captures<'_>| {
        let body = &caps[1];
        let interior = &body[1..body.len() - 1];
        match caps[2].parse::<i64>() {
            Ok(count) if count > 0 => interior.repeat(count as usize),
            _ => {
                errors.push(SyntaxError::NonPositiveLoopCount {
                    statement: excerpt(&caps[0]),
                });
                String::new()
            }
        }
    });
    expanded.into_owned()
}

fn loop_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\[->.*?\])\*(-?\d+)").expect("loop pattern compiles"))
}
