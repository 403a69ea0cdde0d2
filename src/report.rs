//! Parse reporting for the `check` command.
//!
//! The report shows what the parser understood rather than what the author
//! wrote: reconstructed assignments, the workflow after loop expansion, the
//! three namespaces, the AST, and the error list.

use serde::Serialize;

use crate::ast::{Namespaces, ParsedScript, WorkflowAst};

/// A render-ready view over one parse result.
pub struct ParseReport<'a> {
    script: &'a ParsedScript,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    assignments: &'a [String],
    expanded_workflow: &'a str,
    namespaces: &'a Namespaces,
    workflow: Option<&'a WorkflowAst>,
    errors: Vec<String>,
}

impl<'a> ParseReport<'a> {
    pub fn new(script: &'a ParsedScript) -> Self {
        Self { script }
    }

    /// Human-readable report in four numbered sections.
    pub fn render_text(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        out.push_str("================ FLOWSCRIPT PARSE REPORT ================\n");

        out.push_str("1. Formatted Code (as understood by the parser):\n");
        out.push_str("------------------------------------------------\n");
        for line in &self.script.formatted_assignments {
            out.push_str(line);
            out.push('\n');
        }
        if !self.script.expanded_workflow.is_empty() {
            out.push_str(&self.script.expanded_workflow);
            out.push('\n');
        }

        out.push_str("\n2. Parsed Variables:\n");
        out.push_str("--------------------\n");
        out.push_str(&serde_json::to_string_pretty(&self.script.namespaces)?);
        out.push('\n');

        out.push_str("\n3. Parsed Workflow (AST):\n");
        out.push_str("-------------------------\n");
        match &self.script.workflow {
            Some(workflow) => {
                out.push_str(&serde_json::to_string_pretty(workflow)?);
                out.push('\n');
            }
            None => out.push_str("No valid workflow was parsed.\n"),
        }

        out.push_str("\n4. Parser Errors:\n");
        out.push_str("-----------------\n");
        if self.script.errors.is_empty() {
            out.push_str("No errors detected. Parsing successful.\n");
        } else {
            for error in &self.script.errors {
                out.push_str(&format!("- {error}\n"));
            }
        }

        out.push_str("================== END OF REPORT ==================\n");
        Ok(out)
    }

    /// The same content as a single JSON document.
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            assignments: &self.script.formatted_assignments,
            expanded_workflow: &self.script.expanded_workflow,
            namespaces: &self.script.namespaces,
            workflow: self.script.workflow.as_ref(),
            errors: self.script.errors.iter().map(|e| e.to_string()).collect(),
        })
    }
}
