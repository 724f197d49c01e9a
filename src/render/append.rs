//! Simple-append renderer: template, then every function, then examples.

use crate::examples::{collect_examples, render_examples};
use crate::model::*;
use crate::render::{RenderContext, Renderer};
use anyhow::Result;
use tracing::info;

pub struct AppendRenderer;

impl Renderer for AppendRenderer {
    fn render(&self, template: &str, index: &FunctionIndex, ctx: &RenderContext) -> Result<String> {
        let mut output = template.to_string();
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }

        let mut records: Vec<FunctionRecord> = index.values().flatten().cloned().collect();
        sort_records(&mut records);
        info!(functions = records.len(), "Appending function sections");

        let mut current_kind: Option<FunctionKind> = None;
        for record in &records {
            if current_kind != Some(record.kind) {
                output.push_str(&format!("\n## {}\n\n", kind_heading(record.kind)));
                current_kind = Some(record.kind);
            }
            output.push_str(&render_entry(record));
        }

        let dir = ctx
            .examples_dir
            .clone()
            .unwrap_or_else(|| ctx.input_root.join("test"));
        let examples = collect_examples(&dir, &ctx.example_options)?;
        output.push_str(&render_examples(&examples));

        Ok(output)
    }
}

fn kind_heading(kind: FunctionKind) -> &'static str {
    match kind {
        FunctionKind::Aggregate => "Aggregate Functions",
        FunctionKind::Scalar => "Scalar Functions",
    }
}

/// `### [name(params)](path)` followed by return type and description.
fn render_entry(record: &FunctionRecord) -> String {
    format!(
        "### [{}({})]({})\n\nReturns: `{}`\n\n{}\n\n",
        record.name,
        record.parameter_list(),
        record.source_path,
        record.return_type,
        record.description
    )
}
