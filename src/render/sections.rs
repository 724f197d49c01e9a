//! Section-scanning renderer.
//!
//! Walks the template line by line. A `## <Name> ...` heading selects the
//! section `<name>`; a `| Function Name` placeholder line under it is replaced
//! with that section's function table followed by its examples.

use crate::examples::{collect_examples, render_examples};
use crate::model::*;
use crate::render::{RenderContext, Renderer, TABLE_SEPARATOR};
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub struct SectionsRenderer;

const SECTION_PREFIX: &str = "## ";
const TABLE_PLACEHOLDER: &str = "| Function Name";
const TABLE_HEADER: &str = "| Function Name | Function Type | Signature | Description |";

impl Renderer for SectionsRenderer {
    fn render(&self, template: &str, index: &FunctionIndex, ctx: &RenderContext) -> Result<String> {
        let mut output = String::new();
        let mut current_section: Option<String> = None;
        let mut rendered: BTreeSet<&str> = BTreeSet::new();
        // Set right after a table without examples, so the template's own
        // separator line does not become a stray row.
        let mut skip_separator = false;

        for line in template.split_inclusive('\n') {
            if std::mem::take(&mut skip_separator) && line.trim_end() == TABLE_SEPARATOR {
                continue;
            }

            if line.starts_with(SECTION_PREFIX) {
                current_section = line.split_whitespace().nth(1).map(str::to_lowercase);
                output.push_str(line);
            } else if line.starts_with(TABLE_PLACEHOLDER) {
                let Some((section, records)) = current_section
                    .as_deref()
                    .and_then(|s| index.get_key_value(s))
                else {
                    debug!(section = ?current_section, "No functions for section");
                    continue;
                };
                rendered.insert(section.as_str());

                info!(section = %section, functions = records.len(), "Rendering table");
                output.push_str(&render_table(records));

                let dir = ctx.input_root.join(section).join("test");
                let examples = collect_examples(&dir, &ctx.example_options)?;
                output.push_str(&render_examples(&examples));
                skip_separator = examples.is_empty();
            } else {
                output.push_str(line);
            }
        }

        for (section, records) in index {
            if !rendered.contains(section.as_str()) {
                warn!(
                    section = %section,
                    functions = records.len(),
                    "Section has no table placeholder in template; functions omitted"
                );
            }
        }

        Ok(output)
    }
}

/// Markdown table for one section, sorted aggregates-first then by arity.
fn render_table(records: &[FunctionRecord]) -> String {
    let mut sorted = records.to_vec();
    sort_records(&mut sorted);

    let mut table = format!("{}\n{}\n", TABLE_HEADER, TABLE_SEPARATOR);
    for record in &sorted {
        table.push_str(&format!(
            "| [{}]({}) | {} | {} | {} |\n",
            record.name,
            record.source_path,
            record.kind,
            record.signature(),
            record.description
        ));
    }
    table
}
