//! Renderer module — trait-based dispatch over template strategies.

pub mod append;
pub mod sections;

use crate::examples::ExampleOptions;
use crate::model::FunctionIndex;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Table separator the template carries under its placeholder line.
pub const TABLE_SEPARATOR: &str = "|---|---|---|---|";

/// Inputs shared by all rendering strategies.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Root the function files were indexed from
    pub input_root: PathBuf,
    /// Examples directory for `append` mode; `<input_root>/test` when unset
    pub examples_dir: Option<PathBuf>,
    pub example_options: ExampleOptions,
}

/// Strategy for merging indexed functions into a template.
pub trait Renderer {
    fn render(&self, template: &str, index: &FunctionIndex, ctx: &RenderContext) -> Result<String>;
}

/// Create a renderer for the given mode name.
pub fn create_renderer(mode: &str) -> Result<Box<dyn Renderer>> {
    match mode {
        "sections" => Ok(Box::new(sections::SectionsRenderer)),
        "append" => Ok(Box::new(append::AppendRenderer)),
        _ => Err(anyhow!("unknown mode: {}. Use sections or append", mode)),
    }
}

/// Render and apply the final cleanup pass.
pub fn render_readme(
    renderer: &dyn Renderer,
    template: &str,
    index: &FunctionIndex,
    ctx: &RenderContext,
) -> Result<String> {
    let output = renderer.render(template, index, ctx)?;
    Ok(remove_table_artifacts(&output))
}

/// Drop a table separator left directly after a closing code fence.
pub fn remove_table_artifacts(output: &str) -> String {
    output.replace(&format!("```\n{}", TABLE_SEPARATOR), "```\n")
}
