//! sqlxdoc — generate a README from a tree of `.sqlx` function definitions.
//!
//! Scans the input tree for `*.sqlx` files, extracts each function's
//! signature, return type and description, and merges them into a markdown
//! template:
//!
//! - **sections mode** (default): `## <Name>` headings in the template select
//!   a group of functions; a `| Function Name` line under a heading becomes
//!   that group's table, followed by its `test/*_test.sql` examples.
//! - **append mode**: the template is followed by aggregate and scalar
//!   function sections and an examples section.
//!
//! A run log is written to `--log-file`, replaced on every run.

mod escape;
mod examples;
mod index;
mod model;
mod parser;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(
    name = "sqlxdoc",
    about = "Generate a README from SQL function definition files"
)]
struct Cli {
    /// Root directory scanned recursively for .sqlx files
    #[arg(short = 'i', long, default_value = ".")]
    input: PathBuf,

    /// Markdown template
    #[arg(short = 't', long, default_value = "README_template.md")]
    template: PathBuf,

    /// Generated document
    #[arg(short = 'o', long, default_value = "README.md")]
    output: PathBuf,

    /// Run log, overwritten on each run
    #[arg(long, default_value = "readme_generation.log")]
    log_file: PathBuf,

    /// Most verbose level written to the run log
    #[arg(long, default_value = "debug")]
    log_level: Level,

    /// Rendering mode: sections (default) or append
    #[arg(short = 'm', long, default_value = "sections")]
    mode: String,

    /// Put every function under this section instead of grouping by directory
    #[arg(short = 'g', long)]
    group: Option<String>,

    /// Examples directory for append mode (default: <input>/test)
    #[arg(short = 'e', long)]
    examples: Option<PathBuf>,

    /// Token replaced in example SQL
    #[arg(long, default_value = "$BQ_DATASET")]
    placeholder: String,

    /// Replacement for --placeholder
    #[arg(long, default_value = "bqutil.datasketches")]
    replacement: String,
}

/// Everything one generation run needs.
struct RunConfig {
    template: PathBuf,
    output: PathBuf,
    mode: String,
    grouping: index::Grouping,
    render: render::RenderContext,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        let grouping = match cli.group {
            Some(label) => index::Grouping::Fixed(label),
            None => index::Grouping::ParentDir,
        };
        Self {
            template: cli.template,
            output: cli.output,
            mode: cli.mode,
            grouping,
            render: render::RenderContext {
                input_root: cli.input,
                examples_dir: cli.examples,
                example_options: examples::ExampleOptions {
                    placeholder: cli.placeholder,
                    replacement: cli.replacement,
                },
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("failed to create log file {}", cli.log_file.display()))?;
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(cli.log_level)
        .finish();

    let config = RunConfig::from(cli);

    // Scoped to this run; no global subscriber is installed.
    tracing::subscriber::with_default(subscriber, || {
        let result = generate(&config);
        if let Err(ref e) = result {
            let message = format!("{:#}", e);
            error!(error = %message, "README generation failed");
        }
        result
    })
}

/// scan → parse → sort → render → write
fn generate(config: &RunConfig) -> Result<()> {
    let renderer = render::create_renderer(&config.mode)?;
    let root = &config.render.input_root;

    info!(root = %root.display(), grouping = ?config.grouping, "Indexing functions");
    let function_index = index::build_index(root, &config.grouping)?;

    let template = fs::read_to_string(&config.template)
        .with_context(|| format!("failed to read template {}", config.template.display()))?;

    let content = render::render_readme(renderer.as_ref(), &template, &function_index, &config.render)?;

    fs::write(&config.output, content)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    info!(output = %config.output.display(), "README generated successfully");
    Ok(())
}
