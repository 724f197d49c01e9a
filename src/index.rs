//! Directory walk that parses every `.sqlx` file and groups the records.

use crate::model::FunctionIndex;
use crate::parser::{self, sqlx};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Section used when no directory name is available.
pub const DEFAULT_SECTION: &str = "functions";

/// How records are assigned to sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    /// Name of the directory above the file's directory:
    /// `kll/sqlx/kll_sketch_float_build.sqlx` → `kll`
    ParentDir,
    /// Every record goes under one explicit label.
    Fixed(String),
}

/// Walk `root` recursively and index every source file.
///
/// Entries are visited in file-name order so generated output is stable.
/// Any walk error or unreadable file aborts the run.
pub fn build_index(root: &Path, grouping: &Grouping) -> Result<FunctionIndex> {
    let mut index = FunctionIndex::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !parser::is_source_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        info!(file = %path.display(), "Processing file");

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let file_name = entry.file_name().to_string_lossy();
        let mut record = sqlx::parse(&content, &file_name);

        let relative = path.strip_prefix(root).unwrap_or(path);
        record.source_path = to_slash_path(relative);

        let section = section_key(root, relative, grouping);
        debug!(section = %section, record = ?record, "Parsed function");
        index.entry(section).or_default().push(record);
    }

    info!(
        sections = index.len(),
        functions = index.values().map(Vec::len).sum::<usize>(),
        "Indexing complete"
    );
    Ok(index)
}

/// Section key for a file at `relative` (relative to `root`), lower-cased.
fn section_key(root: &Path, relative: &Path, grouping: &Grouping) -> String {
    let key = match grouping {
        Grouping::Fixed(label) => Some(label.clone()),
        Grouping::ParentDir => {
            let dirs = relative.parent().map(normal_components).unwrap_or_default();
            match dirs.len() {
                0 => root_name(root),
                1 => Some(dirs[0].clone()),
                n => Some(dirs[n - 2].clone()),
            }
        }
    };
    key.unwrap_or_else(|| DEFAULT_SECTION.to_string())
        .to_lowercase()
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn root_name(root: &Path) -> Option<String> {
    fs::canonicalize(root)
        .ok()?
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
}

/// Markdown links always use forward slashes.
fn to_slash_path(path: &Path) -> String {
    normal_components(path).join("/")
}
