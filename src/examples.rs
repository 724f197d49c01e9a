//! Example SQL files embedded under each function table.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name suffix of example files.
pub const EXAMPLE_SUFFIX: &str = "_test.sql";

/// Placeholder substitution applied to every example.
#[derive(Debug, Clone)]
pub struct ExampleOptions {
    pub placeholder: String,
    pub replacement: String,
}

impl Default for ExampleOptions {
    fn default() -> Self {
        Self {
            placeholder: "$BQ_DATASET".to_string(),
            replacement: "bqutil.datasketches".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub path: PathBuf,
    /// Header-stripped, placeholder-substituted SQL
    pub code: String,
}

/// Read every `*_test.sql` file directly inside `dir`, sorted by name.
///
/// A missing directory yields no examples; an unreadable file is an error.
pub fn collect_examples(dir: &Path, options: &ExampleOptions) -> Result<Vec<Example>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "No examples directory");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        EXAMPLE_SUFFIX
    );
    let mut examples = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        let path = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if !path.is_file() {
            continue;
        }
        info!(file = %path.display(), "Embedding example");
        let sql = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let code = strip_license_header(&sql).replace(&options.placeholder, &options.replacement);
        examples.push(Example { path, code });
    }
    Ok(examples)
}

/// Drop the leading block comment (lines starting `/*`, ` *` or ` */`).
pub fn strip_license_header(sql: &str) -> String {
    sql.lines()
        .skip_while(|line| line.starts_with("/*") || line.starts_with(" *"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown block listing all examples as fenced SQL; empty without examples.
pub fn render_examples(examples: &[Example]) -> String {
    if examples.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n**Examples:**\n\n");
    for example in examples {
        debug!(file = %example.path.display(), "Rendering example");
        out.push_str("```sql\n");
        out.push_str(&example.code);
        out.push_str("\n```\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LICENSED: &str = "/*\n * Licensed to the Apache Software Foundation (ASF)\n * under one or more agreements.\n */\n\nSELECT $BQ_DATASET.kll_sketch_float_build(x) FROM t;\n";

    #[test]
    fn strips_header() {
        assert_eq!(
            strip_license_header(LICENSED),
            "\nSELECT $BQ_DATASET.kll_sketch_float_build(x) FROM t;"
        );
    }

    #[test]
    fn no_header_untouched() {
        assert_eq!(strip_license_header("SELECT 1;\n/* trailing */"), "SELECT 1;\n/* trailing */");
    }

    #[test]
    fn only_comments_become_empty() {
        assert_eq!(strip_license_header("/*\n * x\n */\n"), "");
    }

    #[test]
    fn collects_matching_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b_test.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("a_test.sql"), LICENSED).unwrap();
        fs::write(dir.path().join("helper.sql"), "SELECT 0;").unwrap();
        fs::write(dir.path().join("c_test.js"), "x").unwrap();

        let examples = collect_examples(dir.path(), &ExampleOptions::default()).unwrap();
        let names: Vec<_> = examples
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_test.sql", "b_test.sql"]);
        assert_eq!(
            examples[0].code,
            "\nSELECT bqutil.datasketches.kll_sketch_float_build(x) FROM t;"
        );
    }

    #[test]
    fn custom_replacement() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x_test.sql"), "SELECT $BQ_DATASET.f();").unwrap();
        let options = ExampleOptions {
            placeholder: "$BQ_DATASET".to_string(),
            replacement: "my_project.sketches".to_string(),
        };
        let examples = collect_examples(dir.path(), &options).unwrap();
        assert_eq!(examples[0].code, "SELECT my_project.sketches.f();");
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let examples = collect_examples(&dir.path().join("test"), &ExampleOptions::default()).unwrap();
        assert!(examples.is_empty());
    }

    #[test]
    fn render_block() {
        let examples = vec![Example {
            path: PathBuf::from("a_test.sql"),
            code: "SELECT 1;".to_string(),
        }];
        assert_eq!(
            render_examples(&examples),
            "\n**Examples:**\n\n```sql\nSELECT 1;\n```\n"
        );
        assert_eq!(render_examples(&[]), "");
    }
}
