//! Parser module — source file recognition and dispatch.

pub mod sqlx;

use std::path::Path;

/// Extension of SQL function definition files.
pub const SOURCE_EXTENSION: &str = "sqlx";

/// True for paths named `*.sqlx`.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

/// Function name derived from a source file name.
/// "kll_sketch_float_build.sqlx" → "kll_sketch_float_build"
pub fn function_name(file_name: &str) -> &str {
    file_name
        .strip_suffix(".sqlx")
        .unwrap_or(file_name)
}
