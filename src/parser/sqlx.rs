//! `.sqlx` function definition parser.
//!
//! Pattern-matches the narrow file convention used by the function library:
//!
//! ```text
//! CREATE OR REPLACE [AGGREGATE ]FUNCTION ${self()}(<params>)
//! RETURNS <type>
//! OPTIONS (description = '''<text>''')
//! ```
//!
//! Nothing here fails: a header or description that cannot be found is
//! logged and replaced with a placeholder.

use crate::escape::escape_markdown;
use crate::model::*;
use crate::parser::function_name;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const UNKNOWN_RETURN_TYPE: &str = "UNKNOWN";
pub const NO_DESCRIPTION: &str = "No description available";

/// Literal that marks an aggregate definition anywhere in the file.
const AGGREGATE_MARKER: &str = "AGGREGATE FUNCTION";

// Parameter list is the shortest text up to `) RETURNS`
static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)CREATE OR REPLACE (?:AGGREGATE )?FUNCTION\s+\$\{self\(\)\}\((.*?)\)\s+RETURNS\s+")
        .unwrap()
});

// Keywords that end the return type clause
static RE_RETURNS_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:LANGUAGE|OPTIONS)\b").unwrap());

static RE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)description\s*=\s*['"]{3}(.*?)['"]{3}"#).unwrap()
});

// Boilerplate link block, from its first line to end of text
static RE_MORE_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)(?:\r?\n)*^For more info.*").unwrap());

/// Parse one source file into a record. `source_path` is left empty.
pub fn parse(content: &str, file_name: &str) -> FunctionRecord {
    debug!(file = file_name, "Parsing file");

    let (raw_params, return_type) = match extract_header(content) {
        Some((params, ret)) => {
            debug!(signature = params, return_type = ret, "Matched function header");
            (params, ret.to_string())
        }
        None => {
            warn!(file = file_name, "No function signature or return type found");
            ("", UNKNOWN_RETURN_TYPE.to_string())
        }
    };

    let description = match RE_DESCRIPTION.captures(content) {
        Some(caps) => format_description(caps[1].trim()),
        None => {
            debug!(file = file_name, "No description attribute found");
            NO_DESCRIPTION.to_string()
        }
    };

    let parameters = split_parameters(raw_params)
        .into_iter()
        .filter_map(|fragment| match parse_parameter(fragment) {
            Some(p) => Some(p),
            None => {
                warn!(file = file_name, fragment, "Unexpected argument format");
                None
            }
        })
        .collect();

    FunctionRecord {
        name: function_name(file_name).to_string(),
        parameters,
        return_type,
        kind: detect_kind(content),
        description,
        source_path: String::new(),
    }
}

/// Find the raw parameter list and trimmed return type.
fn extract_header(content: &str) -> Option<(&str, &str)> {
    let caps = RE_HEADER.captures(content)?;
    let params = caps.get(1)?.as_str().trim();
    let rest = &content[caps.get(0)?.end()..];

    let end = RE_RETURNS_END
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    let return_type = rest[..end].trim();

    if return_type.is_empty() || return_type.contains(';') {
        return None;
    }
    Some((params, return_type))
}

pub fn detect_kind(content: &str) -> FunctionKind {
    if content.contains(AGGREGATE_MARKER) {
        FunctionKind::Aggregate
    } else {
        FunctionKind::Scalar
    }
}

/// Strip the "For more info" block, escape, then flatten line breaks to `<br>`.
pub fn format_description(raw: &str) -> String {
    let stripped = RE_MORE_INFO.replace(raw, "");
    let escaped = escape_markdown(&stripped);
    escaped.replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Split on commas that are not nested inside `<...>`.
///
/// Blank fragments (e.g. from an empty list) are dropped.
pub fn split_parameters(list: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                fragments.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    fragments.push(list[start..].trim());
    fragments.retain(|f| !f.is_empty());
    fragments
}

/// `name TYPE [MORE TYPE TOKENS]` → Parameter; `None` for a lone token.
fn parse_parameter(fragment: &str) -> Option<Parameter> {
    let mut tokens = fragment.split_whitespace();
    let name = tokens.next()?;
    let ty = tokens.collect::<Vec<_>>().join(" ");
    if ty.is_empty() {
        return None;
    }
    Some(Parameter::new(name, ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGGREGATE_SOURCE: &str = r#"config { hasOutput: true }
/*
 * Licensed to the Apache Software Foundation (ASF)
 */

CREATE OR REPLACE AGGREGATE FUNCTION ${self()}(value FLOAT64, params STRUCT<k INT, seed INT64> NOT AGGREGATE)
RETURNS BYTES
OPTIONS (
  description = '''Creates a sketch that represents the distribution of the given column.

Param value: the column of FLOAT64 values.
Param k: the sketch accuracy parameter.
Returns: a KLL Sketch, as bytes.
For more information:
 - https://datasketches.apache.org/docs/KLL/KLLSketch.html'''
)
AS (
  $BQ_DATASET.kll_sketch_float_from_aggregate(value, params)
);
"#;

    const SCALAR_SOURCE: &str = r#"config { hasOutput: true }

CREATE OR REPLACE FUNCTION ${self()}(sketch BYTES, normalized_rank FLOAT64, inclusive BOOL)
RETURNS FLOAT64
LANGUAGE js
OPTIONS (
  library=["${dataform.projectConfig.vars.jsBucket}/kll_sketch.mjs"],
  description = """Returns an approximation to the data value associated with the given rank.
Param sketch: the given sketch as bytes."""
)
AS R"""
  return Module.getQuantile(sketch, normalized_rank, inclusive);
""";
"#;

    #[test]
    fn parse_aggregate_file() {
        let r = parse(AGGREGATE_SOURCE, "kll_sketch_float_build.sqlx");
        assert_eq!(r.name, "kll_sketch_float_build");
        assert_eq!(r.kind, FunctionKind::Aggregate);
        assert_eq!(r.return_type, "BYTES");
        assert_eq!(
            r.parameters,
            vec![
                Parameter::new("value", "FLOAT64"),
                Parameter::new("params", "STRUCT<k INT, seed INT64> NOT AGGREGATE"),
            ]
        );
        assert!(r.description.starts_with("Creates a sketch"));
        assert!(r.description.contains("<br><br>Param value:"));
        assert!(!r.description.contains("For more information"));
        assert!(!r.description.contains("datasketches.apache.org"));
        assert!(r.source_path.is_empty());
    }

    #[test]
    fn parse_scalar_file() {
        let r = parse(SCALAR_SOURCE, "kll_sketch_float_get_quantile.sqlx");
        assert_eq!(r.kind, FunctionKind::Scalar);
        assert_eq!(r.return_type, "FLOAT64");
        assert_eq!(r.parameters.len(), 3);
        assert_eq!(r.parameters[2], Parameter::new("inclusive", "BOOL"));
        assert_eq!(
            r.description,
            "Returns an approximation to the data value associated with the given rank.<br>Param sketch: the given sketch as bytes."
        );
    }

    #[test]
    fn angle_bracket_aware_split() {
        let src = "CREATE OR REPLACE FUNCTION ${self()}(x INT64, y ARRAY<STRUCT<a INT64>>) RETURNS INT64";
        let r = parse(src, "f.sqlx");
        assert_eq!(
            r.parameters,
            vec![
                Parameter::new("x", "INT64"),
                Parameter::new("y", "ARRAY<STRUCT<a INT64>>"),
            ]
        );
        assert_eq!(r.return_type, "INT64");
    }

    #[test]
    fn split_keeps_nested_commas() {
        assert_eq!(
            split_parameters("a STRUCT<b INT64, c ARRAY<STRUCT<d STRING, e BOOL>>>, f BYTES"),
            vec!["a STRUCT<b INT64, c ARRAY<STRUCT<d STRING, e BOOL>>>", "f BYTES"]
        );
    }

    #[test]
    fn split_empty_list() {
        assert!(split_parameters("").is_empty());
        assert!(split_parameters("   ").is_empty());
    }

    #[test]
    fn malformed_fragment_dropped() {
        let src = "CREATE OR REPLACE FUNCTION ${self()}(sketch BYTES, oops) RETURNS STRING OPTIONS ()";
        let r = parse(src, "f.sqlx");
        assert_eq!(r.parameters, vec![Parameter::new("sketch", "BYTES")]);
        assert_eq!(r.return_type, "STRING");
    }

    #[test]
    fn missing_header_falls_back() {
        let r = parse("SELECT 1;", "broken.sqlx");
        assert_eq!(r.name, "broken");
        assert!(r.parameters.is_empty());
        assert_eq!(r.return_type, UNKNOWN_RETURN_TYPE);
        assert_eq!(r.description, NO_DESCRIPTION);
        assert_eq!(r.kind, FunctionKind::Scalar);
    }

    #[test]
    fn return_type_with_semicolon_is_a_miss() {
        let r = parse("CREATE OR REPLACE FUNCTION ${self()}(x INT64) RETURNS INT64; SELECT 1", "f.sqlx");
        assert_eq!(r.return_type, UNKNOWN_RETURN_TYPE);
        assert!(r.parameters.is_empty());
    }

    #[test]
    fn multiline_return_type() {
        let src = "CREATE OR REPLACE FUNCTION ${self()}(sketch BYTES)\nRETURNS STRUCT<estimate FLOAT64,\n  lower_bound FLOAT64>\nOPTIONS (description = '''x''')";
        let r = parse(src, "f.sqlx");
        assert_eq!(r.return_type, "STRUCT<estimate FLOAT64,\n  lower_bound FLOAT64>");
        assert_eq!(r.description, "x");
    }

    #[test]
    fn aggregate_marker_anywhere() {
        assert_eq!(detect_kind("-- AGGREGATE FUNCTION"), FunctionKind::Aggregate);
        assert_eq!(detect_kind("CREATE OR REPLACE FUNCTION"), FunctionKind::Scalar);
        assert_eq!(detect_kind("aggregate function"), FunctionKind::Scalar);
    }

    #[test]
    fn more_info_block_removed() {
        assert_eq!(
            format_description("Merges sketches.\nFor more info see below\n - link one\n - link two"),
            "Merges sketches."
        );
    }

    #[test]
    fn more_info_block_removed_with_crlf() {
        let r = parse(
            "CREATE OR REPLACE FUNCTION ${self()}(x INT64) RETURNS INT64\r\nOPTIONS (description = '''Desc.\r\nFor more info:\r\n - link''')",
            "f.sqlx",
        );
        assert_eq!(r.return_type, "INT64");
        assert_eq!(r.description, "Desc.");
        assert_eq!(
            format_description("Line one\r\nLine two\r\n\r\nFor more info:\r\n - link"),
            "Line one<br>Line two"
        );
    }

    #[test]
    fn indented_more_info_kept() {
        assert_eq!(
            format_description("Usage:\n  For more info pass verbose"),
            "Usage:<br>  For more info pass verbose"
        );
    }

    #[test]
    fn more_info_mid_line_kept() {
        assert_eq!(
            format_description("Ask For more info here"),
            "Ask For more info here"
        );
    }

    #[test]
    fn description_escaped_before_breaks() {
        assert_eq!(
            format_description("Param lg_k: [4, 26]\nDefaults: 12"),
            r"Param lg\_k: \[4, 26\]<br>Defaults: 12"
        );
    }

    #[test]
    fn crlf_breaks() {
        assert_eq!(format_description("a\r\nb"), "a<br>b");
    }
}
