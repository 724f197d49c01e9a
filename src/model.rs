//! Data model for extracted SQL function documentation.

use std::collections::BTreeMap;
use std::fmt;

/// Function category, decided by the presence of the aggregate marker.
///
/// Variant order matters: sorting puts aggregates before scalars, which is
/// also the lexicographic order of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FunctionKind {
    Aggregate,
    Scalar,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Aggregate => "AGGREGATE",
            FunctionKind::Scalar => "SCALAR",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `name type` pair from the parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Free-form type expression, e.g. `ARRAY<STRUCT<a INT64>>`
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// One documented function, built from one `.sqlx` file.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    /// File name without the `.sqlx` extension
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// `UNKNOWN` when the header could not be matched
    pub return_type: String,
    pub kind: FunctionKind,
    /// Escaped, single-line markdown
    pub description: String,
    /// Path relative to the input root, `/`-separated (set by the indexer)
    pub source_path: String,
}

impl FunctionRecord {
    /// Comma-separated `name type` list without parentheses.
    pub fn parameter_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| format!("{} {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `(x INT64, y BYTES) -> FLOAT64`
    pub fn signature(&self) -> String {
        format!("({}) -> {}", self.parameter_list(), self.return_type)
    }
}

/// Records grouped by section key (e.g. `kll`, `theta`), in traversal order.
pub type FunctionIndex = BTreeMap<String, Vec<FunctionRecord>>;

/// Stable sort: aggregates first, then by ascending parameter count.
pub fn sort_records(records: &mut [FunctionRecord]) {
    records.sort_by_key(|r| (r.kind, r.parameters.len()));
}
