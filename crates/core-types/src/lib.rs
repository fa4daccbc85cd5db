use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Error raised when a step argument cannot be reshaped into the requested form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("expected {expected} argument, got {actual}")]
    KindMismatch { expected: ArgKind, actual: ArgKind },
    #[error("table has no header row")]
    MissingHeader,
    #[error("table row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ScenarioId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PageInstanceId(pub String);

impl PageInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PageInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of an argument slot an action declares, or of an argument a step supplies.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ArgKind {
    Scalar,
    List,
    Table,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArgKind::Scalar => "scalar",
            ArgKind::List => "list",
            ArgKind::Table => "table",
        };
        f.write_str(label)
    }
}

/// Rows of string cells attached to a step. The first row is not enforced to be a header.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Cells in row-major order. A single-column or single-row table reads as a plain list.
    pub fn as_list(&self) -> Vec<String> {
        self.rows.iter().flatten().cloned().collect()
    }

    /// Treats the first row as a header and zips every following row against it.
    /// Short rows yield empty strings for the missing cells.
    pub fn as_maps(&self) -> Result<Vec<Vec<(String, String)>>, ArgError> {
        let (header, body) = self.rows.split_first().ok_or(ArgError::MissingHeader)?;
        Ok(body
            .iter()
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(idx, key)| (key.clone(), row.get(idx).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect())
    }
}

impl From<Vec<Vec<&str>>> for DataTable {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// An already-parsed step argument.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", content = "value", rename_all = "lowercase")
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepArg {
    Scalar(String),
    List(Vec<String>),
    Table(DataTable),
}

impl StepArg {
    pub fn scalar(value: impl Into<String>) -> Self {
        StepArg::Scalar(value.into())
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            StepArg::Scalar(_) => ArgKind::Scalar,
            StepArg::List(_) => ArgKind::List,
            StepArg::Table(_) => ArgKind::Table,
        }
    }

    pub fn as_scalar(&self) -> Result<&str, ArgError> {
        match self {
            StepArg::Scalar(value) => Ok(value),
            other => Err(ArgError::KindMismatch {
                expected: ArgKind::Scalar,
                actual: other.kind(),
            }),
        }
    }

    pub fn as_list(&self) -> Result<&[String], ArgError> {
        match self {
            StepArg::List(values) => Ok(values),
            other => Err(ArgError::KindMismatch {
                expected: ArgKind::List,
                actual: other.kind(),
            }),
        }
    }

    pub fn as_table(&self) -> Result<&DataTable, ArgError> {
        match self {
            StepArg::Table(table) => Ok(table),
            other => Err(ArgError::KindMismatch {
                expected: ArgKind::Table,
                actual: other.kind(),
            }),
        }
    }
}

impl fmt::Display for StepArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepArg::Scalar(value) => write!(f, "'{}'", value),
            StepArg::List(values) => write!(f, "list[{}]", values.len()),
            StepArg::Table(table) => write!(f, "table[{}x{}]", table.height(), table.width()),
        }
    }
}

/// Kinds of a supplied argument list, in order.
pub fn arg_kinds(args: &[StepArg]) -> Vec<ArgKind> {
    args.iter().map(StepArg::kind).collect()
}

/// Renders a kind signature as `(scalar, table)`.
pub fn format_signature(kinds: &[ArgKind]) -> String {
    let parts: Vec<String> = kinds.iter().map(ArgKind::to_string).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_as_maps_uses_first_row_as_header() {
        let table = DataTable::from(vec![vec!["login", "password"], vec!["admin", "secret"]]);
        let maps = table.as_maps().unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0][0], ("login".to_string(), "admin".to_string()));
        assert_eq!(maps[0][1], ("password".to_string(), "secret".to_string()));
    }

    #[test]
    fn table_as_maps_pads_short_rows() {
        let table = DataTable::from(vec![vec!["a", "b"], vec!["1"]]);
        let maps = table.as_maps().unwrap();
        assert_eq!(maps[0][1], ("b".to_string(), String::new()));
    }

    #[test]
    fn empty_table_has_no_header() {
        assert_eq!(DataTable::default().as_maps(), Err(ArgError::MissingHeader));
    }

    #[test]
    fn flattened_table_reads_as_list() {
        let table = DataTable::from(vec![vec!["value 1"], vec!["value 2"]]);
        assert_eq!(table.as_list(), vec!["value 1", "value 2"]);
        assert_eq!(table.width(), 1);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn accessor_reports_kind_mismatch() {
        let arg = StepArg::List(vec!["x".into()]);
        assert_eq!(
            arg.as_scalar(),
            Err(ArgError::KindMismatch {
                expected: ArgKind::Scalar,
                actual: ArgKind::List
            })
        );
    }

    #[test]
    fn signature_formatting() {
        let args = vec![StepArg::scalar("a"), StepArg::Table(DataTable::default())];
        assert_eq!(format_signature(&arg_kinds(&args)), "(scalar, table)");
    }
}
