use crate::index::AccessPath;
use model::ConversionError;
use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, ScanError>;

/// The row-source call that failed, with the row it was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOperation {
    ReadColumns,
    Advance { row: usize },
    Populate { row: usize },
    Close,
}

impl fmt::Display for SourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOperation::ReadColumns => write!(f, "read columns"),
            SourceOperation::Advance { row } => write!(f, "advance to row {row}"),
            SourceOperation::Populate { row } => write!(f, "populate row {row}"),
            SourceOperation::Close => write!(f, "close"),
        }
    }
}

/// All errors produced while mapping rows onto destinations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The destination type cannot be scanned into.
    #[error("invalid type {ty}: {reason}")]
    InvalidDestination { ty: String, reason: String },

    /// Two struct members resolve to the same column. Detected once per shape.
    #[error(
        "column must have exactly one field pointing to it; found 2 fields `{first_member}` {first_path} \
         and `{second_member}` {second_path} pointing to '{column}' in {shape}"
    )]
    DuplicateColumnMapping {
        column: String,
        first_member: String,
        first_path: AccessPath,
        second_member: String,
        second_path: AccessPath,
        shape: String,
    },

    /// No eligible member claims the column.
    #[error("column: '{column}': no corresponding field found or it's unexported in {shape}")]
    UnmappedColumn { column: String, shape: String },

    #[error("row contains duplicated column '{0}'")]
    DuplicateColumn(String),

    #[error("to scan into a primitive type, columns number must be exactly 1, got: {0}")]
    InvalidScanRowCount(usize),

    #[error("no rows in result set")]
    NotFound,

    #[error("expected exactly one row, got more")]
    TooManyRows,

    #[error("column '{column}': {source}")]
    Conversion {
        column: String,
        #[source]
        source: ConversionError,
    },

    #[error("row source failed to {operation}: {source}")]
    RowSource {
        operation: SourceOperation,
        #[source]
        source: BoxError,
    },

    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    pub(crate) fn invalid_destination(ty: &str, reason: impl Into<String>) -> Self {
        ScanError::InvalidDestination {
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn row_source<E>(operation: SourceOperation, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScanError::RowSource {
            operation,
            source: Box::new(source),
        }
    }

    /// True when a single-row scan found no rows at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::NotFound)
    }
}
