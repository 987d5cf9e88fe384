use rowscan::ScanError;
use thiserror::Error;

/// Errors raised by the query helpers and the connection setup.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The URL could not be parsed as a Postgres connection string.
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    /// Building the TLS connector failed.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Any error reported by the driver while preparing or running a query.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The fetched rows could not be scanned into the destination.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

impl AdapterError {
    /// True when a single-row query returned no rows.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::Scan(err) if err.is_not_found())
    }
}

/// Errors raised by [`crate::PgRows`] while walking a fetched result set.
#[derive(Debug, Error)]
pub enum PgRowsError {
    #[error("no current row; call advance first")]
    NoCurrentRow,

    #[error("expected {expected} slots, got {got}")]
    SlotCount { expected: usize, got: usize },

    /// The column's Postgres type has no `Value` representation.
    #[error("column '{column}' has unsupported type {ty}")]
    UnsupportedType { column: String, ty: String },

    /// The driver could not decode the cell into the expected Rust type.
    #[error("failed to decode column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("rows are closed")]
    Closed,
}
