//! PostgreSQL adapter for `rowscan`.
//!
//! Runs a query through `tokio-postgres`, exposes the fetched rows as a
//! [`rowscan::RowSource`] and scans them into caller-provided destinations.

pub mod error;
pub mod postgres;

pub use error::{AdapterError, PgRowsError};
pub use postgres::{
    connect::connect,
    query::{PgScan, get, select},
    rows::PgRows,
};
