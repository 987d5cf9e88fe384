//! The row-source boundary: what the engine needs from a driver.

use crate::error::{Result, ScanError, SourceOperation};
use model::Value;
use thiserror::Error;
use tracing::warn;

/// An iterator over a query result, owned by a single scan at a time.
///
/// `populate` fills one slot per column, in `columns()` order, from the row
/// the cursor currently points at. The engine never calls a row source
/// concurrently.
pub trait RowSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn columns(&self) -> std::result::Result<Vec<String>, Self::Error>;

    /// Moves to the next row. `Ok(false)` means the result set is exhausted.
    fn advance(&mut self) -> std::result::Result<bool, Self::Error>;

    fn populate(&mut self, slots: &mut [Value]) -> std::result::Result<(), Self::Error>;

    fn close(&mut self) -> std::result::Result<(), Self::Error>;
}

impl<R: RowSource + ?Sized> RowSource for &mut R {
    type Error = R::Error;

    fn columns(&self) -> std::result::Result<Vec<String>, Self::Error> {
        (**self).columns()
    }

    fn advance(&mut self) -> std::result::Result<bool, Self::Error> {
        (**self).advance()
    }

    fn populate(&mut self, slots: &mut [Value]) -> std::result::Result<(), Self::Error> {
        (**self).populate(slots)
    }

    fn close(&mut self) -> std::result::Result<(), Self::Error> {
        (**self).close()
    }
}

/// Closes the wrapped row source exactly once.
///
/// `close` surfaces the close error; dropping the guard without calling it
/// (early return, panic) still closes and logs a failure.
pub(crate) struct CloseOnExit<R: RowSource> {
    rows: R,
    closed: bool,
}

impl<R: RowSource> CloseOnExit<R> {
    pub(crate) fn new(rows: R) -> Self {
        Self {
            rows,
            closed: false,
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.rows
    }

    pub(crate) fn close(mut self) -> Result<()> {
        self.closed = true;
        self.rows
            .close()
            .map_err(|err| ScanError::row_source(SourceOperation::Close, err))
    }
}

impl<R: RowSource> Drop for CloseOnExit<R> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.rows.close() {
            warn!(error = %err, "Failed to close row source after an aborted scan");
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryRowsError {
    #[error("no current row; call advance first")]
    NoCurrentRow,

    #[error("expected {expected} slots, got {got}")]
    SlotCount { expected: usize, got: usize },

    #[error("row source is closed")]
    Closed,
}

/// A row source over rows held in memory.
///
/// Useful for adapters that fetch a whole result set up front, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
    cursor: Option<usize>,
    closed: bool,
}

impl MemoryRows {
    pub fn new<C, S>(columns: C, data: Vec<Vec<Value>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data,
            cursor: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn current(&self) -> Option<&Vec<Value>> {
        self.cursor.and_then(|i| self.data.get(i))
    }
}

impl RowSource for MemoryRows {
    type Error = MemoryRowsError;

    fn columns(&self) -> std::result::Result<Vec<String>, Self::Error> {
        if self.closed {
            return Err(MemoryRowsError::Closed);
        }
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> std::result::Result<bool, Self::Error> {
        if self.closed {
            return Err(MemoryRowsError::Closed);
        }
        let next = self.cursor.map_or(0, |i| (i + 1).min(self.data.len()));
        self.cursor = Some(next);
        Ok(next < self.data.len())
    }

    fn populate(&mut self, slots: &mut [Value]) -> std::result::Result<(), Self::Error> {
        if self.closed {
            return Err(MemoryRowsError::Closed);
        }
        let row = self.current().ok_or(MemoryRowsError::NoCurrentRow)?;
        if row.len() != slots.len() {
            return Err(MemoryRowsError::SlotCount {
                expected: row.len(),
                got: slots.len(),
            });
        }
        for (slot, cell) in slots.iter_mut().zip(row) {
            *slot = cell.clone();
        }
        Ok(())
    }

    fn close(&mut self) -> std::result::Result<(), Self::Error> {
        self.closed = true;
        Ok(())
    }
}
