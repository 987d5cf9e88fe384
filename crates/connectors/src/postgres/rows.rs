use crate::{error::PgRowsError, postgres::decode::decode_cell};
use model::Value;
use rowscan::RowSource;
use tokio_postgres::{Row, Statement};

/// A fetched Postgres result set exposed as a [`RowSource`].
///
/// Column names come from the statement, so an empty result set still
/// reports its columns.
#[derive(Debug)]
pub struct PgRows {
    columns: Vec<String>,
    rows: Vec<Row>,
    cursor: Option<usize>,
    closed: bool,
}

impl PgRows {
    pub fn new(statement: &Statement, rows: Vec<Row>) -> Self {
        let columns = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();
        Self::from_parts(columns, rows)
    }

    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            cursor: None,
            closed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RowSource for PgRows {
    type Error = PgRowsError;

    fn columns(&self) -> Result<Vec<String>, Self::Error> {
        if self.closed {
            return Err(PgRowsError::Closed);
        }
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, Self::Error> {
        if self.closed {
            return Err(PgRowsError::Closed);
        }
        let next = self.cursor.map_or(0, |i| (i + 1).min(self.rows.len()));
        self.cursor = Some(next);
        Ok(next < self.rows.len())
    }

    fn populate(&mut self, slots: &mut [Value]) -> Result<(), Self::Error> {
        if self.closed {
            return Err(PgRowsError::Closed);
        }
        let row = self
            .cursor
            .and_then(|i| self.rows.get(i))
            .ok_or(PgRowsError::NoCurrentRow)?;
        if row.len() != slots.len() {
            return Err(PgRowsError::SlotCount {
                expected: row.len(),
                got: slots.len(),
            });
        }
        for (index, slot) in slots.iter_mut().enumerate() {
            *slot = decode_cell(row, index)?;
        }
        Ok(())
    }

    // Rows are fully fetched, so closing only releases them.
    fn close(&mut self) -> Result<(), Self::Error> {
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}
