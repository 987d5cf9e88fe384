//! Convenience entry points that drive a row source to completion.

use crate::{
    config::ScanConfig,
    destination::Destination,
    error::{Result, ScanError},
    scanner::RowScanner,
    source::{CloseOnExit, RowSource},
};
use tracing::debug;

/// Scanning entry points bound to one [`ScanConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScanApi {
    config: ScanConfig,
}

impl ScanApi {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn row_scanner<R: RowSource>(&self, rows: R) -> RowScanner<R> {
        RowScanner::with_config(rows, self.config.clone())
    }

    /// Scans every remaining row, appending one element per row to `dst`.
    ///
    /// Stops at the end of the result set or at the first error. The row
    /// source is closed on every exit path.
    pub fn scan_all<D, R>(&self, dst: &mut Vec<D>, rows: R) -> Result<()>
    where
        D: Destination + Default,
        R: RowSource,
    {
        let mut rows = CloseOnExit::new(rows);
        self.scan_all_rows(dst, rows.get_mut())?;
        rows.close()
    }

    /// Scans exactly one row into `dst`.
    ///
    /// Fails with [`ScanError::NotFound`] on an empty result set and with
    /// [`ScanError::TooManyRows`] when a second row follows. The row source is
    /// closed on every exit path.
    pub fn scan_one<D, R>(&self, dst: &mut D, rows: R) -> Result<()>
    where
        D: Destination,
        R: RowSource,
    {
        let mut rows = CloseOnExit::new(rows);
        self.scan_one_row(dst, rows.get_mut())?;
        rows.close()
    }

    /// Scans the row `rows` currently points at, without advancing or
    /// closing it.
    pub fn scan_row<D, R>(&self, dst: &mut D, rows: R) -> Result<()>
    where
        D: Destination,
        R: RowSource,
    {
        self.row_scanner(rows).scan(dst)
    }

    fn scan_all_rows<D, R>(&self, dst: &mut Vec<D>, rows: &mut R) -> Result<()>
    where
        D: Destination + Default,
        R: RowSource,
    {
        let mut scanner = self.row_scanner(rows);
        while scanner.advance()? {
            let mut elem = D::default();
            scanner.scan(&mut elem)?;
            dst.push(elem);
        }
        debug!(rows = scanner.row(), "Scanned all rows");
        Ok(())
    }

    fn scan_one_row<D, R>(&self, dst: &mut D, rows: &mut R) -> Result<()>
    where
        D: Destination,
        R: RowSource,
    {
        let mut scanner = self.row_scanner(rows);
        if !scanner.advance()? {
            return Err(ScanError::NotFound);
        }
        scanner.scan(dst)?;
        if scanner.advance()? {
            return Err(ScanError::TooManyRows);
        }
        Ok(())
    }
}

/// [`ScanApi::scan_all`] with the default configuration.
pub fn scan_all<D, R>(dst: &mut Vec<D>, rows: R) -> Result<()>
where
    D: Destination + Default,
    R: RowSource,
{
    ScanApi::default().scan_all(dst, rows)
}

/// [`ScanApi::scan_one`] with the default configuration.
pub fn scan_one<D, R>(dst: &mut D, rows: R) -> Result<()>
where
    D: Destination,
    R: RowSource,
{
    ScanApi::default().scan_one(dst, rows)
}

/// [`ScanApi::scan_row`] with the default configuration.
pub fn scan_row<D, R>(dst: &mut D, rows: R) -> Result<()>
where
    D: Destination,
    R: RowSource,
{
    ScanApi::default().scan_row(dst, rows)
}
