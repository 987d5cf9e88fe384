//! Query helpers: run a statement and scan its rows.

use crate::{error::AdapterError, postgres::rows::PgRows};
use rowscan::{Destination, ScanApi, ScanConfig};
use tokio_postgres::{GenericClient, types::ToSql};
use tracing::debug;

/// Query helpers bound to one scan configuration.
#[derive(Debug, Clone, Default)]
pub struct PgScan {
    api: ScanApi,
}

impl PgScan {
    pub fn new(config: ScanConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            api: ScanApi::new(config)?,
        })
    }

    /// Runs `sql` and appends one element to `dst` per returned row.
    pub async fn select<C, D>(
        &self,
        client: &C,
        dst: &mut Vec<D>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<(), AdapterError>
    where
        C: GenericClient,
        D: Destination + Default,
    {
        let rows = self.fetch(client, sql, params).await?;
        self.api.scan_all(dst, rows)?;
        Ok(())
    }

    /// Runs `sql` and scans its only row into `dst`.
    ///
    /// An empty result fails with an error for which
    /// [`AdapterError::is_not_found`] is true.
    pub async fn get<C, D>(
        &self,
        client: &C,
        dst: &mut D,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<(), AdapterError>
    where
        C: GenericClient,
        D: Destination,
    {
        let rows = self.fetch(client, sql, params).await?;
        self.api.scan_one(dst, rows)?;
        Ok(())
    }

    async fn fetch<C: GenericClient>(
        &self,
        client: &C,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<PgRows, AdapterError> {
        let statement = client.prepare(sql).await?;
        let rows = client.query(&statement, params).await?;
        debug!(rows = rows.len(), columns = statement.columns().len(), "Fetched rows");
        Ok(PgRows::new(&statement, rows))
    }
}

/// [`PgScan::select`] with the default configuration.
pub async fn select<C, D>(
    client: &C,
    dst: &mut Vec<D>,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<(), AdapterError>
where
    C: GenericClient,
    D: Destination + Default,
{
    PgScan::default().select(client, dst, sql, params).await
}

/// [`PgScan::get`] with the default configuration.
pub async fn get<C, D>(
    client: &C,
    dst: &mut D,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<(), AdapterError>
where
    C: GenericClient,
    D: Destination,
{
    PgScan::default().get(client, dst, sql, params).await
}
