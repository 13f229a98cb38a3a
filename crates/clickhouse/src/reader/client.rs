//! `ClickHouse` reader client for API
//! Handles read-only operations over one event store

use clickhouse::{Client, Row};
use derive_more::Debug;
use eyre::{Context, Result};
use primitives::Page;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error};
use url::Url;

use super::query::SelectQuery;
use crate::models::{CrossChainEvent, TotalRow};

/// `ClickHouse` reader client for API (read-only operations)
#[derive(Clone, Debug)]
pub struct ClickhouseReader {
    /// Base client
    #[debug(skip)]
    base: Client,
    /// Database name
    db_name: String,
}

impl ClickhouseReader {
    /// Create a new `ClickHouse` reader client
    pub fn new(url: Url, db_name: String, username: String, password: String) -> Result<Self> {
        let client = Client::default().with_url(url).with_user(username).with_password(password);

        Ok(Self { base: client, db_name })
    }

    /// Database the reader queries.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub(crate) async fn execute<R>(&self, sql: &str, binds: &[String]) -> Result<Vec<R>>
    where
        R: Row + for<'b> Deserialize<'b>,
    {
        let mut query = self.base.query(sql);
        for value in binds {
            query = query.bind(value.as_str());
        }
        let start = Instant::now();

        let result = query.fetch_all::<R>().await;

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(rows) => {
                debug!(query = %sql, duration_ms, rows = rows.len(), "ClickHouse query executed")
            }
            Err(e) => error!(query = %sql, duration_ms, error = %e, "ClickHouse query failed"),
        }
        result.map_err(Into::into)
    }

    /// Check that the store answers queries.
    pub async fn ping(&self) -> Result<()> {
        self.execute::<TotalRow>("SELECT toUInt64(1) AS total", &[])
            .await
            .wrap_err_with(|| format!("ClickHouse database {} unreachable", self.db_name))?;
        Ok(())
    }

    /// Count the rows of a filtered join.
    pub async fn fetch_count(&self, query: &SelectQuery) -> Result<u64> {
        let rows = self
            .execute::<TotalRow>(&query.count_sql(), query.binds())
            .await
            .context("counting rows failed")?;
        Ok(rows.first().map_or(0, |row| row.total))
    }

    /// Fetch one window of a filtered join in listing order.
    pub async fn fetch_window<R>(&self, query: &SelectQuery, page: Page) -> Result<Vec<R>>
    where
        R: Row + for<'b> Deserialize<'b>,
    {
        self.execute(&query.window_sql(page), query.binds()).await.context("fetching window failed")
    }

    /// Fetch the first row of a filtered join, if any.
    pub async fn fetch_first<R>(&self, query: &SelectQuery) -> Result<Option<R>>
    where
        R: Row + for<'b> Deserialize<'b>,
    {
        let rows = self
            .execute(&query.first_sql(), query.binds())
            .await
            .context("fetching first row failed")?;
        Ok(rows.into_iter().next())
    }

    /// Fetch the first row of a filtered join with its status backfilled.
    pub async fn lookup<R>(&self, query: &SelectQuery) -> Result<Option<R>>
    where
        R: Row + for<'b> Deserialize<'b> + CrossChainEvent,
    {
        let mut row = self.fetch_first::<R>(query).await?;
        if let Some(row) = row.as_mut() {
            row.backfill_status();
        }
        Ok(row)
    }

    /// Count a filtered join, then fetch one window of it with statuses
    /// backfilled from observed executions.
    ///
    /// The count covers the whole filtered join, not only the window.
    pub async fn aggregate<R>(&self, query: &SelectQuery, page: Page) -> Result<(Vec<R>, u64)>
    where
        R: Row + for<'b> Deserialize<'b> + CrossChainEvent,
    {
        let total = self.fetch_count(query).await?;
        let mut rows: Vec<R> = self.fetch_window(query, page).await?;
        for row in &mut rows {
            row.backfill_status();
        }
        Ok((rows, total))
    }
}
