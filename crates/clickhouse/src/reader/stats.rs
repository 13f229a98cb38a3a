//! Aggregate queries behind charts, leaderboards and summaries
//!
//! Every method reads a single table of a single store. Combining results
//! across tables and stores happens in the caller.

use eyre::{Context, Result};

use super::client::ClickhouseReader;
use crate::{
    TimeBucket,
    models::{
        AddressAmount, ChainAmount, CountBucketRow, PathAmount, StakerAmount, TotalRow,
        UserStatsRow,
    },
};

/// Event table aggregated by a stats query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventTable {
    /// Vault deposits on the settlement chain
    VaultTransactions,
    /// Token-sent events on connected chains
    TokenSents,
}

impl EventTable {
    const fn table(self) -> &'static str {
        match self {
            Self::VaultTransactions => "vault_transactions",
            Self::TokenSents => "token_sents",
        }
    }

    const fn source_chain(self) -> &'static str {
        match self {
            Self::VaultTransactions => "chain",
            Self::TokenSents => "source_chain",
        }
    }

    const fn sender(self) -> &'static str {
        match self {
            Self::VaultTransactions => "staker_script_pubkey",
            Self::TokenSents => "source_address",
        }
    }

    const fn time(self) -> &'static str {
        match self {
            Self::VaultTransactions => "timestamp",
            Self::TokenSents => "block_time",
        }
    }

    /// Short name used in logs.
    pub const fn name(self) -> &'static str {
        self.table()
    }
}

/// Which end of a transfer a chain leaderboard ranks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainSide {
    /// Originating chain
    Source,
    /// Receiving chain
    Destination,
}

/// Quantity a leaderboard ranks by.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Summed amount
    Volume,
    /// Number of transfers
    TxCount,
}

impl Metric {
    const fn expr(self) -> &'static str {
        match self {
            Self::Volume => "sum(t.amount)",
            Self::TxCount => "count()",
        }
    }
}

fn tx_counts_sql(db: &str, table: EventTable, bucket: TimeBucket, limit: u64) -> String {
    format!(
        "SELECT {bucket_time} AS bucket_time, count() AS count \
         FROM {db}.{table} \
         GROUP BY bucket_time \
         ORDER BY bucket_time DESC \
         LIMIT {limit}",
        bucket_time = bucket.bucket_expr(table.time()),
        table = table.table(),
    )
}

fn redeem_tx_counts_sql(db: &str, bucket: TimeBucket, limit: u64) -> String {
    format!(
        "SELECT {bucket_time} AS bucket_time, count() AS count \
         FROM {db}.evm_redeem_txes ert \
         INNER JOIN {db}.block_headers bh \
           ON ert.source_chain = bh.chain AND ert.block_number = bh.block_number \
         GROUP BY bucket_time \
         ORDER BY bucket_time DESC \
         LIMIT {limit}",
        bucket_time = bucket.bucket_expr("bh.block_time"),
    )
}

/// A user is new in the bucket holding their first event over the whole
/// history of the table, not only over the returned window.
fn user_stats_sql(db: &str, table: EventTable, bucket: TimeBucket, limit: u64) -> String {
    format!(
        "SELECT {bucket_time} AS bucket_time, \
                uniqExact(e.{sender}) AS active_users, \
                uniqExactIf(e.{sender}, e.{time} = fs.first_time) AS new_users, \
                sum(e.amount) AS total_amount \
         FROM {db}.{table} e \
         INNER JOIN ( \
            SELECT {sender}, min({time}) AS first_time \
            FROM {db}.{table} \
            GROUP BY {sender} \
         ) fs ON e.{sender} = fs.{sender} \
         GROUP BY bucket_time \
         ORDER BY bucket_time DESC \
         LIMIT {limit}",
        bucket_time = bucket.bucket_expr(&format!("e.{}", table.time())),
        sender = table.sender(),
        time = table.time(),
        table = table.table(),
    )
}

fn top_senders_sql(db: &str, limit: u64) -> String {
    format!(
        "SELECT t.source_address AS address, sum(t.amount) AS amount \
         FROM {db}.token_sents t \
         WHERE t.source_chain LIKE 'evm|%' AND t.amount > 0 \
         GROUP BY t.source_address \
         ORDER BY amount DESC, address ASC \
         LIMIT {limit}"
    )
}

/// Query text and bind values; the chain filter is only added when given.
fn top_stakers_sql(db: &str, chain: Option<&str>, limit: u64) -> (String, Vec<String>) {
    let chain_filter = if chain.is_some() { "AND t.chain = ? " } else { "" };
    let sql = format!(
        "SELECT t.staker_script_pubkey AS staker_script_pubkey, \
                any(t.chain) AS chain, \
                sum(t.amount) AS amount \
         FROM {db}.vault_transactions t \
         WHERE t.staker_script_pubkey != '' AND t.amount > 0 {chain_filter}\
         GROUP BY t.staker_script_pubkey \
         ORDER BY amount DESC, staker_script_pubkey ASC \
         LIMIT {limit}"
    );
    (sql, chain.map(ToOwned::to_owned).into_iter().collect())
}

fn chain_totals_sql(
    db: &str,
    table: EventTable,
    side: ChainSide,
    metric: Metric,
    limit: u64,
) -> String {
    let column = match side {
        ChainSide::Source => table.source_chain(),
        ChainSide::Destination => "destination_chain",
    };
    format!(
        "SELECT t.{column} AS chain, {metric} AS amount \
         FROM {db}.{table} t \
         WHERE t.{column} != '' AND t.amount > 0 \
         GROUP BY t.{column} \
         ORDER BY amount DESC, chain ASC \
         LIMIT {limit}",
        metric = metric.expr(),
        table = table.table(),
    )
}

fn path_totals_sql(db: &str, table: EventTable, metric: Metric, limit: u64) -> String {
    format!(
        "SELECT t.{source} AS source_chain, \
                t.destination_chain AS destination_chain, \
                {metric} AS amount \
         FROM {db}.{table} t \
         WHERE t.amount > 0 \
         GROUP BY t.{source}, t.destination_chain \
         ORDER BY amount DESC, source_chain ASC, destination_chain ASC \
         LIMIT {limit}",
        source = table.source_chain(),
        metric = metric.expr(),
        table = table.table(),
    )
}

impl ClickhouseReader {
    /// Events per bucket for one table, newest buckets first.
    pub async fn get_tx_counts(
        &self,
        table: EventTable,
        bucket: TimeBucket,
        limit: u64,
    ) -> Result<Vec<CountBucketRow>> {
        self.execute(&tx_counts_sql(self.db_name(), table, bucket, limit), &[])
            .await
            .wrap_err_with(|| format!("fetching {} counts failed", table.name()))
    }

    /// Redemption requests per bucket, timed through the block directory.
    pub async fn get_redeem_tx_counts(
        &self,
        bucket: TimeBucket,
        limit: u64,
    ) -> Result<Vec<CountBucketRow>> {
        self.execute(&redeem_tx_counts_sql(self.db_name(), bucket, limit), &[])
            .await
            .context("fetching redeem counts failed")
    }

    /// Active users, first-time users and volume per bucket, newest first.
    pub async fn get_user_stats(
        &self,
        table: EventTable,
        bucket: TimeBucket,
        limit: u64,
    ) -> Result<Vec<UserStatsRow>> {
        self.execute(&user_stats_sql(self.db_name(), table, bucket, limit), &[])
            .await
            .wrap_err_with(|| format!("fetching {} user stats failed", table.name()))
    }

    /// EVM senders ranked by token-sent volume.
    pub async fn get_top_senders(&self, limit: u64) -> Result<Vec<AddressAmount>> {
        self.execute(&top_senders_sql(self.db_name(), limit), &[])
            .await
            .context("fetching top senders failed")
    }

    /// Stakers ranked by deposited volume, optionally on one chain.
    pub async fn get_top_stakers(
        &self,
        chain: Option<&str>,
        limit: u64,
    ) -> Result<Vec<StakerAmount>> {
        let (sql, binds) = top_stakers_sql(self.db_name(), chain, limit);
        self.execute(&sql, &binds).await.context("fetching top stakers failed")
    }

    /// Chains ranked by volume or transfer count on one side of the transfer.
    pub async fn get_chain_totals(
        &self,
        table: EventTable,
        side: ChainSide,
        metric: Metric,
        limit: u64,
    ) -> Result<Vec<ChainAmount>> {
        self.execute(&chain_totals_sql(self.db_name(), table, side, metric, limit), &[])
            .await
            .wrap_err_with(|| format!("fetching {} chain totals failed", table.name()))
    }

    /// Source and destination chain pairs ranked by volume or transfer count.
    pub async fn get_path_totals(
        &self,
        table: EventTable,
        metric: Metric,
        limit: u64,
    ) -> Result<Vec<PathAmount>> {
        self.execute(&path_totals_sql(self.db_name(), table, metric, limit), &[])
            .await
            .wrap_err_with(|| format!("fetching {} path totals failed", table.name()))
    }

    async fn fetch_total(&self, query: &str, binds: &[String]) -> Result<u64> {
        let rows = self.execute::<TotalRow>(query, binds).await?;
        Ok(rows.first().map_or(0, |row| row.total))
    }

    /// Number of vault deposits.
    pub async fn get_total_txs(&self) -> Result<u64> {
        let query = format!(
            "SELECT count() AS total FROM {db}.vault_transactions",
            db = self.db_name()
        );
        self.fetch_total(&query, &[]).await.context("fetching total txs failed")
    }

    /// Deposited volume on one chain.
    pub async fn get_total_volume(&self, chain: &str) -> Result<u64> {
        let query = format!(
            "SELECT toUInt64(sum(t.amount)) AS total FROM {db}.vault_transactions t \
             WHERE t.chain = ?",
            db = self.db_name()
        );
        self.fetch_total(&query, &[chain.to_owned()]).await.context("fetching total volume failed")
    }

    /// Number of distinct stakers.
    pub async fn get_total_users(&self) -> Result<u64> {
        let query = format!(
            "SELECT uniqExact(staker_script_pubkey) AS total FROM {db}.vault_transactions",
            db = self.db_name()
        );
        self.fetch_total(&query, &[]).await.context("fetching total users failed")
    }
}
