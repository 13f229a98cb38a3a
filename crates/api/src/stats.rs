//! Stats engine: merged time series, leaderboards, summary and dashboard
//!
//! Every metric is computed per source table, possibly on different stores,
//! then merged. Branches run concurrently under one deadline and the merge
//! goes through [`merge_many`], so the result does not depend on which
//! branch answered first.

use std::{cmp::Ordering, fmt, str::FromStr, time::Duration};

use api_types::{ChartPoint, DashboardResponse, Leaderboard, SummaryResponse};
use clickhouse_lib::{
    AddressAmount, ChainAmount, ChainSide, CountBucketRow, Datastores, EventTable, Metric,
    PathAmount, StakerAmount, TimeBucket, UserStatsRow,
};
use futures::FutureExt;
use primitives::{QueryError, humanize_or_raw, keep_last, merge_many, with_family_prefix};
use tracing::{debug, error};

use crate::fanout::{Branch, fan_out, with_deadline};

/// Deadline shared by the branches of a time series.
pub const SERIES_DEADLINE: Duration = Duration::from_secs(15);
/// Deadline of the top users leaderboard, which scans both stores.
pub const TOP_USERS_DEADLINE: Duration = Duration::from_secs(30);
/// Deadline of the remaining leaderboards.
pub const LEADERBOARD_DEADLINE: Duration = Duration::from_secs(15);
/// Deadline of the summary totals.
pub const SUMMARY_DEADLINE: Duration = Duration::from_secs(10);

/// Leaderboard branches fetch this many times the requested entries so that
/// entries spread over several sources still rank correctly after the merge.
const OVERSAMPLE: u64 = 2;

fn as_len(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn add_counts(a: CountBucketRow, b: CountBucketRow) -> CountBucketRow {
    CountBucketRow { bucket_time: a.bucket_time, count: a.count.saturating_add(b.count) }
}

fn add_user_stats(a: UserStatsRow, b: UserStatsRow) -> UserStatsRow {
    UserStatsRow {
        bucket_time: a.bucket_time,
        active_users: a.active_users.saturating_add(b.active_users),
        new_users: a.new_users.saturating_add(b.new_users),
        total_amount: a.total_amount.saturating_add(b.total_amount),
    }
}

/// Transfers per bucket over deposits, token sends and redemptions, oldest
/// bucket first, keeping the `limit` most recent buckets.
pub async fn tx_series(
    stores: &Datastores,
    bucket: TimeBucket,
    limit: u64,
) -> Result<Vec<CountBucketRow>, QueryError> {
    let branches: Vec<Branch<'_, Vec<CountBucketRow>>> = vec![
        (
            "indexer vault_transactions",
            stores.indexer.get_tx_counts(EventTable::VaultTransactions, bucket, limit).boxed(),
        ),
        (
            "relayer token_sents",
            stores.relayer.get_tx_counts(EventTable::TokenSents, bucket, limit).boxed(),
        ),
        ("indexer evm_redeem_txes", stores.indexer.get_redeem_tx_counts(bucket, limit).boxed()),
    ];
    let parts = fan_out("tx counts", branches, SERIES_DEADLINE).await?;

    let merged = merge_many(
        parts,
        |a, b| a.bucket_time.cmp(&b.bucket_time),
        add_counts,
    );
    Ok(keep_last(merged, as_len(limit)))
}

/// Active users, new users and volume per bucket over deposits and token
/// sends, oldest bucket first.
///
/// Users are counted per source and summed, so an address active on both
/// sources in one bucket counts twice.
pub async fn user_series(
    stores: &Datastores,
    bucket: TimeBucket,
    limit: u64,
) -> Result<Vec<UserStatsRow>, QueryError> {
    let branches: Vec<Branch<'_, Vec<UserStatsRow>>> = vec![
        (
            "indexer vault_transactions",
            stores.indexer.get_user_stats(EventTable::VaultTransactions, bucket, limit).boxed(),
        ),
        (
            "relayer token_sents",
            stores.relayer.get_user_stats(EventTable::TokenSents, bucket, limit).boxed(),
        ),
    ];
    let parts = fan_out("user stats", branches, SERIES_DEADLINE).await?;

    let merged = merge_many(
        parts,
        |a, b| a.bucket_time.cmp(&b.bucket_time),
        add_user_stats,
    );
    Ok(keep_last(merged, as_len(limit)))
}

/// Both merged time series.
pub async fn stats(
    stores: &Datastores,
    bucket: TimeBucket,
    limit: u64,
) -> Result<(Vec<CountBucketRow>, Vec<UserStatsRow>), QueryError> {
    tokio::try_join!(tx_series(stores, bucket, limit), user_series(stores, bucket, limit))
}

/// Series served by the chart endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Transfers per bucket
    Txs,
    /// Transferred amount per bucket
    Volumes,
    /// Distinct senders per bucket
    ActiveUsers,
    /// First-time senders per bucket
    NewUsers,
}

impl FromStr for ChartKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txs" => Ok(Self::Txs),
            "volumes" => Ok(Self::Volumes),
            "active-users" => Ok(Self::ActiveUsers),
            "new-users" => Ok(Self::NewUsers),
            other => Err(QueryError::validation("chart", format!("unknown chart `{other}`"))),
        }
    }
}

fn user_points(rows: &[UserStatsRow], value: impl Fn(&UserStatsRow) -> u64) -> Vec<ChartPoint> {
    rows.iter().map(|row| ChartPoint { time: row.bucket_time, data: value(row) }).collect()
}

fn tx_points(rows: &[CountBucketRow]) -> Vec<ChartPoint> {
    rows.iter().map(|row| ChartPoint { time: row.bucket_time, data: row.count }).collect()
}

/// One chart series.
pub async fn chart(
    stores: &Datastores,
    kind: ChartKind,
    bucket: TimeBucket,
    limit: u64,
) -> Result<Vec<ChartPoint>, QueryError> {
    let value: fn(&UserStatsRow) -> u64 = match kind {
        ChartKind::Txs => return Ok(tx_points(&tx_series(stores, bucket, limit).await?)),
        ChartKind::Volumes => |r| r.total_amount,
        ChartKind::ActiveUsers => |r| r.active_users,
        ChartKind::NewUsers => |r| r.new_users,
    };
    let rows = user_series(stores, bucket, limit).await?;
    Ok(user_points(&rows, value))
}

/// Ranking served by a leaderboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LeaderboardDimension {
    /// Senders by volume over token sends and deposits
    TopUsers,
    /// Stakers by deposited volume on one network
    TopBridges,
    /// Source chains by volume
    SourceChainsByVolume,
    /// Destination chains by volume
    DestinationChainsByVolume,
    /// Source and destination pairs by volume
    PathsByVolume,
    /// Source chains by transfer count
    SourceChainsByTx,
    /// Destination chains by transfer count
    DestinationChainsByTx,
    /// Source and destination pairs by transfer count
    PathsByTx,
}

impl LeaderboardDimension {
    /// Every dimension.
    pub const ALL: [Self; 8] = [
        Self::TopUsers,
        Self::TopBridges,
        Self::SourceChainsByVolume,
        Self::DestinationChainsByVolume,
        Self::PathsByVolume,
        Self::SourceChainsByTx,
        Self::DestinationChainsByTx,
        Self::PathsByTx,
    ];

    /// Kebab-case name used in routes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopUsers => "top-users",
            Self::TopBridges => "top-bridges",
            Self::SourceChainsByVolume => "source-chains-by-volume",
            Self::DestinationChainsByVolume => "destination-chains-by-volume",
            Self::PathsByVolume => "paths-by-volume",
            Self::SourceChainsByTx => "source-chains-by-tx",
            Self::DestinationChainsByTx => "destination-chains-by-tx",
            Self::PathsByTx => "paths-by-tx",
        }
    }
}

impl FromStr for LeaderboardDimension {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|d| d.as_str() == s).ok_or_else(|| {
            QueryError::validation("dimension", format!("unknown leaderboard `{s}`"))
        })
    }
}

impl fmt::Display for LeaderboardDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaderboard entry that can be merged by key and ranked by amount.
trait Ranked {
    fn amount(&self) -> u64;
    fn add(&mut self, amount: u64);
    fn cmp_key(&self, other: &Self) -> Ordering;
}

impl Ranked for AddressAmount {
    fn amount(&self) -> u64 {
        self.amount
    }
    fn add(&mut self, amount: u64) {
        self.amount = self.amount.saturating_add(amount);
    }
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl Ranked for ChainAmount {
    fn amount(&self) -> u64 {
        self.amount
    }
    fn add(&mut self, amount: u64) {
        self.amount = self.amount.saturating_add(amount);
    }
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.chain.cmp(&other.chain)
    }
}

impl Ranked for PathAmount {
    fn amount(&self) -> u64 {
        self.amount
    }
    fn add(&mut self, amount: u64) {
        self.amount = self.amount.saturating_add(amount);
    }
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.source_chain
            .cmp(&other.source_chain)
            .then_with(|| self.destination_chain.cmp(&other.destination_chain))
    }
}

/// Sum entries sharing a key across and within branches, then keep the
/// `limit` largest. Equal amounts rank by key.
fn merge_ranked<T: Ranked>(parts: Vec<Vec<T>>, limit: u64) -> Vec<T> {
    let parts = parts
        .into_iter()
        .map(|mut part| {
            // Prefixing chain ids can make two rows of one branch share a key.
            part.sort_by(T::cmp_key);
            part.dedup_by(|later, kept| {
                let same = later.cmp_key(kept).is_eq();
                if same {
                    kept.add(later.amount());
                }
                same
            });
            part
        })
        .collect();

    let mut merged = merge_many(parts, T::cmp_key, |mut a, b| {
        a.add(b.amount());
        a
    });
    merged.sort_by(|a, b| b.amount().cmp(&a.amount()).then_with(|| a.cmp_key(b)));
    merged.truncate(as_len(limit));
    merged
}

fn decode_stakers(rows: Vec<StakerAmount>) -> Vec<AddressAmount> {
    rows.into_iter()
        .map(|row| AddressAmount {
            address: humanize_or_raw(&row.staker_script_pubkey, &row.chain),
            amount: row.amount,
        })
        .collect()
}

fn prefix_chains(rows: Vec<ChainAmount>) -> Vec<ChainAmount> {
    rows.into_iter()
        .map(|row| ChainAmount { chain: with_family_prefix(&row.chain), amount: row.amount })
        .collect()
}

fn prefix_paths(rows: Vec<PathAmount>) -> Vec<PathAmount> {
    rows.into_iter()
        .map(|row| PathAmount {
            source_chain: with_family_prefix(&row.source_chain),
            destination_chain: with_family_prefix(&row.destination_chain),
            amount: row.amount,
        })
        .collect()
}

/// Senders ranked by volume over relayer token sends and indexer deposits.
pub async fn top_users(stores: &Datastores, limit: u64) -> Result<Vec<AddressAmount>, QueryError> {
    let candidates = limit.saturating_mul(OVERSAMPLE);
    let branches: Vec<Branch<'_, Vec<AddressAmount>>> = vec![
        ("relayer token_sents", stores.relayer.get_top_senders(candidates).boxed()),
        (
            "indexer vault_transactions",
            async move { stores.indexer.get_top_stakers(None, candidates).await.map(decode_stakers) }
                .boxed(),
        ),
    ];
    let parts = fan_out("top users", branches, TOP_USERS_DEADLINE).await?;
    Ok(merge_ranked(parts, limit))
}

/// Stakers ranked by deposited volume on `chain`, addresses decoded.
pub async fn top_bridges(
    stores: &Datastores,
    chain: &str,
    limit: u64,
) -> Result<Vec<AddressAmount>, QueryError> {
    let rows = with_deadline(
        "top bridges",
        LEADERBOARD_DEADLINE,
        stores.indexer.get_top_stakers(Some(chain), limit),
    )
    .await?;
    Ok(merge_ranked(vec![decode_stakers(rows)], limit))
}

/// Chains ranked on one side of the transfer over deposits and token sends.
pub async fn top_chains(
    stores: &Datastores,
    side: ChainSide,
    metric: Metric,
    limit: u64,
) -> Result<Vec<ChainAmount>, QueryError> {
    let candidates = limit.saturating_mul(OVERSAMPLE);
    let branches: Vec<Branch<'_, Vec<ChainAmount>>> = vec![
        (
            "indexer vault_transactions",
            async move {
                stores
                    .indexer
                    .get_chain_totals(EventTable::VaultTransactions, side, metric, candidates)
                    .await
                    .map(prefix_chains)
            }
            .boxed(),
        ),
        (
            "relayer token_sents",
            async move {
                stores
                    .relayer
                    .get_chain_totals(EventTable::TokenSents, side, metric, candidates)
                    .await
                    .map(prefix_chains)
            }
            .boxed(),
        ),
    ];
    let parts = fan_out("top chains", branches, LEADERBOARD_DEADLINE).await?;
    Ok(merge_ranked(parts, limit))
}

/// Source and destination pairs ranked over deposits and token sends.
pub async fn top_paths(
    stores: &Datastores,
    metric: Metric,
    limit: u64,
) -> Result<Vec<PathAmount>, QueryError> {
    let candidates = limit.saturating_mul(OVERSAMPLE);
    let branches: Vec<Branch<'_, Vec<PathAmount>>> = vec![
        (
            "indexer vault_transactions",
            async move {
                stores
                    .indexer
                    .get_path_totals(EventTable::VaultTransactions, metric, candidates)
                    .await
                    .map(prefix_paths)
            }
            .boxed(),
        ),
        (
            "relayer token_sents",
            async move {
                stores
                    .relayer
                    .get_path_totals(EventTable::TokenSents, metric, candidates)
                    .await
                    .map(prefix_paths)
            }
            .boxed(),
        ),
    ];
    let parts = fan_out("top paths", branches, LEADERBOARD_DEADLINE).await?;
    Ok(merge_ranked(parts, limit))
}

/// One leaderboard by dimension. `chain` only narrows [`LeaderboardDimension::TopBridges`].
pub async fn leaderboard(
    stores: &Datastores,
    dimension: LeaderboardDimension,
    limit: u64,
    chain: &str,
) -> Result<Leaderboard, QueryError> {
    use ChainSide::{Destination, Source};
    use LeaderboardDimension as D;
    use Metric::{TxCount, Volume};

    let board = match dimension {
        D::TopUsers => Leaderboard::Addresses(top_users(stores, limit).await?),
        D::TopBridges => Leaderboard::Addresses(top_bridges(stores, chain, limit).await?),
        D::SourceChainsByVolume => {
            Leaderboard::Chains(top_chains(stores, Source, Volume, limit).await?)
        }
        D::DestinationChainsByVolume => {
            Leaderboard::Chains(top_chains(stores, Destination, Volume, limit).await?)
        }
        D::PathsByVolume => Leaderboard::Paths(top_paths(stores, Volume, limit).await?),
        D::SourceChainsByTx => {
            Leaderboard::Chains(top_chains(stores, Source, TxCount, limit).await?)
        }
        D::DestinationChainsByTx => {
            Leaderboard::Chains(top_chains(stores, Destination, TxCount, limit).await?)
        }
        D::PathsByTx => Leaderboard::Paths(top_paths(stores, TxCount, limit).await?),
    };
    debug!(%dimension, entries = board.len(), "Computed leaderboard");
    Ok(board)
}

/// Deposit totals for one network.
pub async fn summary(stores: &Datastores, chain: &str) -> Result<SummaryResponse, QueryError> {
    let indexer = &stores.indexer;
    let (total_txs, total_volumes, total_users) =
        with_deadline("summary", SUMMARY_DEADLINE, async {
            tokio::try_join!(
                indexer.get_total_txs(),
                indexer.get_total_volume(chain),
                indexer.get_total_users()
            )
        })
        .await?;
    Ok(SummaryResponse { total_txs, total_volumes, total_users })
}

fn or_empty<T>(dimension: LeaderboardDimension, result: Result<Vec<T>, QueryError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!(%dimension, error = %e, "Leaderboard failed, serving it empty");
        Vec::new()
    })
}

/// Series, summary and every leaderboard in one response.
///
/// Series and summary failures fail the request; a failed leaderboard is
/// served empty.
pub async fn dashboard(
    stores: &Datastores,
    bucket: TimeBucket,
    limit: u64,
    chain: &str,
) -> Result<DashboardResponse, QueryError> {
    use ChainSide::{Destination, Source};
    use LeaderboardDimension as D;
    use Metric::{TxCount, Volume};

    let ((txs, users), summary) =
        tokio::try_join!(stats(stores, bucket, limit), summary(stores, chain))?;

    let (users_board, bridges, src_vol, dst_vol, paths_vol, src_tx, dst_tx, paths_tx) = tokio::join!(
        top_users(stores, limit),
        top_bridges(stores, chain, limit),
        top_chains(stores, Source, Volume, limit),
        top_chains(stores, Destination, Volume, limit),
        top_paths(stores, Volume, limit),
        top_chains(stores, Source, TxCount, limit),
        top_chains(stores, Destination, TxCount, limit),
        top_paths(stores, TxCount, limit),
    );

    Ok(DashboardResponse {
        txs: tx_points(&txs),
        volumes: user_points(&users, |r| r.total_amount),
        active_users: user_points(&users, |r| r.active_users),
        new_users: user_points(&users, |r| r.new_users),
        summary,
        top_users: or_empty(D::TopUsers, users_board),
        top_bridges: or_empty(D::TopBridges, bridges),
        top_source_chains_by_volume: or_empty(D::SourceChainsByVolume, src_vol),
        top_destination_chains_by_volume: or_empty(D::DestinationChainsByVolume, dst_vol),
        top_paths_by_volume: or_empty(D::PathsByVolume, paths_vol),
        top_source_chains_by_tx: or_empty(D::SourceChainsByTx, src_tx),
        top_destination_chains_by_tx: or_empty(D::DestinationChainsByTx, dst_tx),
        top_paths_by_tx: or_empty(D::PathsByTx, paths_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(address: &str, amount: u64) -> AddressAmount {
        AddressAmount { address: address.to_owned(), amount }
    }

    fn chain(chain: &str, amount: u64) -> ChainAmount {
        ChainAmount { chain: chain.to_owned(), amount }
    }

    #[test]
    fn ranks_across_branches() {
        let relayer = vec![addr("0xa", 50), addr("0xb", 40), addr("0xc", 30)];
        let indexer = vec![addr("tb1q", 45), addr("0xc", 25)];
        let ranked = merge_ranked(vec![relayer, indexer], 3);
        assert_eq!(ranked, vec![addr("0xc", 55), addr("0xa", 50), addr("tb1q", 45)]);
    }

    #[test]
    fn merged_amounts_saturate() {
        let ranked = merge_ranked(vec![vec![addr("0xa", u64::MAX)], vec![addr("0xa", 1)]], 1);
        assert_eq!(ranked, vec![addr("0xa", u64::MAX)]);

        let count = |count| CountBucketRow { bucket_time: 60, count };
        assert_eq!(add_counts(count(u64::MAX), count(2)), count(u64::MAX));

        let users = |n| UserStatsRow { bucket_time: 60, active_users: n, new_users: n, total_amount: n };
        assert_eq!(add_user_stats(users(u64::MAX), users(1)), users(u64::MAX));
        assert_eq!(add_user_stats(users(2), users(3)), users(5));
    }

    #[test]
    fn equal_amounts_rank_by_key() {
        let ranked = merge_ranked(vec![vec![addr("0xb", 10)], vec![addr("0xa", 10)]], 10);
        assert_eq!(ranked, vec![addr("0xa", 10), addr("0xb", 10)]);
    }

    #[test]
    fn ranking_ignores_branch_order() {
        let a = vec![chain("evm|1", 3), chain("bitcoin|4", 9)];
        let b = vec![chain("evm|56", 4), chain("evm|1", 2)];
        assert_eq!(merge_ranked(vec![a.clone(), b.clone()], 5), merge_ranked(vec![b, a], 5));
    }

    #[test]
    fn bare_chain_ids_join_their_prefixed_form() {
        let branch = prefix_chains(vec![chain("1", 3), chain("evm|1", 4), chain("bitcoin|4", 1)]);
        let ranked = merge_ranked(vec![branch], 10);
        assert_eq!(ranked, vec![chain("evm|1", 7), chain("bitcoin|4", 1)]);
    }

    #[test]
    fn paths_prefix_both_ends() {
        let rows = prefix_paths(vec![PathAmount {
            source_chain: "56".to_owned(),
            destination_chain: "bitcoin|4".to_owned(),
            amount: 1,
        }]);
        assert_eq!(rows[0].source_chain, "evm|56");
        assert_eq!(rows[0].destination_chain, "bitcoin|4");
    }

    #[test]
    fn stakers_decode_or_keep_script() {
        let rows = decode_stakers(vec![
            StakerAmount {
                staker_script_pubkey: "0014751e76e8199196d454941c45d1b3a323f1433bd6".to_owned(),
                chain: "bitcoin|0".to_owned(),
                amount: 5,
            },
            StakerAmount {
                staker_script_pubkey: "zz".to_owned(),
                chain: "bitcoin|0".to_owned(),
                amount: 1,
            },
        ]);
        assert_eq!(rows[0].address, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
        assert_eq!(rows[1].address, "zz");
    }

    #[test]
    fn dimension_names_round_trip() {
        for dimension in LeaderboardDimension::ALL {
            assert_eq!(dimension.as_str().parse::<LeaderboardDimension>().unwrap(), dimension);
        }
        assert!("top-whales".parse::<LeaderboardDimension>().is_err());
    }

    #[test]
    fn chart_names() {
        assert_eq!("active-users".parse::<ChartKind>().unwrap(), ChartKind::ActiveUsers);
        assert!("fees".parse::<ChartKind>().is_err());
    }
}
