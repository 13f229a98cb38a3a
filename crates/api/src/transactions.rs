//! List and lookup of cross-chain transactions

use std::time::Duration;

use api_types::{CrossChainDocument, TransactionListResponse};
use clickhouse_lib::{
    BridgeRow, Datastores, RawRow, RedeemRow, SelectQuery, TransferRow, bridge_query,
    redeem_query, transfer_query,
};
use primitives::{Category, Page, QueryError, humanize_or_raw};
use tracing::debug;

use crate::{fanout::with_deadline, normalize::normalize};

/// Deadline of a bridge listing.
pub const BRIDGE_LIST_DEADLINE: Duration = Duration::from_secs(30);
/// Deadline of a transfer or redeem listing, whose joins are wider.
pub const EVENT_LIST_DEADLINE: Duration = Duration::from_secs(45);
/// Deadline of an exact tx hash lookup.
pub const GET_DEADLINE: Duration = Duration::from_secs(15);

fn humanize_staker(mut row: BridgeRow) -> BridgeRow {
    row.staker_script_pubkey = humanize_or_raw(&row.staker_script_pubkey, &row.chain);
    row
}

/// The join shape of a category scoped by the settlement chain: deposits
/// on it, token sends from other chains, redemptions into it. A `tx_hash`
/// narrows it to one originating transaction.
fn category_query(
    db: &str,
    settlement_chain: &str,
    category: Category,
    tx_hash: Option<&str>,
) -> SelectQuery {
    let by_hash = |query: SelectQuery, column: &str| match tx_hash {
        Some(hash) => query.filter_eq(column, hash),
        None => query,
    };
    match category {
        Category::Bridge => {
            bridge_query(db, |q| by_hash(q.filter_eq("vt.chain", settlement_chain), "vt.tx_hash"))
        }
        Category::Transfer => transfer_query(db, |q| {
            by_hash(q.filter_ne("ts.source_chain", settlement_chain), "ts.tx_hash")
        }),
        Category::Redeem => redeem_query(db, |q| {
            by_hash(q.filter_eq("ert.destination_chain", settlement_chain), "ert.tx_hash")
        }),
    }
}

/// One page of a category, newest first, with the size of the whole
/// filtered set.
pub async fn list(
    stores: &Datastores,
    settlement_chain: &str,
    category: Category,
    page: Page,
) -> Result<TransactionListResponse, QueryError> {
    let reader = &stores.indexer;
    let query = category_query(reader.db_name(), settlement_chain, category, None);

    let (rows, total): (Vec<RawRow>, u64) = match category {
        Category::Bridge => {
            let (rows, total) = with_deadline(
                "list bridges",
                BRIDGE_LIST_DEADLINE,
                reader.aggregate::<BridgeRow>(&query, page),
            )
            .await?;
            (rows.into_iter().map(|row| RawRow::Bridge(humanize_staker(row))).collect(), total)
        }
        Category::Transfer => {
            let (rows, total) = with_deadline(
                "list transfers",
                EVENT_LIST_DEADLINE,
                reader.aggregate::<TransferRow>(&query, page),
            )
            .await?;
            (rows.into_iter().map(RawRow::Transfer).collect(), total)
        }
        Category::Redeem => {
            let (rows, total) = with_deadline(
                "list redeems",
                EVENT_LIST_DEADLINE,
                reader.aggregate::<RedeemRow>(&query, page),
            )
            .await?;
            (rows.into_iter().map(RawRow::Redeem).collect(), total)
        }
    };

    debug!(%category, rows = rows.len(), total, "Listed transactions");
    let data = rows.iter().map(|row| normalize(row, settlement_chain)).collect();
    Ok(TransactionListResponse { data, total })
}

/// The transaction of a category originating in `tx_hash`.
pub async fn get(
    stores: &Datastores,
    settlement_chain: &str,
    category: Category,
    tx_hash: &str,
) -> Result<CrossChainDocument, QueryError> {
    let reader = &stores.indexer;
    let query = category_query(reader.db_name(), settlement_chain, category, Some(tx_hash));

    let row = match category {
        Category::Bridge => {
            with_deadline("get bridge", GET_DEADLINE, reader.lookup::<BridgeRow>(&query))
                .await?
                .map(|row| RawRow::Bridge(humanize_staker(row)))
        }
        Category::Transfer => {
            with_deadline("get transfer", GET_DEADLINE, reader.lookup::<TransferRow>(&query))
                .await?
                .map(RawRow::Transfer)
        }
        Category::Redeem => {
            with_deadline("get redeem", GET_DEADLINE, reader.lookup::<RedeemRow>(&query))
                .await?
                .map(RawRow::Redeem)
        }
    };

    row.map(|row| normalize(&row, settlement_chain)).ok_or_else(|| QueryError::NotFound {
        entity: category.as_str(),
        key: tx_hash.to_owned(),
    })
}
