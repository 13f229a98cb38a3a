use super::*;
use crate::*;
use clickhouse::test::{Mock, handlers};
use primitives::Page;

fn reader(mock: &Mock) -> ClickhouseReader {
    let url = url::Url::parse(mock.url()).unwrap();
    ClickhouseReader::new(url, "db".to_owned(), "user".into(), "pass".into()).unwrap()
}

fn bridge_row(block_number: u64, executed_tx_hash: &str) -> BridgeRow {
    BridgeRow {
        tx_hash: format!("{block_number:064x}"),
        block_number,
        log_index: 0,
        timestamp: 1_700_000_000 + block_number,
        chain: "bitcoin|4".to_owned(),
        staker_script_pubkey: "0014751e76e8199196d454941c45d1b3a323f1433bd6".to_owned(),
        destination_chain: "evm|11155111".to_owned(),
        destination_recipient_address: "0xrecipient".to_owned(),
        destination_token_address: "0xtoken".to_owned(),
        symbol: "sBTC".to_owned(),
        amount: 10_000,
        status: "pending".to_owned(),
        command_id: String::new(),
        executed_tx_hash: executed_tx_hash.to_owned(),
        executed_block_number: 0,
        executed_address: String::new(),
        executed_at: 0,
    }
}

#[tokio::test]
async fn aggregate_counts_then_fetches_window() {
    let mock = Mock::new();
    mock.add(handlers::provide(vec![TotalRow { total: 25 }]));
    mock.add(handlers::provide((16..26).rev().map(|n| bridge_row(n, "")).collect::<Vec<_>>()));

    let reader = reader(&mock);
    let query = bridge_query(reader.db_name(), |q| q.filter_eq("vt.chain", "bitcoin|4"));
    let (rows, total) =
        reader.aggregate::<BridgeRow>(&query, Page::new(10, 0)).await.unwrap();

    assert_eq!(total, 25);
    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|w| w[0].block_number > w[1].block_number));
}

#[tokio::test]
async fn aggregate_backfills_executed_rows() {
    let mock = Mock::new();
    mock.add(handlers::provide(vec![TotalRow { total: 2 }]));
    mock.add(handlers::provide(vec![bridge_row(2, "0xexec"), bridge_row(1, "")]));

    let reader = reader(&mock);
    let query = bridge_query(reader.db_name(), |q| q);
    let (rows, _) = reader.aggregate::<BridgeRow>(&query, Page::default()).await.unwrap();

    assert_eq!(rows[0].status, "success");
    assert_eq!(rows[1].status, "pending");
}

#[tokio::test]
async fn fetch_first_returns_none_when_empty() {
    let mock = Mock::new();
    mock.add(handlers::provide(Vec::<TransferRow>::new()));

    let reader = reader(&mock);
    let query = transfer_query(reader.db_name(), |q| q.filter_eq("ts.tx_hash", "0xmissing"));
    let row = reader.fetch_first::<TransferRow>(&query).await.unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn tx_counts_return_rows() {
    let mock = Mock::new();
    mock.add(handlers::provide(vec![
        CountBucketRow { bucket_time: 172_800, count: 4 },
        CountBucketRow { bucket_time: 86_400, count: 2 },
    ]));

    let reader = reader(&mock);
    let rows =
        reader.get_tx_counts(EventTable::VaultTransactions, TimeBucket::Day, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], CountBucketRow { bucket_time: 172_800, count: 4 });
}

#[tokio::test]
async fn totals_default_to_zero_without_rows() {
    let mock = Mock::new();
    mock.add(handlers::provide(Vec::<TotalRow>::new()));
    mock.add(handlers::provide(vec![TotalRow { total: 42 }]));

    let reader = reader(&mock);
    assert_eq!(reader.get_total_txs().await.unwrap(), 0);
    assert_eq!(reader.get_total_volume("bitcoin|4").await.unwrap(), 42);
}

#[tokio::test]
async fn lookup_backfills_status() {
    let mock = Mock::new();
    mock.add(handlers::provide(vec![bridge_row(7, "0xexec")]));

    let reader = reader(&mock);
    let query = bridge_query(reader.db_name(), |q| q.filter_eq("vt.tx_hash", "0xaa"));
    let row = reader.lookup::<BridgeRow>(&query).await.unwrap().unwrap();
    assert_eq!(row.status, "success");
}
