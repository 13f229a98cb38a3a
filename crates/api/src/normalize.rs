//! Conversion of raw category rows into the unified document

use api_types::{Asset, BaseDocument, CrossChainDocument, DestinationDocument, SourceDocument};
use clickhouse_lib::{CrossChainEvent, RawRow};
use primitives::{Category, Status, display_name};

/// Decimals of every bridged token.
pub const TOKEN_DECIMALS: u8 = 8;

/// Normalize a row of any category.
pub fn normalize(row: &RawRow, settlement_chain: &str) -> CrossChainDocument {
    match row {
        RawRow::Bridge(row) => document_from(row, settlement_chain),
        RawRow::Transfer(row) => document_from(row, settlement_chain),
        RawRow::Redeem(row) => document_from(row, settlement_chain),
    }
}

/// Build the document for one event.
///
/// The category is derived from the endpoints, never read from the row.
pub fn document_from<E: CrossChainEvent>(row: &E, settlement_chain: &str) -> CrossChainDocument {
    let execution = row.execution();
    let executed_tx_hash = execution.map_or("", |e| e.tx_hash);
    let status = Status::from_hashes(row.tx_hash(), executed_tx_hash);

    let asset = |chain: &str| Asset {
        name: row.symbol().to_owned(),
        symbol: row.symbol().to_owned(),
        address: row.token_address().to_owned(),
        decimals: TOKEN_DECIMALS,
        is_native: chain == settlement_chain,
    };

    let source = SourceDocument {
        base: BaseDocument {
            chain: row.source_chain().to_owned(),
            chain_display_name: display_name(row.source_chain()),
            tx_hash: row.tx_hash().to_owned(),
            block_height: row.block_number(),
            status: row.status().to_owned(),
            value: row.amount().to_string(),
            fee: "0".to_owned(),
            asset: asset(row.source_chain()),
            created_at: row.created_at(),
        },
        sender_address: row.source_address().to_owned(),
        log_index: row.log_index(),
    };

    let destination = DestinationDocument {
        base: BaseDocument {
            chain: row.destination_chain().to_owned(),
            chain_display_name: display_name(row.destination_chain()),
            tx_hash: executed_tx_hash.to_owned(),
            block_height: execution.map_or(0, |e| e.block_number),
            status: status.to_string(),
            value: row.amount().to_string(),
            fee: "0".to_owned(),
            asset: asset(row.destination_chain()),
            created_at: execution.map_or(0, |e| e.executed_at),
        },
        receiver_address: row.destination_address().to_owned(),
    };

    CrossChainDocument {
        id: row.event_id().to_owned(),
        category: Category::classify(
            row.source_chain(),
            row.destination_chain(),
            settlement_chain,
        ),
        status,
        command_id: execution.map_or_else(String::new, |e| e.command_id.to_owned()),
        transfer_type: row.transfer_type(),
        source,
        destination,
    }
}
