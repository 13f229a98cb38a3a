use clickhouse::Row;
use derive_more::Debug;
use primitives::{Status, TransferType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Downstream execution of a cross-chain event, present once observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution<'a> {
    /// Command or settlement identifier linking source and destination
    pub command_id: &'a str,
    /// Destination transaction hash
    pub tx_hash: &'a str,
    /// Destination block number
    pub block_number: u64,
    /// Executing contract or custodian
    pub address: &'a str,
    /// Destination block time in unix seconds, `0` if unknown
    pub executed_at: u64,
}

/// Fields every raw cross-chain row exposes, whatever its source table.
pub trait CrossChainEvent {
    /// Unique event identifier
    fn event_id(&self) -> &str;
    /// Chain the event originated on
    fn source_chain(&self) -> &str;
    /// Chain the value is sent to
    fn destination_chain(&self) -> &str;
    /// Originating transaction hash
    fn tx_hash(&self) -> &str;
    /// Originating block number
    fn block_number(&self) -> u64;
    /// Sender on the source chain
    fn source_address(&self) -> &str;
    /// Receiver on the destination chain
    fn destination_address(&self) -> &str;
    /// Token symbol
    fn symbol(&self) -> &str;
    /// Token contract on the destination chain
    fn token_address(&self) -> &str;
    /// Transferred amount in base units
    fn amount(&self) -> u64;
    /// Status reported by the upstream pipeline
    fn status(&self) -> &str;
    /// Mutable access to the upstream status
    fn status_mut(&mut self) -> &mut String;
    /// Log index of the originating event
    fn log_index(&self) -> u64;
    /// Originating block time in unix seconds
    fn created_at(&self) -> u64;
    /// How the transfer was initiated
    fn transfer_type(&self) -> TransferType;
    /// Downstream execution, if one was observed
    fn execution(&self) -> Option<Execution<'_>>;

    /// Force the status to success once execution has been observed.
    ///
    /// Never moves a row back to pending.
    fn backfill_status(&mut self) {
        if self.execution().is_some() {
            *self.status_mut() = Status::Success.to_string();
        }
    }
}

/// Vault deposit on the settlement chain joined with its command execution.
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeRow {
    /// Deposit transaction hash
    pub tx_hash: String,
    /// Deposit block number
    pub block_number: u64,
    /// Output index of the deposit
    pub log_index: u64,
    /// Deposit block time
    pub timestamp: u64,
    /// Settlement chain identifier
    pub chain: String,
    /// Hex encoded staker output script, humanized after fetch
    pub staker_script_pubkey: String,
    /// Destination chain identifier
    pub destination_chain: String,
    /// Recipient on the destination chain
    pub destination_recipient_address: String,
    /// Token contract on the destination chain
    pub destination_token_address: String,
    /// Token symbol
    pub symbol: String,
    /// Deposited amount in satoshis
    pub amount: u64,
    /// Pipeline status
    pub status: String,
    /// Executed command id
    pub command_id: String,
    /// Execution transaction hash, empty until executed
    pub executed_tx_hash: String,
    /// Execution block number
    pub executed_block_number: u64,
    /// Gateway contract that executed the command
    pub executed_address: String,
    /// Execution block time
    pub executed_at: u64,
}

impl CrossChainEvent for BridgeRow {
    fn event_id(&self) -> &str {
        &self.tx_hash
    }
    fn source_chain(&self) -> &str {
        &self.chain
    }
    fn destination_chain(&self) -> &str {
        &self.destination_chain
    }
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }
    fn block_number(&self) -> u64 {
        self.block_number
    }
    fn source_address(&self) -> &str {
        &self.staker_script_pubkey
    }
    fn destination_address(&self) -> &str {
        &self.destination_recipient_address
    }
    fn symbol(&self) -> &str {
        &self.symbol
    }
    fn token_address(&self) -> &str {
        &self.destination_token_address
    }
    fn amount(&self) -> u64 {
        self.amount
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn status_mut(&mut self) -> &mut String {
        &mut self.status
    }
    fn log_index(&self) -> u64 {
        self.log_index
    }
    fn created_at(&self) -> u64 {
        self.timestamp
    }
    fn transfer_type(&self) -> TransferType {
        TransferType::DepositAddress
    }
    fn execution(&self) -> Option<Execution<'_>> {
        (!self.executed_tx_hash.is_empty()).then(|| Execution {
            command_id: &self.command_id,
            tx_hash: &self.executed_tx_hash,
            block_number: self.executed_block_number,
            address: &self.executed_address,
            executed_at: self.executed_at,
        })
    }
}

/// Token-sent event between non-settlement chains joined with its execution.
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferRow {
    /// Event id
    pub event_id: String,
    /// Source transaction hash
    pub tx_hash: String,
    /// Source block number
    pub block_number: u64,
    /// Log index of the event
    pub log_index: u64,
    /// Source block time
    pub block_time: u64,
    /// Source chain identifier
    pub source_chain: String,
    /// Sender
    pub source_address: String,
    /// Destination chain identifier
    pub destination_chain: String,
    /// Receiver
    pub destination_address: String,
    /// Token contract on the source chain
    pub token_contract_address: String,
    /// Token symbol
    pub symbol: String,
    /// Amount in base units
    pub amount: u64,
    /// Pipeline status
    pub status: String,
    /// Executed command id
    pub command_id: String,
    /// Execution transaction hash, empty until executed
    pub executed_tx_hash: String,
    /// Execution block number
    pub executed_block_number: u64,
    /// Gateway contract that executed the command
    pub executed_address: String,
    /// Execution block time
    pub executed_at: u64,
}

impl CrossChainEvent for TransferRow {
    fn event_id(&self) -> &str {
        &self.event_id
    }
    fn source_chain(&self) -> &str {
        &self.source_chain
    }
    fn destination_chain(&self) -> &str {
        &self.destination_chain
    }
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }
    fn block_number(&self) -> u64 {
        self.block_number
    }
    fn source_address(&self) -> &str {
        &self.source_address
    }
    fn destination_address(&self) -> &str {
        &self.destination_address
    }
    fn symbol(&self) -> &str {
        &self.symbol
    }
    fn token_address(&self) -> &str {
        &self.token_contract_address
    }
    fn amount(&self) -> u64 {
        self.amount
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn status_mut(&mut self) -> &mut String {
        &mut self.status
    }
    fn log_index(&self) -> u64 {
        self.log_index
    }
    fn created_at(&self) -> u64 {
        self.block_time
    }
    fn transfer_type(&self) -> TransferType {
        TransferType::SendToken
    }
    fn execution(&self) -> Option<Execution<'_>> {
        (!self.executed_tx_hash.is_empty()).then(|| Execution {
            command_id: &self.command_id,
            tx_hash: &self.executed_tx_hash,
            block_number: self.executed_block_number,
            address: &self.executed_address,
            executed_at: self.executed_at,
        })
    }
}

/// Redemption request towards the settlement chain joined with the custodian
/// settlement transaction of the same session.
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedeemRow {
    /// Event id
    pub event_id: String,
    /// Request transaction hash
    pub tx_hash: String,
    /// Request block number
    pub block_number: u64,
    /// Log index of the request event
    pub log_index: u64,
    /// Request block time from the block directory
    pub block_time: u64,
    /// Source chain identifier
    pub source_chain: String,
    /// Redeemer
    pub source_address: String,
    /// Settlement chain identifier
    pub destination_chain: String,
    /// Locking script or address receiving the redeemed coins
    pub destination_address: String,
    /// Burned token contract
    pub token_contract_address: String,
    /// Token symbol
    pub symbol: String,
    /// Amount in base units
    pub amount: u64,
    /// Pipeline status
    pub status: String,
    /// Custodian group that signs the settlement
    pub custodian_group_uid: String,
    /// Signing session of the custodian group
    pub session_sequence: u64,
    /// Settlement transaction hash, empty until settled
    pub settlement_tx_hash: String,
    /// Settlement block number
    pub settlement_block_number: u64,
    /// Settlement block time
    pub settlement_at: u64,
}

impl CrossChainEvent for RedeemRow {
    fn event_id(&self) -> &str {
        &self.event_id
    }
    fn source_chain(&self) -> &str {
        &self.source_chain
    }
    fn destination_chain(&self) -> &str {
        &self.destination_chain
    }
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }
    fn block_number(&self) -> u64 {
        self.block_number
    }
    fn source_address(&self) -> &str {
        &self.source_address
    }
    fn destination_address(&self) -> &str {
        &self.destination_address
    }
    fn symbol(&self) -> &str {
        &self.symbol
    }
    fn token_address(&self) -> &str {
        &self.token_contract_address
    }
    fn amount(&self) -> u64 {
        self.amount
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn status_mut(&mut self) -> &mut String {
        &mut self.status
    }
    fn log_index(&self) -> u64 {
        self.log_index
    }
    fn created_at(&self) -> u64 {
        self.block_time
    }
    fn transfer_type(&self) -> TransferType {
        TransferType::SendToken
    }
    fn execution(&self) -> Option<Execution<'_>> {
        (!self.settlement_tx_hash.is_empty()).then(|| Execution {
            command_id: &self.settlement_tx_hash,
            tx_hash: &self.settlement_tx_hash,
            block_number: self.settlement_block_number,
            address: &self.custodian_group_uid,
            executed_at: self.settlement_at,
        })
    }
}

/// Raw row of any cross-chain category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRow {
    /// Vault deposit
    Bridge(BridgeRow),
    /// Token-sent transfer
    Transfer(TransferRow),
    /// Redemption
    Redeem(RedeemRow),
}

/// Number of events in a time bucket
#[derive(Debug, Clone, Copy, Row, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CountBucketRow {
    /// Bucket start in unix seconds
    pub bucket_time: u64,
    /// Event count
    pub count: u64,
}

/// User activity and volume in a time bucket
#[derive(Debug, Clone, Copy, Row, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserStatsRow {
    /// Bucket start in unix seconds
    pub bucket_time: u64,
    /// Distinct senders active in the bucket
    pub active_users: u64,
    /// Senders whose first ever transfer falls in the bucket
    pub new_users: u64,
    /// Transferred amount
    pub total_amount: u64,
}

/// Amount or count per address
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AddressAmount {
    /// Address
    pub address: String,
    /// Summed amount or transaction count
    pub amount: u64,
}

/// Volume per staker output script, before the script is humanized
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakerAmount {
    /// Hex encoded output script
    pub staker_script_pubkey: String,
    /// Chain the deposits were made on
    pub chain: String,
    /// Summed amount
    pub amount: u64,
}

/// Amount or count per chain
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ChainAmount {
    /// Chain identifier
    pub chain: String,
    /// Summed amount or transaction count
    pub amount: u64,
}

/// Amount or count per source and destination chain pair
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PathAmount {
    /// Source chain identifier
    pub source_chain: String,
    /// Destination chain identifier
    pub destination_chain: String,
    /// Summed amount or transaction count
    pub amount: u64,
}

/// Single scalar aggregate
#[derive(Debug, Clone, Copy, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalRow {
    /// Aggregate value
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(tx_hash: &str, executed_tx_hash: &str) -> TransferRow {
        TransferRow {
            event_id: format!("{tx_hash}-0"),
            tx_hash: tx_hash.to_owned(),
            block_number: 100,
            log_index: 0,
            block_time: 1_700_000_000,
            source_chain: "evm|1".to_owned(),
            source_address: "0xsender".to_owned(),
            destination_chain: "evm|56".to_owned(),
            destination_address: "0xreceiver".to_owned(),
            token_contract_address: "0xtoken".to_owned(),
            symbol: "sBTC".to_owned(),
            amount: 1_000,
            status: "pending".to_owned(),
            command_id: String::new(),
            executed_tx_hash: executed_tx_hash.to_owned(),
            executed_block_number: 0,
            executed_address: String::new(),
            executed_at: 0,
        }
    }

    #[test]
    fn execution_requires_downstream_hash() {
        assert!(transfer("0xaa", "").execution().is_none());
        let row = transfer("0xaa", "0xbb");
        let execution = row.execution().unwrap();
        assert_eq!(execution.tx_hash, "0xbb");
    }

    #[test]
    fn backfill_only_moves_towards_success() {
        let mut pending = transfer("0xaa", "");
        pending.backfill_status();
        assert_eq!(pending.status, "pending");

        let mut executed = transfer("0xaa", "0xbb");
        executed.backfill_status();
        assert_eq!(executed.status, "success");

        let mut already = transfer("0xaa", "");
        already.status = "success".to_owned();
        already.backfill_status();
        assert_eq!(already.status, "success");
    }

    #[test]
    fn redeem_execution_uses_settlement_session() {
        let row = RedeemRow {
            event_id: "e".to_owned(),
            tx_hash: "0xaa".to_owned(),
            block_number: 1,
            log_index: 2,
            block_time: 3,
            source_chain: "evm|1".to_owned(),
            source_address: "0xredeemer".to_owned(),
            destination_chain: "bitcoin|4".to_owned(),
            destination_address: "tb1q".to_owned(),
            token_contract_address: "0xtoken".to_owned(),
            symbol: "sBTC".to_owned(),
            amount: 5,
            status: "pending".to_owned(),
            custodian_group_uid: "group".to_owned(),
            session_sequence: 9,
            settlement_tx_hash: "btc-tx".to_owned(),
            settlement_block_number: 77,
            settlement_at: 1_700_000_500,
        };
        let execution = row.execution().unwrap();
        assert_eq!(execution.address, "group");
        assert_eq!(execution.block_number, 77);
        assert_eq!(execution.executed_at, 1_700_000_500);
        assert_eq!(row.transfer_type(), TransferType::SendToken);
    }
}
