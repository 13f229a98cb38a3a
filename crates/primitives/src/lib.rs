//! Core primitives for the bridgescope project.
/// Output-script to address decoding
pub mod address;
/// Chain identifiers, display names and cross-chain classification
pub mod chain;
/// Query error taxonomy
pub mod error;
/// Sorted merge of partial aggregates
pub mod merge;
/// Pagination window normalization
pub mod pagination;

pub use address::{DecodeError, humanize_or_raw, script_to_address};
pub use chain::{
    Category, ChainFamily, ChainInfo, MAINNET_CHAIN_ID, Status, TESTNET_CHAIN_ID, TransferType,
    display_name, with_family_prefix,
};
pub use error::QueryError;
pub use merge::{keep_last, merge_many, merge_sorted};
pub use pagination::{DEFAULT_PAGE_SIZE, Page};
