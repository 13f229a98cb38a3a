//! `ClickHouse` reader functionality for the explorer API
//! Handles read-only listing, lookup and analytics queries

mod client;
mod query;
mod stats;

#[cfg(test)]
mod tests;

pub use client::ClickhouseReader;
pub use query::{
    DEPOSIT_ORDER, EVENT_ORDER, SelectQuery, bridge_query, redeem_query, transfer_query,
};
pub use stats::{ChainSide, EventTable, Metric};
