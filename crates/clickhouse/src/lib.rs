//! `ClickHouse` access to the relayer and indexer event stores

pub mod models;
pub mod reader;
pub mod store;
pub mod time_bucket;

pub use models::*;
pub use reader::*;
pub use store::Datastores;
pub use time_bucket::TimeBucket;
