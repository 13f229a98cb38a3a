use eyre::{Result, WrapErr};
use tokio::try_join;

use crate::reader::ClickhouseReader;

/// Read-only connections to both event stores, built once at startup and
/// shared by every request.
#[derive(Clone, Debug)]
pub struct Datastores {
    /// Relayer store holding token-sent events seen by the relayer
    pub relayer: ClickhouseReader,
    /// Indexer store holding per-chain events, executions and block headers
    pub indexer: ClickhouseReader,
}

impl Datastores {
    /// Bundle the two readers.
    pub const fn new(relayer: ClickhouseReader, indexer: ClickhouseReader) -> Self {
        Self { relayer, indexer }
    }

    /// Check that both stores answer queries.
    pub async fn ping(&self) -> Result<()> {
        try_join!(
            async { self.relayer.ping().await.wrap_err("relayer store") },
            async { self.indexer.ping().await.wrap_err("indexer store") },
        )?;
        Ok(())
    }
}
