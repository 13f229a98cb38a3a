//! Shared state for API handlers

use clickhouse_lib::Datastores;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    stores: Datastores,
    settlement_chain: String,
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("settlement_chain", &self.settlement_chain)
            .finish_non_exhaustive()
    }
}

impl ApiState {
    /// Create a new [`ApiState`].
    pub const fn new(stores: Datastores, settlement_chain: String) -> Self {
        Self { stores, settlement_chain }
    }

    /// Relayer and indexer readers.
    pub const fn stores(&self) -> &Datastores {
        &self.stores
    }

    /// Chain identifier all categories are derived against.
    pub fn settlement_chain(&self) -> &str {
        &self.settlement_chain
    }
}
