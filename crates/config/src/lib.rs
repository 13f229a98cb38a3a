//! bridgescope configuration
use clap::Parser;
use url::Url;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://bridgescope.xyz,https://testnet.bridgescope.xyz";

/// Relayer datastore configuration options
#[derive(Debug, Clone, Parser)]
pub struct RelayerOpts {
    /// Relayer Clickhouse URL
    #[clap(long = "relayer-url", env = "RELAYER_CLICKHOUSE_URL")]
    pub relayer_url: Url,
    /// Relayer Clickhouse database
    #[clap(long = "relayer-db", env = "RELAYER_CLICKHOUSE_DB")]
    pub relayer_db: String,
    /// Relayer Clickhouse username
    #[clap(long = "relayer-username", env = "RELAYER_CLICKHOUSE_USERNAME")]
    pub relayer_username: String,
    /// Relayer Clickhouse password
    #[clap(long = "relayer-password", env = "RELAYER_CLICKHOUSE_PASSWORD")]
    pub relayer_password: String,
}

/// Indexer datastore configuration options
#[derive(Debug, Clone, Parser)]
pub struct IndexerOpts {
    /// Indexer Clickhouse URL
    #[clap(long = "indexer-url", env = "INDEXER_CLICKHOUSE_URL")]
    pub indexer_url: Url,
    /// Indexer Clickhouse database
    #[clap(long = "indexer-db", env = "INDEXER_CLICKHOUSE_DB")]
    pub indexer_db: String,
    /// Indexer Clickhouse username
    #[clap(long = "indexer-username", env = "INDEXER_CLICKHOUSE_USERNAME")]
    pub indexer_username: String,
    /// Indexer Clickhouse password
    #[clap(long = "indexer-password", env = "INDEXER_CLICKHOUSE_PASSWORD")]
    pub indexer_password: String,
}

/// Chain configuration options
#[derive(Debug, Clone, Parser)]
pub struct ChainOpts {
    /// Settlement chain identifier, e.g. `bitcoin|4`
    #[clap(long, env = "SETTLEMENT_CHAIN_ID")]
    pub settlement_chain_id: String,
}

/// API server configuration options
#[derive(Debug, Clone, Parser)]
pub struct ApiOpts {
    /// API server host
    #[clap(long = "api-host", env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// API server port
    #[clap(long = "api-port", env = "API_PORT", default_value = "3000")]
    pub port: u16,
    /// Comma separated origins allowed by CORS
    #[clap(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_ALLOWED_ORIGINS
    )]
    pub allowed_origins: Vec<String>,
}

/// CLI options for the bridgescope API server
#[derive(Debug, Clone, Parser)]
pub struct Opts {
    /// Relayer datastore configuration
    #[clap(flatten)]
    pub relayer: RelayerOpts,

    /// Indexer datastore configuration
    #[clap(flatten)]
    pub indexer: IndexerOpts,

    /// Chain configuration
    #[clap(flatten)]
    pub chain: ChainOpts,

    /// API server configuration
    #[clap(flatten)]
    pub api: ApiOpts,
}
