//! API server binary

use std::net::SocketAddr;

use api::ApiState;
use clap::Parser;
use clickhouse::{ClickhouseReader, Datastores};
use config::Opts;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let relayer = ClickhouseReader::new(
        opts.relayer.relayer_url,
        opts.relayer.relayer_db,
        opts.relayer.relayer_username,
        opts.relayer.relayer_password,
    )?;
    let indexer = ClickhouseReader::new(
        opts.indexer.indexer_url,
        opts.indexer.indexer_db,
        opts.indexer.indexer_username,
        opts.indexer.indexer_password,
    )?;

    let stores = Datastores::new(relayer, indexer);
    match stores.ping().await {
        Ok(()) => info!("Datastores reachable"),
        Err(e) => warn!(error = %e, "Datastores unreachable at startup, serving anyway"),
    }

    let state = ApiState::new(stores, opts.chain.settlement_chain_id);
    let addr: SocketAddr = format!("{}:{}", opts.api.host, opts.api.port).parse()?;
    server::run(addr, state, opts.api.allowed_origins).await
}
