use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use crate::api::server::{AppState, RouteError};
use crate::db::PgError;
use crate::util::env::EnvErr;
use crate::util::telemetry;

mod api;
mod assistant;
mod constants;
mod db;
mod reporting;
mod scoring;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Env(#[from] EnvErr),

    #[error(transparent)]
    Db(#[from] PgError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Std(#[from] Box<dyn std::error::Error>),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    let env = util::env::env().await?;
    let telemetry_registry = telemetry::Telemetry::new(env)?.register();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting ecobin api");

    let pool = db::db_pool().await?;
    db::migrate(pool).await?;

    let state = Arc::new(AppState::new(pool, env));
    let (tx_server_ready, rx_server_ready) = tokio::sync::mpsc::unbounded_channel::<SocketAddr>();

    let handles = api::server::start_server(state, tx_server_ready, rx_server_ready).await?;
    _ = join_all(handles).await;

    pool.close().await;
    telemetry_registry.shutdown();
    Ok(())
}
