//! Server entry point.
//!
//! Startup: config → logging → pipeline → HTTP listener. Any startup failure
//! exits the process. Shutdown on SIGINT/SIGTERM: stop generation, drain the
//! driver, then give the HTTP server a grace period to close.

use anyhow::Context;
use log::{error, info};

use clap::Parser;
use soft_rts::{
    Config, Pipeline,
    component_b::{
        router::{AppState, build_router},
        server::{bind_listener, shutdown_signal, spawn_server},
        sink::SinkHandle,
    },
    utils::metrics::PipelineStats,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        error!("fatal: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::parse();
    config.validate().context("rejecting startup configuration")?;
    info!("=== SOFT RTS START === {:?}", config);

    let listener = bind_listener(config.bind_addr()).context("acquiring HTTP listener")?;

    let stats = PipelineStats::shared();
    let (mut pipeline, labeled) = Pipeline::start(&config, stats.clone())?;

    let router = build_router(AppState {
        sink: SinkHandle::new(labeled),
        stats,
    });
    let server = spawn_server(listener, router)?;

    shutdown_signal().await;
    info!("Shutting down server...");

    pipeline.shutdown().await;
    server.shutdown(config.shutdown_grace()).await;

    info!("=== SOFT RTS STOPPED ===");
    Ok(())
}
