use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use fuzzctl_infra_broker::BrokerClient;
use fuzzctl_worker_lib::agent::Agent;
use fuzzctl_worker_lib::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    fuzzctl_shared_telemetry::init_tracing("worker");

    let worker_id = cli.resolved_worker_id();
    let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string());

    info!(worker_id = %worker_id, redis_host = %cli.redis_host, "starting worker agent");

    let broker = BrokerClient::connect(&cli.redis_url()).await?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let signal_flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("termination requested by host");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let agent = Arc::new(Agent::new(
        broker,
        worker_id,
        hostname,
        cli.fuzzer_binary.clone(),
        cli.threads,
        shutdown.clone(),
    ));

    agent.register().await?;
    agent.clone().run().await;
    agent.unregister().await;

    info!("worker agent shut down");
    Ok(())
}
