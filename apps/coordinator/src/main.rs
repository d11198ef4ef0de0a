use anyhow::Result;
use clap::Parser;
use tracing::info;

use fuzzctl_coordinator::api::CoordinatorApi;
use fuzzctl_coordinator::cli::Cli;
use fuzzctl_coordinator::routes::build_router;
use fuzzctl_coordinator::state::AppState;
use fuzzctl_coordinator::task_manager::run_result_loop;
use fuzzctl_infra_broker::BrokerClient;
use fuzzctl_infra_store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    fuzzctl_shared_telemetry::init_tracing("coordinator");

    info!(db_path = %cli.db_path, redis_host = %cli.redis_host, "starting coordinator");

    let store = Store::connect(&cli.db_path, cli.db_auth_token.clone()).await?;
    store.wordlists.seed_defaults().await?;

    let broker = BrokerClient::connect(&cli.redis_url()).await?;
    let state = AppState::new(store, broker);

    tokio::spawn(run_result_loop(state.clone()));
    tokio::spawn(fuzzctl_coordinator::worker_registry::run_sync_loop(state.clone()));

    let api = CoordinatorApi::new(state);
    let router = build_router(api);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    info!(port = cli.port, "coordinator listening");
    axum::serve(listener, router).await?;

    Ok(())
}
