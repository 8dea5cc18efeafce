//! txnflow CLI — run the ingestion worker daemon.
//!
//! Usage:
//! ```bash
//! INFURA_API_KEY=... txnflow run
//! txnflow info
//! ```
//!
//! Configuration is taken from the environment:
//!
//! | Variable           | Default        | Meaning                          |
//! |--------------------|----------------|----------------------------------|
//! | `INFURA_API_KEY`   | (required)     | Infura project key for mainnet   |
//! | `DATABASE_PATH`    | `./txnflow.db` | SQLite database file             |
//! | `POLL_INTERVAL_MS` | `5000`         | Delay between polling ticks      |
//! | `BATCH_SIZE`       | `10`           | Max transactions per tick        |

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use txnflow_core::{ChainRegistry, TxStatus, WorkerConfig};
use txnflow_rpc::HttpChainClient;
use txnflow_storage::{SqliteStore, TransactionStore};
use txnflow_worker::IngestWorker;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => {
            if let Err(e) = cmd_run() {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        }
        "info" => cmd_info(),
        "version" | "--version" | "-V" => {
            println!("txnflow {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("txnflow {}", env!("CARGO_PKG_VERSION"));
    println!("Transaction ingestion pipeline — submit, poll, confirm\n");
    println!("USAGE:");
    println!("    txnflow <COMMAND>\n");
    println!("COMMANDS:");
    println!("    run      Start the ingestion worker daemon");
    println!("    info     Show TxnFlow configuration info");
    println!("    version  Print version");
    println!("    help     Print this help");
}

fn cmd_info() {
    println!("TxnFlow v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default poll interval: 5000 ms");
    println!("  Default batch size: 10 transactions/tick");
    println!("  Default RPC timeout: 10 s per call");
    println!("  Storage backends: memory, SQLite (feature: sqlite)");
    println!("  Chains: EVM (Ethereum Mainnet via Infura)");
}

// ─── run ──────────────────────────────────────────────────────────────────────

/// Environment-driven daemon configuration.
struct AppConfig {
    database_path: String,
    infura_api_key: String,
    worker: WorkerConfig,
}

impl AppConfig {
    fn from_env() -> Result<Self> {
        let infura_api_key = match env::var("INFURA_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => bail!("INFURA_API_KEY must be set"),
        };

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./txnflow.db".to_string());

        let mut worker = WorkerConfig::default();
        if let Ok(raw) = env::var("POLL_INTERVAL_MS") {
            worker.poll_interval_ms = raw
                .parse()
                .with_context(|| format!("invalid POLL_INTERVAL_MS: {raw}"))?;
        }
        if let Ok(raw) = env::var("BATCH_SIZE") {
            worker.batch_size = raw
                .parse()
                .with_context(|| format!("invalid BATCH_SIZE: {raw}"))?;
        }

        Ok(Self { database_path, infura_api_key, worker })
    }
}

fn cmd_run() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_daemon(config))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let store = Arc::new(SqliteStore::open(&config.database_path).await?);
    let registry = Arc::new(ChainRegistry::with_known_networks(&config.infura_api_key));
    let client = HttpChainClient::new(config.worker.rpc_timeout());

    info!(
        database = %config.database_path,
        chains = ?registry.supported_chains(),
        poll_interval_ms = config.worker.poll_interval_ms,
        batch_size = config.worker.batch_size,
        "starting ingestion worker"
    );
    log_status_counts(store.as_ref()).await?;

    let worker = IngestWorker::new(store.clone(), registry, client, config.worker);
    let stop = worker.stop_handle();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(worker.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");

    // Either channel stops the loop; the watch send covers the case where
    // the worker task has already dropped its stop receiver.
    stop.stop().await;
    let _ = shutdown_tx.send(true);
    handle.await.context("worker task panicked")?;

    log_status_counts(store.as_ref()).await?;
    info!("worker stopped");
    Ok(())
}

async fn log_status_counts(store: &dyn TransactionStore) -> Result<()> {
    let counts = store.status_counts().await?;
    let summary: Vec<String> = [
        TxStatus::Received,
        TxStatus::Fetching,
        TxStatus::Confirmed,
        TxStatus::Error,
    ]
    .iter()
    .map(|s| format!("{s}={}", counts.get(s).copied().unwrap_or(0)))
    .collect();
    info!(counts = %summary.join(" "), "pipeline status");
    Ok(())
}
