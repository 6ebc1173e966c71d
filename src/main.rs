//! Marking position monitor CLI
//!
//! Usage:
//!   marking-monitor [--config <file>] replay [events.ndjson|-] [--json]
//!   marking-monitor [--config <file>] listen [socket]

use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use marking_monitor::codec;
use marking_monitor::core::AppConfig;
use marking_monitor::engine::MarkingPositionMonitor;
use marking_monitor::ipc;

#[derive(Parser)]
#[command(name = "marking-monitor")]
#[command(about = "Per-instrument marking positions from order-lifecycle events")]
struct Cli {
    /// TOML config file (defaults to ./monitor.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an NDJSON event file and print the position after each event
    Replay {
        /// Event file, or `-` for stdin
        #[arg(default_value = "-")]
        source: String,
        /// Print each update as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Accept NDJSON events over a Unix socket
    Listen {
        /// Socket path (overrides `ingest.socket_path`)
        socket: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay { source, json } => replay(&config, &source, json),
        Commands::Listen { socket } => {
            let socket = socket.unwrap_or_else(|| config.ingest.socket_path.clone());
            listen(&config, socket)
        }
    }
}

/// Apply every event in an NDJSON file (or stdin) and print the position
/// after each one.
fn replay(config: &AppConfig, source: &str, json: bool) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if source == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        Box::new(BufReader::new(std::fs::File::open(source)?))
    };

    let mut monitor = MarkingPositionMonitor::with_config(config.monitor);
    let mut rejected = 0usize;

    for (line_no, record) in codec::decode_stream(reader) {
        let result = record.and_then(|r| monitor.process_update(r));
        match result {
            Ok(update) if json => println!("{}", serde_json::to_string(&update)?),
            Ok(update) => println!(
                "{:>6} {:<13} {:<10} {:<8} {}",
                line_no, update.kind, update.order_id, update.symbol, update.position
            ),
            Err(e) => {
                rejected += 1;
                tracing::warn!("line {}: {}", line_no, e);
            }
        }
    }

    println!("--");
    for (symbol, position) in monitor.positions() {
        println!("{:<8} {}", symbol, position);
    }
    tracing::info!(
        "Replayed {} orders, {} events rejected, {} cancels pending",
        monitor.order_count(),
        rejected,
        monitor.pending_cancels()
    );
    Ok(())
}

fn listen(config: &AppConfig, socket: String) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (tx, rx) = flume::bounded(config.ingest.channel_capacity);
        let dispatcher = tokio::spawn(ipc::run_dispatcher(
            MarkingPositionMonitor::with_config(config.monitor),
            rx,
            None,
        ));

        tracing::info!("Marking position monitor listening on {}", socket);
        tokio::select! {
            res = ipc::listen(socket, tx) => res?,
            _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down..."),
        }

        // open connections still hold senders; don't wait on them forever
        match tokio::time::timeout(Duration::from_secs(1), dispatcher).await {
            Ok(monitor) => {
                for (symbol, position) in monitor?.positions() {
                    tracing::info!("{} {}", symbol, position);
                }
            }
            Err(_) => tracing::warn!("Dispatcher still draining, exiting without summary"),
        }
        Ok::<(), anyhow::Error>(())
    })
}
