//! Unix-socket ingest feeding a single dispatcher task.
//!
//! Any number of socket connections decode NDJSON event records and push them
//! onto one bounded flume channel. Exactly one task owns the monitor and
//! drains that channel, so events are applied one at a time in arrival order.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

use crate::codec;
use crate::engine::{MarkingPositionMonitor, PositionUpdate};
use crate::event::EventRecord;

/// Listen on a Unix socket and forward decoded records.
pub async fn listen(socket_path: String, tx: flume::Sender<EventRecord>) -> anyhow::Result<()> {
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;
    tracing::info!("IPC listener: {}", socket_path);
    loop {
        let (stream, _) = listener.accept().await?;
        let tx = tx.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stream);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                match codec::decode_record(&line) {
                    Ok(record) => {
                        if tx.send_async(record).await.is_err() {
                            // dispatcher gone
                            return;
                        }
                    }
                    Err(e) => tracing::warn!("Dropping undecodable event: {}", e),
                }
            }
        });
    }
}

/// Own the monitor and apply records until every sender is dropped.
///
/// Each successful update is forwarded on `updates` when given; failed events
/// are logged and skipped, the monitor stays usable.
pub async fn run_dispatcher(
    mut monitor: MarkingPositionMonitor,
    rx: flume::Receiver<EventRecord>,
    updates: Option<flume::Sender<PositionUpdate>>,
) -> MarkingPositionMonitor {
    while let Ok(record) = rx.recv_async().await {
        match monitor.process_update(record) {
            Ok(update) => {
                tracing::info!(
                    "{} {} {} -> {}",
                    update.kind,
                    update.order_id,
                    update.symbol,
                    update.position
                );
                if let Some(tx) = &updates {
                    let _ = tx.send_async(update).await;
                }
            }
            Err(e) => tracing::warn!("Event rejected: {}", e),
        }
    }
    tracing::info!(
        "Dispatcher stopped after {} orders, {} cancels pending",
        monitor.order_count(),
        monitor.pending_cancels()
    );
    monitor
}
