//! Draining a connection's outbox into the gateway's socket.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::ws::hub::Outbox;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("peer closed the connection")]
    Closed,
    #[error("write failed: {0}")]
    Write(String),
}

/// Anything that can carry serialized events to a client, typically a
/// websocket writer owned by the gateway.
#[async_trait]
pub trait EventSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), SinkError>;

    async fn close(&mut self);
}

/// Why `pump_outbox` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The hub let go of the connection and the outbox is drained.
    OutboxClosed,
    /// A write did not finish within the write timeout.
    WriteTimedOut,
    /// The sink reported an error.
    WriteFailed,
}

/// Forward events from `outbox` to `sink` until either side goes away.
///
/// Every write is bounded by `write_timeout`. When a write stalls or fails,
/// `on_stalled` runs (the caller uses it to unregister the connection from
/// the hub) and the sink is closed. The sink is closed as well when the
/// outbox ends.
pub async fn pump_outbox<S, F>(
    mut outbox: Outbox,
    mut sink: S,
    write_timeout: Duration,
    on_stalled: F,
) -> PumpExit
where
    S: EventSink,
    F: FnOnce(),
{
    let conn_id = outbox.id();

    let exit = loop {
        let Some(event) = outbox.recv().await else {
            break PumpExit::OutboxClosed;
        };

        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "[PUMP] failed to encode event, skipping");
                continue;
            }
        };

        match tokio::time::timeout(write_timeout, sink.send_text(text)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(conn_id = %conn_id, game_id = %event.game_id, error = %e, "[PUMP] write failed");
                break PumpExit::WriteFailed;
            }
            Err(_) => {
                warn!(
                    conn_id = %conn_id,
                    game_id = %event.game_id,
                    timeout_ms = write_timeout.as_millis() as u64,
                    "[PUMP] write timed out"
                );
                break PumpExit::WriteTimedOut;
            }
        }
    };

    if exit != PumpExit::OutboxClosed {
        on_stalled();
    }
    sink.close().await;
    debug!(conn_id = %conn_id, ?exit, "[PUMP] finished");
    exit
}
