//! Per-connection frame loop.

use std::sync::Arc;
use std::time::Duration;

use gforge_core::Coordinator;
use gforge_protocol::{ErrorCode, Frame, OkReply, Reply};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serve one client: read newline-framed JSON documents, dispatch each to
/// the coordinator, write one reply document per command.
///
/// Reads carry a deadline so the loop re-checks the shutdown token even when
/// the client goes silent; a blocking decoder without one would wedge
/// shutdown. A deadline expiry keeps any partial line buffered; the next
/// read continues where it left off.
pub async fn handle_connection(
    stream: UnixStream,
    coordinator: Arc<Coordinator>,
    shutdown: CancellationToken,
    read_deadline: Duration,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(event = "daemon.connection.shutdown");
                break;
            }
            read = tokio::time::timeout(read_deadline, reader.read_line(&mut line)) => {
                match read {
                    // Idle deadline: loop around and re-check shutdown.
                    Err(_elapsed) => continue,
                    Ok(Ok(0)) => {
                        debug!(event = "daemon.connection.closed");
                        break;
                    }
                    Ok(Ok(_)) => {
                        let frame = line.trim().to_string();
                        line.clear();
                        if frame.is_empty() {
                            continue;
                        }
                        let reply = dispatch(&coordinator, &frame).await;
                        let mut encoded = match serde_json::to_string(&reply) {
                            Ok(encoded) => encoded,
                            Err(e) => {
                                warn!(event = "daemon.connection.encode_failed", error = %e);
                                r#"{"error":"substrate_failure","message":"reply encoding failed"}"#
                                    .to_string()
                            }
                        };
                        encoded.push('\n');
                        if write_half.write_all(encoded.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                    Ok(Err(e)) => {
                        warn!(event = "daemon.connection.read_failed", error = %e);
                        break;
                    }
                }
            }
        }
    }
}

/// Parse and execute one inbound document.
async fn dispatch(coordinator: &Arc<Coordinator>, frame: &str) -> Reply {
    let parsed: Frame = match serde_json::from_str(frame) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Reply::error(ErrorCode::BadInput, format!("malformed frame: {}", e));
        }
    };

    match parsed {
        Frame::Event(event) => {
            // Voice-daemon direction: acknowledged, no policy attached.
            info!(event = "daemon.connection.status_event", status = %event.status);
            Reply::Ok(OkReply::empty())
        }
        Frame::Command(request) => {
            // Coordinator calls block on subprocesses; keep them off the
            // async workers.
            let coordinator = coordinator.clone();
            match tokio::task::spawn_blocking(move || crate::facade::apply(&coordinator, request))
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(event = "daemon.connection.dispatch_panicked", error = %e);
                    Reply::error(ErrorCode::SubstrateFailure, "command handler failed")
                }
            }
        }
    }
}
