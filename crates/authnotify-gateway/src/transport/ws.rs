//! WebSocket upgrade handler and passive session loop.
//!
//! Responsibilities:
//! - Admit or refuse the client from its credential (pure, before upgrade)
//! - Refused clients: upgrade, send a 1008 close frame with the reason, done
//! - Admitted clients: register, then drain the outbound queue into the
//!   socket while watching the inbound side only for liveness
//! - Heartbeat ping + idle timeout
//! - Unregister exactly once when the loop ends, whoever ended it

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration, Instant, MissedTickBehavior};
use tracing::Instrument;

use authnotify_core::auth::CredentialError;

use crate::app_state::AppState;
use crate::realtime::Connection;
use crate::transport::credential::{admit, extract_credential, WsQuery};

/// How long a refused peer gets to acknowledge our close frame.
const REJECT_LINGER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    PeerClosed,
    PeerGone,
    WriteFailed,
    /// Pruned by the broadcaster or closed at shutdown.
    ServerClosed,
    IdleTimeout,
}

impl SessionEnd {
    fn close_frame(self) -> Option<CloseFrame<'static>> {
        let reason = match self {
            SessionEnd::ServerClosed => "Connection closed by server",
            SessionEnd::IdleTimeout => "Idle timeout",
            _ => return None,
        };
        Some(CloseFrame {
            code: close_code::AWAY,
            reason: Cow::Borrowed(reason),
        })
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(
    State(app): State<AppState>,
    Query(q): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    let admission = admit(app.validator(), extract_credential(&q, &headers));

    let metrics = app.metrics();
    let ws = ws.on_failed_upgrade(move |e| {
        metrics.ws_upgrades.inc("failed");
        tracing::warn!(error = %e, "websocket upgrade failed");
    });

    match admission {
        Ok(subject) => ws.on_upgrade(move |socket| run_session(app, subject, socket)),
        Err(err) => {
            tracing::info!(reason = err.label(), "handshake rejected");
            let metrics = app.metrics();
            metrics.ws_upgrades.inc("rejected");
            metrics.handshake_rejections.inc(err.label());
            ws.on_upgrade(move |socket| reject(socket, err))
        }
    }
}

async fn reject(mut socket: WebSocket, err: CredentialError) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: Cow::Borrowed(err.close_reason()),
    };
    if socket.send(Message::Close(Some(frame))).await.is_err() {
        return;
    }
    let _ = timeout(REJECT_LINGER, async {
        while let Some(Ok(msg)) = socket.recv().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    })
    .await;
}

async fn run_session(app: AppState, subject: String, socket: WebSocket) {
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().gateway.outbound_queue);
    let conn = Arc::new(Connection::new(subject, out_tx));
    let span = tracing::info_span!("session", conn_id = conn.id(), subject = %conn.subject());
    drive_session(app, conn, out_rx, socket).instrument(span).await;
}

// --------------------
// Core session loop
// --------------------
async fn drive_session(
    app: AppState,
    conn: Arc<Connection>,
    mut out_rx: mpsc::Receiver<Message>,
    socket: WebSocket,
) {
    let registry = app.registry();
    let metrics = app.metrics();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let write_limit = Duration::from_millis(app.cfg().broadcast.send_timeout_ms);

    if !registry.add(Arc::clone(&conn)) {
        // Drain sealed the registry between admission and registration.
        let _ = timeout(
            write_limit,
            ws_tx.send(Message::Close(SessionEnd::ServerClosed.close_frame())),
        )
        .await;
        return;
    }
    metrics.ws_upgrades.inc("accepted");
    metrics.sessions_active.inc();

    let gw = &app.cfg().gateway;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    let end = loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(msg) = maybe_out else { break SessionEnd::ServerClosed };
                match timeout(write_limit, ws_tx.send(msg)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(error = %e, "socket write failed");
                        break SessionEnd::WriteFailed;
                    }
                    Err(_) => {
                        tracing::debug!("socket write timed out");
                        break SessionEnd::WriteFailed;
                    }
                }
            }

            // inbound: liveness only, content is discarded
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) => break SessionEnd::PeerClosed,
                    Some(Ok(_)) => last_activity = Instant::now(),
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "socket read failed");
                        break SessionEnd::PeerGone;
                    }
                    None => break SessionEnd::PeerGone,
                }
            }

            // pruned by a publish or closed at shutdown
            _ = conn.closed() => break SessionEnd::ServerClosed,

            _ = ping_tick.tick() => {
                if last_activity.elapsed() >= idle_timeout {
                    break SessionEnd::IdleTimeout;
                }
                if timeout(write_limit, ws_tx.send(Message::Ping(Vec::new()))).await.map_or(true, |r| r.is_err()) {
                    break SessionEnd::WriteFailed;
                }
            }
        }
    };

    // This session's single removal; a no-op if a publish already pruned it.
    registry.remove(&conn);
    metrics.sessions_active.dec();

    if let Some(frame) = end.close_frame() {
        let _ = timeout(write_limit, ws_tx.send(Message::Close(Some(frame)))).await;
    }
    let connected_secs = (Utc::now() - conn.connected_at()).num_seconds();
    tracing::info!(end = ?end, connected_secs, remaining = registry.len(), "session closed");
}
