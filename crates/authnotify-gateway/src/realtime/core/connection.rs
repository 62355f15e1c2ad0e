use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Notify};
use tokio::time::{timeout, Duration};

use crate::realtime::types::DeliveryFailure;

/// Per-process unique connection identity. Assigned once per handshake.
pub type ConnectionId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of an admitted session.
///
/// The pre-admission `Connecting` phase lives in the upgrade handler: a
/// `Connection` only exists once the credential has been accepted, so a
/// rejected peer never holds anything the registry could admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnState {
    Authenticated = 0,
    Open = 1,
    Closed = 2,
}

impl ConnState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnState::Authenticated,
            1 => ConnState::Open,
            _ => ConnState::Closed,
        }
    }
}

/// One admitted client session.
///
/// The transport handle is the sending half of the session's outbound queue;
/// the session task owns the socket and drains the queue into it.
pub struct Connection {
    id: ConnectionId,
    subject: String,
    connected_at: DateTime<Utc>,
    tx: mpsc::Sender<Message>,
    state: AtomicU8,
    closed: Notify,
}

impl Connection {
    pub fn new(subject: impl Into<String>, tx: mpsc::Sender<Message>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            subject: subject.into(),
            connected_at: Utc::now(),
            tx,
            state: AtomicU8::new(ConnState::Authenticated as u8),
            closed: Notify::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ConnState::Closed
    }

    /// `Authenticated -> Open`. Fails for any other starting state.
    pub(crate) fn open(&self) -> bool {
        self.state
            .compare_exchange(
                ConnState::Authenticated as u8,
                ConnState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to the terminal state and wake the session task.
    /// Returns true only for the call that performed the transition.
    pub(crate) fn close(&self) -> bool {
        let prev = self.state.swap(ConnState::Closed as u8, Ordering::AcqRel);
        if prev == ConnState::Closed as u8 {
            return false;
        }
        self.closed.notify_one();
        true
    }

    /// Resolves once the connection has been closed by anyone.
    pub async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        self.closed.notified().await;
    }

    /// Enqueue one frame for the session writer, waiting at most `limit`.
    pub async fn deliver(&self, msg: Message, limit: Duration) -> Result<(), DeliveryFailure> {
        if self.is_closed() {
            return Err(DeliveryFailure::Closed);
        }
        match timeout(limit, self.tx.send(msg)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(DeliveryFailure::Closed),
            Err(_) => Err(DeliveryFailure::Timeout),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("subject", &self.subject)
            .field("connected_at", &self.connected_at)
            .field("state", &self.state())
            .finish()
    }
}
