use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::connection::{Connection, ConnectionId};

/// The set of admitted, not-yet-closed connections.
///
/// Every membership change and every snapshot goes through one mutex, so a
/// snapshot can never observe half of an add/remove. The lock is only held
/// for map operations and the O(n) snapshot copy, never across a send.
///
/// Entries are keyed by connection id, which is handed out in handshake
/// order, so snapshots come back in a stable order.
#[derive(Default)]
pub struct ConnectionRegistry {
    live: Mutex<Live>,
    live_count: AtomicUsize,
    admitted_total: AtomicU64,
}

#[derive(Default)]
struct Live {
    conns: BTreeMap<ConnectionId, Arc<Connection>>,
    /// Set by `close_all`; nothing is admitted afterwards.
    sealed: bool,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `conn` and mark it Open.
    ///
    /// Returns false if the connection was already admitted or has been
    /// closed; a closed connection is never brought back. After `close_all`
    /// every add is refused and the connection is closed on the spot.
    pub fn add(&self, conn: Arc<Connection>) -> bool {
        let mut live = self.live.lock();
        if live.sealed {
            conn.close();
            tracing::info!(conn_id = conn.id(), "registry sealed; connection refused");
            return false;
        }
        if !conn.open() {
            tracing::warn!(conn_id = conn.id(), state = ?conn.state(), "refusing to register connection");
            return false;
        }
        live.conns.insert(conn.id(), conn);
        let now = live.conns.len();
        self.live_count.store(now, Ordering::Relaxed);
        self.admitted_total.fetch_add(1, Ordering::Relaxed);
        drop(live);

        tracing::info!(live = now, "client registered");
        true
    }

    /// Unregister and close `conn`. Idempotent: returns true only for the call
    /// that actually removed it. An absent connection is left untouched.
    pub fn remove(&self, conn: &Connection) -> bool {
        let mut live = self.live.lock();
        if live.conns.remove(&conn.id()).is_none() {
            return false;
        }
        conn.close();
        let now = live.conns.len();
        self.live_count.store(now, Ordering::Relaxed);
        drop(live);

        tracing::info!(conn_id = conn.id(), live = now, "client unregistered");
        true
    }

    /// Point-in-time copy of the live set, safe to iterate while the registry
    /// keeps changing.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.live.lock().conns.values().cloned().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.live.lock().conns.contains_key(&id)
    }

    /// Close and drop every connection, then refuse all later adds. Used when
    /// the gateway shuts down.
    pub fn close_all(&self) -> usize {
        let drained = {
            let mut live = self.live.lock();
            live.sealed = true;
            std::mem::take(&mut live.conns)
        };
        self.live_count.store(0, Ordering::Relaxed);
        for conn in drained.values() {
            conn.close();
        }
        drained.len()
    }

    /// Live connection count (lock-free read for diagnostics).
    pub fn len(&self) -> usize {
        self.live_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Connections admitted since startup, including ones already gone.
    pub fn admitted_total(&self) -> u64 {
        self.admitted_total.load(Ordering::Relaxed)
    }
}
