use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use serde_json::{Map, Value};
use tokio::time::Duration;

use authnotify_core::Notification;

use crate::obs::metrics::GatewayMetrics;
use crate::realtime::core::ConnectionRegistry;
use crate::realtime::types::{PreparedMsg, PublishReport};

/// Fan-out engine: one event to every live connection.
///
/// Each publish works on its own registry snapshot, so any number of
/// publishes may run concurrently with each other and with handshakes.
pub struct BroadcastEngine {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
    metrics: Arc<GatewayMetrics>,
}

impl BroadcastEngine {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        send_timeout: Duration,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            send_timeout,
            metrics,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Deliver `event` to every connection live at call start.
    ///
    /// Sends start in snapshot order and run concurrently, each bounded by the
    /// send timeout. A connection whose send fails is removed from the
    /// registry as soon as the failure is seen; the others are unaffected.
    /// Never fails: the report says what happened.
    pub async fn publish(&self, event: &Notification) -> PublishReport {
        let started = Instant::now();
        self.metrics.publishes.inc();

        let prepared = match PreparedMsg::prepare(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(kind = event.kind(), error = %e, "failed to encode notification");
                return PublishReport::default();
            }
        };

        let snapshot = self.registry.snapshot();
        let mut report = PublishReport {
            recipients: snapshot.len(),
            ..PublishReport::default()
        };
        if snapshot.is_empty() {
            tracing::debug!(kind = event.kind(), "no connected clients to notify");
            return report;
        }

        tracing::debug!(
            kind = event.kind(),
            bytes = prepared.as_str().len(),
            recipients = report.recipients,
            "fanning out notification"
        );
        let limit = self.send_timeout;
        let mut sends = FuturesUnordered::new();
        for conn in snapshot {
            let msg = prepared.to_ws_message();
            sends.push(async move {
                let res = conn.deliver(msg, limit).await;
                (conn, res)
            });
        }

        while let Some((conn, res)) = sends.next().await {
            match res {
                Ok(()) => {
                    report.delivered += 1;
                    self.metrics.deliveries.inc("delivered");
                }
                Err(failure) => {
                    self.metrics.deliveries.inc(failure.as_str());
                    if self.registry.remove(&conn) {
                        report.pruned += 1;
                    }
                    tracing::warn!(
                        conn_id = conn.id(),
                        subject = conn.subject(),
                        failure = failure.as_str(),
                        "delivery failed; connection pruned"
                    );
                }
            }
        }

        self.metrics.publish_duration.observe(started.elapsed());
        tracing::info!(
            kind = event.kind(),
            recipients = report.recipients,
            delivered = report.delivered,
            pruned = report.pruned,
            "notification broadcast"
        );
        report
    }

    /// Build and publish an event from its parts.
    pub async fn publish_parts(
        &self,
        kind: &str,
        message: &str,
        data: Map<String, Value>,
    ) -> PublishReport {
        self.publish(&Notification::new(kind, message).with_data(data)).await
    }

    /// Announce a newly registered account. Best effort: the registration
    /// workflow calls this after its own work is done and ignores the result.
    pub async fn notify_new_user(&self, email: &str) -> PublishReport {
        self.publish(&Notification::new_user(email)).await
    }
}
