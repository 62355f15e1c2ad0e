//! Gateway metrics registry.
//!
//! Counters keyed by a single static label value, a signed gauge, and a
//! fixed-bucket latency histogram in microseconds. Rendering sorts label
//! values so scrapes are stable.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter\n{name} {}", self.get());
    }
}

/// Counter partitioned by one label (`result`, `reason`, `outcome`...).
pub struct LabeledCounter {
    label: &'static str,
    by_value: DashMap<&'static str, AtomicU64>,
}

impl LabeledCounter {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            by_value: DashMap::new(),
        }
    }

    pub fn inc(&self, value: &'static str) {
        self.by_value
            .entry(value)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, value: &str) -> u64 {
        self.by_value
            .get(value)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        let mut rows: Vec<(&'static str, u64)> = self
            .by_value
            .iter()
            .map(|r| (*r.key(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_unstable();
        for (value, n) in rows {
            let _ = writeln!(out, "{name}{{{}=\"{value}\"}} {n}", self.label);
        }
    }
}

#[derive(Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge\n{name} {}", self.get());
    }
}

// 100us .. 5s; a publish that waits on a stalled peer lands near the send timeout.
const BOUNDS_MICROS: [u64; 8] = [100, 1_000, 10_000, 50_000, 250_000, 1_000_000, 2_500_000, 5_000_000];

#[derive(Default)]
pub struct LatencyHistogram {
    buckets: [AtomicU64; 8],
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl LatencyHistogram {
    pub fn observe(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        for (bucket, &bound) in self.buckets.iter().zip(BOUNDS_MICROS.iter()) {
            if micros <= bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for (bucket, bound) in self.buckets.iter().zip(BOUNDS_MICROS.iter()) {
            let _ = writeln!(out, "{name}_bucket{{le=\"{bound}\"}} {}", bucket.load(Ordering::Relaxed));
        }
        let count = self.count();
        let _ = writeln!(out, "{name}_bucket{{le=\"+Inf\"}} {count}");
        let _ = writeln!(out, "{name}_sum {}", self.sum_micros.load(Ordering::Relaxed));
        let _ = writeln!(out, "{name}_count {count}");
    }
}

pub struct GatewayMetrics {
    /// Upgrade attempts by `result` (accepted, rejected, failed).
    pub ws_upgrades: LabeledCounter,
    /// Admission refusals by credential error label.
    pub handshake_rejections: LabeledCounter,
    pub sessions_active: Gauge,
    pub publishes: Counter,
    /// Per-connection delivery outcomes (delivered, closed, timeout).
    pub deliveries: LabeledCounter,
    pub publish_duration: LatencyHistogram,
    draining: AtomicBool,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self {
            ws_upgrades: LabeledCounter::new("result"),
            handshake_rejections: LabeledCounter::new("reason"),
            sessions_active: Gauge::default(),
            publishes: Counter::default(),
            deliveries: LabeledCounter::new("outcome"),
            publish_duration: LatencyHistogram::default(),
            draining: AtomicBool::new(false),
        }
    }
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition of everything above plus caller-supplied
    /// gauges (registry sizes and the like).
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.ws_upgrades.render("authnotify_ws_upgrades_total", &mut out);
        self.handshake_rejections.render("authnotify_handshake_rejections_total", &mut out);
        self.sessions_active.render("authnotify_sessions_active", &mut out);
        self.publishes.render("authnotify_publishes_total", &mut out);
        self.deliveries.render("authnotify_deliveries_total", &mut out);
        self.publish_duration.render("authnotify_publish_duration_micros", &mut out);
        let _ = writeln!(
            out,
            "# TYPE authnotify_draining gauge\nauthnotify_draining {}",
            u8::from(self.is_draining())
        );
        for (name, v) in extra {
            let _ = writeln!(out, "# TYPE {name} gauge\n{name} {v}");
        }
        out
    }
}
