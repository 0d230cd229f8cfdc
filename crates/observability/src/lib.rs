use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Process-local planning counters. Every increment is mirrored to the
/// `metrics` facade so an installed exporter sees the same numbers.
#[derive(Debug, Default)]
pub struct AppMetrics {
    plans_total: AtomicU64,
    empty_results_total: AtomicU64,
    invalid_requests_total: AtomicU64,
    stops_selected_total: AtomicU64,
    timeouts_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub plans_total: u64,
    pub empty_results_total: u64,
    pub invalid_requests_total: u64,
    pub stops_selected_total: u64,
    pub timeouts_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_plan(&self) {
        self.plans_total.fetch_add(1, Ordering::Relaxed);
        counter!("guide_plans_total").increment(1);
    }

    pub fn inc_empty_result(&self) {
        self.empty_results_total.fetch_add(1, Ordering::Relaxed);
        counter!("guide_empty_results_total").increment(1);
    }

    pub fn inc_invalid_request(&self) {
        self.invalid_requests_total.fetch_add(1, Ordering::Relaxed);
        counter!("guide_invalid_requests_total").increment(1);
    }

    pub fn add_selected_stops(&self, stops: usize) {
        self.stops_selected_total
            .fetch_add(stops as u64, Ordering::Relaxed);
        counter!("guide_stops_selected_total").increment(stops as u64);
    }

    pub fn inc_timeout(&self) {
        self.timeouts_total.fetch_add(1, Ordering::Relaxed);
        counter!("guide_plan_timeouts_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let plans = self.plans_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            plans_total: plans,
            empty_results_total: self.empty_results_total.load(Ordering::Relaxed),
            invalid_requests_total: self.invalid_requests_total.load(Ordering::Relaxed),
            stops_selected_total: self.stops_selected_total.load(Ordering::Relaxed),
            timeouts_total: self.timeouts_total.load(Ordering::Relaxed),
            avg_latency_millis: if plans == 0 {
                0.0
            } else {
                latency as f64 / plans as f64 / 1000.0
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,guide_service=info,guide_catalog=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
