//! Prometheus metrics for the agent registry.
//!
//! All metrics follow the naming convention: `ar_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., agents_created_total)
//! - **Histogram**: Distribution of values (e.g., operation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Registry operations by name and outcome
    pub static ref OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("ar_registry_operations_total", "Registry operations by outcome"),
        &["operation", "outcome"]  // outcome: committed / rejected
    ).expect("metric creation failed");

    /// Rejections by error kind
    pub static ref REJECTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("ar_registry_rejections_total", "Rejected operations by error kind"),
        &["kind"]
    ).expect("metric creation failed");

    /// Total agents created
    pub static ref AGENTS_CREATED: IntCounter = IntCounter::new(
        "ar_registry_agents_created_total",
        "Total number of agent identities allocated"
    ).expect("metric creation failed");

    /// Value credited by deposits, in smallest units
    pub static ref VALUE_DEPOSITED: Counter = Counter::new(
        "ar_ledger_value_deposited_total",
        "Value credited to agent balances"
    ).expect("metric creation failed");

    /// Value paid out by withdrawals, in smallest units
    pub static ref VALUE_WITHDRAWN: Counter = Counter::new(
        "ar_ledger_value_withdrawn_total",
        "Value paid out of agent balances"
    ).expect("metric creation failed");

    /// Payouts that failed and were rolled back
    pub static ref PAYOUT_FAILURES: IntCounter = IntCounter::new(
        "ar_ledger_payout_failures_total",
        "Withdrawals rolled back because the payout failed"
    ).expect("metric creation failed");

    /// Operation latency
    pub static ref OPERATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ar_registry_operation_duration_seconds",
            "Time spent inside registry operations"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid bucket layout"))
    ).expect("metric creation failed");
}

/// Handle for registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice is tolerated; the collectors are already present.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(OPERATIONS.clone()),
        Box::new(REJECTIONS.clone()),
        Box::new(AGENTS_CREATED.clone()),
        Box::new(VALUE_DEPOSITED.clone()),
        Box::new(VALUE_WITHDRAWN.clone()),
        Box::new(PAYOUT_FAILURES.clone()),
        Box::new(OPERATION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record the outcome of one registry operation.
pub fn record_operation(operation: &str, committed: bool) {
    let outcome = if committed { "committed" } else { "rejected" };
    OPERATIONS.with_label_values(&[operation, outcome]).inc();
}

/// Record a rejection by its stable error kind.
pub fn record_rejection(kind: &str) {
    REJECTIONS.with_label_values(&[kind]).inc();
}

/// Record value moved through the ledger.
///
/// Amounts are 256-bit on the ledger side; the counter is approximate above 2^53.
pub fn record_value_moved(deposit: bool, amount: f64) {
    if deposit {
        VALUE_DEPOSITED.inc_by(amount);
    } else {
        VALUE_WITHDRAWN.inc_by(amount);
    }
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
