use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metric name prefix for all job board metrics
const PREFIX: &str = "jobboard";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Remote snapshots applied to the local cache
    pub static ref SNAPSHOTS_APPLIED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_snapshots_applied_total"), "Remote snapshots applied to the local cache"),
        &["kind"]
    ).expect("Failed to create snapshots_applied_total metric");

    pub static ref REMOTE_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_remote_writes_total"), "Remote write operations by outcome"),
        &["operation", "status"]
    ).expect("Failed to create remote_writes_total metric");

    pub static ref STORAGE_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_storage_failures_total"), "Swallowed local storage failures"),
        &["operation"]
    ).expect("Failed to create storage_failures_total metric");

    pub static ref CROSS_TAB_EVENTS_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_cross_tab_events_total"),
        "Storage changes observed from other tabs"
    ).expect("Failed to create cross_tab_events_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(SNAPSHOTS_APPLIED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(REMOTE_WRITES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(STORAGE_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CROSS_TAB_EVENTS_TOTAL.clone()));

    tracing::debug!("Metrics system initialized successfully");
}

pub fn record_snapshot_applied(kind: &str) {
    SNAPSHOTS_APPLIED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_remote_write(operation: &str, success: bool) {
    let status = if success { "ok" } else { "error" };
    REMOTE_WRITES_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

pub fn record_storage_failure(operation: &str) {
    STORAGE_FAILURES_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_cross_tab_event() {
    CROSS_TAB_EVENTS_TOTAL.inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn render_metrics() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
