//! Prometheus metrics for the proxy keeper.
//!
//! All metrics follow the naming convention: `ibc_proxy_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry of the proxy workspace
    pub static ref REGISTRY: Registry = Registry::new();

    /// Single-hop verifications against a local client
    pub static ref VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("ibc_proxy_verifications_total", "Single-hop verifications by fact kind"),
        &["kind", "outcome"]  // outcome: success/failure
    ).expect("metric creation failed");

    /// Verifications answered by a multi-hop client
    pub static ref MULTIHOP_VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("ibc_proxy_multihop_verifications_total", "Multi-hop proof verifications"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Facts written to the proxy commitment store
    pub static ref COMMITMENTS_WRITTEN: CounterVec = CounterVec::new(
        Opts::new("ibc_proxy_commitments_written_total", "Commitments written by fact kind"),
        &["kind"]
    ).expect("metric creation failed");

    /// Bootstrap requests by outcome
    pub static ref BOOTSTRAP_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("ibc_proxy_bootstrap_requests_total", "Proxy bootstrap requests"),
        &["outcome"]  // outcome: requested/served/refused/fulfilled/failed
    ).expect("metric creation failed");

    /// Proxied handshake steps completed
    pub static ref HANDSHAKE_STEPS: CounterVec = CounterVec::new(
        Opts::new("ibc_proxy_handshake_steps_total", "Proxied handshake steps completed"),
        &["step"]
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`]. Registering twice is a no-op.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(VERIFICATIONS.clone()),
        Box::new(MULTIHOP_VERIFICATIONS.clone()),
        Box::new(COMMITMENTS_WRITTEN.clone()),
        Box::new(BOOTSTRAP_REQUESTS.clone()),
        Box::new(HANDSHAKE_STEPS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
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

/// Record one single-hop verification.
pub fn record_verification(kind: &str, success: bool) {
    VERIFICATIONS
        .with_label_values(&[kind, outcome(success)])
        .inc();
}

/// Record one multi-hop verification.
pub fn record_multihop_verification(success: bool) {
    MULTIHOP_VERIFICATIONS
        .with_label_values(&[outcome(success)])
        .inc();
}

/// Record one commitment write.
pub fn record_commitment(kind: &str) {
    COMMITMENTS_WRITTEN.with_label_values(&[kind]).inc();
}

/// Record a bootstrap lifecycle event.
pub fn record_bootstrap(outcome: &str) {
    BOOTSTRAP_REQUESTS.with_label_values(&[outcome]).inc();
}

/// Record a completed handshake step.
pub fn record_handshake_step(step: &str) {
    HANDSHAKE_STEPS.with_label_values(&[step]).inc();
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
