//! Prometheus metrics for a disbursement session.
//!
//! [`PaymentMetrics`] owns a dedicated [`Registry`] so that each session's
//! counters start at zero and can be encoded independently.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

pub struct PaymentMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Transfers handed to the gateway.
    pub transfers_attempted: IntCounter,
    /// Transfers the gateway completed.
    pub transfers_completed: IntCounter,
    /// Transfers the gateway reported as failed.
    pub transfers_failed: IntCounter,
    /// Payment requests resolved as no-ops.
    pub payments_skipped: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent awaiting the gateway, in seconds.
    pub gateway_latency_seconds: Histogram,
}

impl PaymentMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let transfers_attempted = register_int_counter_with_registry!(
            Opts::new(
                "qd_transfers_attempted_total",
                "Transfers handed to the payment gateway"
            ),
            registry
        )
        .expect("failed to register transfers_attempted counter");

        let transfers_completed = register_int_counter_with_registry!(
            Opts::new(
                "qd_transfers_completed_total",
                "Transfers completed by the payment gateway"
            ),
            registry
        )
        .expect("failed to register transfers_completed counter");

        let transfers_failed = register_int_counter_with_registry!(
            Opts::new(
                "qd_transfers_failed_total",
                "Transfers the payment gateway reported as failed"
            ),
            registry
        )
        .expect("failed to register transfers_failed counter");

        let payments_skipped = register_int_counter_with_registry!(
            Opts::new(
                "qd_payments_skipped_total",
                "Payment requests resolved without contacting the gateway"
            ),
            registry
        )
        .expect("failed to register payments_skipped counter");

        // 10 ms → ~80 s covers a confirmed on-chain transfer.
        let gateway_latency_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "qd_gateway_latency_seconds",
                "Time spent awaiting the payment gateway"
            )
            .buckets(prometheus::exponential_buckets(0.01, 2.0, 14).unwrap()),
            registry
        )
        .expect("failed to register gateway_latency_seconds histogram");

        Self {
            registry,
            transfers_attempted,
            transfers_completed,
            transfers_failed,
            payments_skipped,
            gateway_latency_seconds,
        }
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("failed to encode payment metrics: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for PaymentMetrics {
    fn default() -> Self {
        Self::new()
    }
}
