//! Prometheus metrics collection for gatehouse.
//!
//! - `gatehouse_decisions_total{outcome}` - `canCall` answers: immediate, delayed, denied
//! - `gatehouse_events_total{event}` - committed authority events by kind
//! - `gatehouse_calls_total{function}` - authority calls by function
//! - `gatehouse_call_duration_seconds{function}` - authority call latency
//! - `gatehouse_call_errors_total{function, error}` - failed authority calls

use crate::clock::Delay;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Permission decisions by outcome.
pub static DECISIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Committed events by kind.
pub static EVENTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Authority calls by function.
pub static CALLS: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed authority calls by function and error code.
pub static CALL_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Authority call latency by function.
pub static CALL_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Until this runs every recorder is a no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(DECISIONS, IntCounterVec::new(Opts::new("gatehouse_decisions_total", "canCall decisions by outcome"), &["outcome"]));
    register!(EVENTS, IntCounterVec::new(Opts::new("gatehouse_events_total", "Committed authority events by kind"), &["event"]));
    register!(CALLS, IntCounterVec::new(Opts::new("gatehouse_calls_total", "Authority calls by function"), &["function"]));
    register!(CALL_ERRORS, IntCounterVec::new(Opts::new("gatehouse_call_errors_total", "Failed authority calls"), &["function", "error"]));
    register!(CALL_LATENCY, HistogramVec::new(
        HistogramOpts::new("gatehouse_call_duration_seconds", "Authority call latency by function")
            .buckets(vec![0.000_01, 0.000_05, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["function"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

fn inc(metric: &OnceLock<IntCounterVec>, labels: &[&str]) {
    if let Some(c) = metric.get() {
        c.with_label_values(labels).inc();
    }
}

/// Record the outcome of one `canCall` evaluation.
#[inline]
pub fn record_decision((immediate, delay): (bool, Delay)) {
    let outcome = match (immediate, delay) {
        (true, _) => "immediate",
        (false, 0) => "denied",
        (false, _) => "delayed",
    };
    inc(&DECISIONS, &[outcome]);
}

#[inline]
pub fn record_event(event: &str) {
    inc(&EVENTS, &[event]);
}

/// Record an authority call with latency.
#[inline]
pub fn record_call(function: &str, duration_secs: f64) {
    inc(&CALLS, &[function]);
    if let Some(h) = CALL_LATENCY.get() {
        h.with_label_values(&[function]).observe(duration_secs);
    }
}

#[inline]
pub fn record_call_error(function: &str, error: &str) {
    inc(&CALL_ERRORS, &[function, error]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        record_call("canCall", 0.000_2);
        record_decision((false, 3_600));
        record_call_error("execute", "not_ready");

        let output = gather_metrics();
        assert!(output.contains("gatehouse_calls_total"));
        assert!(output.contains("outcome=\"delayed\""));
        assert!(output.contains("error=\"not_ready\""));
    }
}
