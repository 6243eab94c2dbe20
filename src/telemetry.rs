//! Telemetry utilities for call timing and tracing spans.

use std::time::Instant;

/// Guard for timing an authority call and recording metrics.
///
/// Records call latency when dropped.
pub struct CallTimer {
    function: &'static str,
    start: Instant,
}

impl CallTimer {
    /// Start timing a call.
    pub fn new(function: &'static str) -> Self {
        Self {
            function,
            start: Instant::now(),
        }
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_call(self.function, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{info_span, Span};

    /// Span for one operator console request.
    pub fn request(op: &str, seq: u64) -> Span {
        info_span!("request", op = %op, seq)
    }

    /// Span for applying genesis configuration.
    pub fn genesis(authority: &str) -> Span {
        info_span!("genesis", authority = %authority)
    }
}
