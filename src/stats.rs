//! Call counters for an [`crate::Engine`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters, updated while the engine lock is held.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    setup_calls: AtomicU64,
    native_parses: AtomicU64,
    responses_destroyed: AtomicU64,
    null_responses: AtomicU64,
    rejected_inputs: AtomicU64,
    native_time_us: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_setup(&self) {
        self.setup_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_native_parse(&self, duration: Duration) {
        self.native_parses.fetch_add(1, Ordering::Relaxed);
        self.native_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_destroy(&self) {
        self.responses_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_null_response(&self) {
        self.null_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_input(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EngineStats {
        EngineStats {
            setup_calls: self.setup_calls.load(Ordering::Relaxed),
            native_parses: self.native_parses.load(Ordering::Relaxed),
            responses_destroyed: self.responses_destroyed.load(Ordering::Relaxed),
            null_responses: self.null_responses.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            native_time: Duration::from_micros(self.native_time_us.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time view of an engine's activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Number of native setup attempts (0 or 1)
    pub setup_calls: u64,
    /// Calls into `libpostal_parse_address`
    pub native_parses: u64,
    /// Calls into `libpostal_address_parser_response_destroy`
    pub responses_destroyed: u64,
    /// Native parses that returned null
    pub null_responses: u64,
    /// Addresses rejected before reaching the native library
    pub rejected_inputs: u64,
    /// Time spent inside `libpostal_parse_address`
    pub native_time: Duration,
}

impl EngineStats {
    /// Average time per native parse.
    pub fn average_parse_time(&self) -> Duration {
        if self.native_parses == 0 {
            return Duration::ZERO;
        }
        self.native_time / self.native_parses as u32
    }

    /// Responses handed out by the native library and not yet destroyed.
    pub fn outstanding_responses(&self) -> u64 {
        self.native_parses
            .saturating_sub(self.null_responses)
            .saturating_sub(self.responses_destroyed)
    }
}
