//! Forwarder metrics
//!
//! Thin wrappers over the `metrics` facade so call sites stay one line. Nothing
//! is exported unless the host installs a recorder.

pub mod normalize {
    pub fn event_normalized() {
        ::metrics::counter!("sns_forwarder_events_normalized_total").increment(1);
    }

    pub fn timestamp_fallback() {
        ::metrics::counter!("sns_forwarder_timestamp_fallbacks_total").increment(1);
    }

    pub fn record_rejected() {
        ::metrics::counter!("sns_forwarder_records_rejected_total").increment(1);
    }
}

pub mod delivery {
    pub fn attempt() {
        ::metrics::counter!("sns_forwarder_delivery_attempts_total").increment(1);
    }

    /// `kind` is either "transport" or "http_status"
    pub fn attempt_failed(kind: &'static str) {
        ::metrics::counter!("sns_forwarder_delivery_attempt_failures_total", "kind" => kind)
            .increment(1);
    }

    pub fn batch_delivered(events: usize, attempts: u32) {
        ::metrics::counter!("sns_forwarder_batches_delivered_total").increment(1);
        ::metrics::histogram!("sns_forwarder_batch_events").record(events as f64);
        ::metrics::histogram!("sns_forwarder_delivery_attempts_per_batch").record(f64::from(attempts));
    }

    pub fn exhausted() {
        ::metrics::counter!("sns_forwarder_deliveries_exhausted_total").increment(1);
    }
}
