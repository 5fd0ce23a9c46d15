//! Reset-aware delta and rate computation for cumulative counters.
//!
//! FEC codeword counters only ever grow until the module or the device
//! restarts. Each observation is compared against the persisted last
//! value: a smaller current value means the counter restarted from
//! zero, so the current value itself is the best available delta for
//! the interval. State is overwritten on every observation, including
//! resets, so one reset never poisons the next cycle.

mod store;

pub use store::{JsonStateStore, MemoryStateStore, SharedStateStore, StateStore};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::record::{FieldValue, InterfaceCounterRecord};

/// Rate denominators below this are treated as instantaneous.
const MIN_INTERVAL_SEC: f64 = 1e-9;

/// Cumulative counter fields the batch helper differentiates.
const CUMULATIVE_COUNTERS: &[&str] = &["fec_ccw", "fec_nccw"];

/// Identity of one tracked counter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CounterKey {
    pub device: String,
    pub interface: String,
    pub counter: String,
}

/// Last observed value and collection timestamp for a counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub last_value: f64,
    pub last_timestamp_us: i64,
}

/// Result of one delta computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaOutcome {
    /// Increase over the interval; the raw value after a reset.
    pub delta: f64,
    /// Per-second rate; `None` when the interval is zero or negative.
    pub rate: Option<f64>,
    pub reset_detected: bool,
    /// Seconds since the previous observation, `None` on first sight.
    pub interval_sec: Option<f64>,
}

/// Delta engine over a pluggable state store.
pub struct DeltaEngine<S: StateStore> {
    store: S,
}

impl<S: StateStore> DeltaEngine<S> {
    pub fn new(store: S) -> Self {
        DeltaEngine { store }
    }

    /// Compute the delta for one observation and persist it as the new
    /// state.
    ///
    /// A store read failure degrades the key to a cold start; a store
    /// write failure keeps the computed outcome but the next cycle will
    /// cold-start again. Neither aborts the cycle.
    pub fn update(&mut self, key: &CounterKey, value: f64, timestamp_us: i64) -> DeltaOutcome {
        let previous = match self.store.get(key) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(target: "optel::delta", device = %key.device, interface = %key.interface,
                      counter = %key.counter, error = %e,
                      "state read failed, treating as first observation");
                None
            }
        };

        let outcome = match previous {
            None => DeltaOutcome {
                delta: 0.0,
                rate: Some(0.0),
                reset_detected: false,
                interval_sec: None,
            },
            Some(prev) => {
                let reset_detected = value < prev.last_value;
                if reset_detected {
                    info!(target: "optel::delta", device = %key.device,
                          interface = %key.interface, counter = %key.counter,
                          previous = prev.last_value, current = value,
                          "counter reset detected");
                }
                // After a reset the counter restarted from zero, so the
                // current value is the increase since then.
                let delta = if reset_detected {
                    value
                } else {
                    value - prev.last_value
                };
                let interval_sec = (timestamp_us - prev.last_timestamp_us) as f64 / 1_000_000.0;
                let rate = if interval_sec > 0.0 {
                    Some(delta / interval_sec.max(MIN_INTERVAL_SEC))
                } else {
                    None
                };
                DeltaOutcome {
                    delta,
                    rate,
                    reset_detected,
                    interval_sec: Some(interval_sec),
                }
            }
        };

        let state = CounterState {
            last_value: value,
            last_timestamp_us: timestamp_us,
        };
        if let Err(e) = self.store.put(key, state) {
            warn!(target: "optel::delta", device = %key.device, interface = %key.interface,
                  counter = %key.counter, error = %e, "state write failed");
        }

        outcome
    }

    /// Differentiate every cumulative counter field of a record set,
    /// attaching `*_delta`, `*_rate`, reset flags and the collection
    /// interval in place.
    pub fn apply_to_records(&mut self, records: &mut [InterfaceCounterRecord]) {
        for record in records {
            let mut interval = None;
            for counter in CUMULATIVE_COUNTERS {
                let Some(value) = record.fields.get(*counter).and_then(FieldValue::as_f64)
                else {
                    continue;
                };
                let key = CounterKey {
                    device: record.device.clone(),
                    interface: record.if_name.clone(),
                    counter: (*counter).to_string(),
                };
                let outcome = self.update(&key, value, record.timestamp_us);

                record
                    .fields
                    .insert(format!("{counter}_delta"), FieldValue::Float(outcome.delta));
                if let Some(rate) = outcome.rate {
                    record
                        .fields
                        .insert(format!("{counter}_rate"), FieldValue::Float(rate));
                }
                if outcome.reset_detected {
                    record
                        .fields
                        .insert(format!("{counter}_reset"), FieldValue::Int(1));
                }
                interval = interval.or(outcome.interval_sec);
            }
            if let Some(secs) = interval {
                record
                    .fields
                    .insert("collection_interval_sec".to_string(), FieldValue::Float(secs));
            }
        }
    }
}
