//! Outlier filtering for one unit's readings.
//!
//! Two interchangeable policies:
//!
//! - **Leave-one-out ratio**: a reading is kept when it lies within
//!   `rest_mean * (1 ± ratio)`, `rest_mean` being the mean of all *other*
//!   readings. Needs at least three readings to judge; smaller sets pass
//!   through unchanged. May reject everything.
//! - **Median deviation**: a reading is kept when it lies within `±threshold`
//!   of the median of the set. Never returns an empty result for non-empty
//!   input: when nothing survives the median itself is returned.

use crate::events::{Event, EventSink};
use crate::stats::median;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierPolicy {
    LeaveOneOut { ratio: f64 },
    MedianDeviation { threshold: f64 },
}

impl OutlierPolicy {
    /// Below this many readings the leave-one-out policy keeps everything.
    pub const LEAVE_ONE_OUT_MIN_READINGS: usize = 3;
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        OutlierPolicy::LeaveOneOut { ratio: 0.5 }
    }
}

/// A rejected reading and the centre it was judged against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discarded {
    pub value: f64,
    pub reference: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOutcome {
    /// Surviving readings, input order preserved.
    pub kept: Vec<f64>,
    pub discarded: Vec<Discarded>,
    /// Set when `kept` holds only the median fallback.
    pub fallback: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutlierFilter {
    policy: OutlierPolicy,
}

impl OutlierFilter {
    pub fn new(policy: OutlierPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OutlierPolicy {
        self.policy
    }

    /// Pure classification of `readings`; reports nothing.
    pub fn partition(&self, readings: &[f64]) -> FilterOutcome {
        if readings.len() <= 1 {
            return FilterOutcome {
                kept: readings.to_vec(),
                ..FilterOutcome::default()
            };
        }
        match self.policy {
            OutlierPolicy::LeaveOneOut { ratio } => leave_one_out(readings, ratio),
            OutlierPolicy::MedianDeviation { threshold } => median_deviation(readings, threshold),
        }
    }

    /// Filter `readings` of `unit`, recording every discarded value.
    pub fn filter(&self, readings: &[f64], unit: usize, sink: &dyn EventSink) -> Vec<f64> {
        let outcome = self.partition(readings);
        for d in &outcome.discarded {
            sink.record(Event::OutlierDiscarded {
                unit,
                value: d.value,
                reference: d.reference,
            });
        }
        if let Some(median) = outcome.fallback {
            sink.record(Event::MedianFallback { unit, median });
        }
        outcome.kept
    }
}

fn leave_one_out(readings: &[f64], ratio: f64) -> FilterOutcome {
    let mut out = FilterOutcome::default();
    if readings.len() < OutlierPolicy::LEAVE_ONE_OUT_MIN_READINGS {
        out.kept = readings.to_vec();
        return out;
    }
    let sum: f64 = readings.iter().sum();
    let others = (readings.len() - 1) as f64;
    for &value in readings {
        let rest_mean = (sum - value) / others;
        let a = rest_mean * (1.0 - ratio);
        let b = rest_mean * (1.0 + ratio);
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        if (lower..=upper).contains(&value) {
            out.kept.push(value);
        } else {
            out.discarded.push(Discarded {
                value,
                reference: rest_mean,
            });
        }
    }
    out
}

fn median_deviation(readings: &[f64], threshold: f64) -> FilterOutcome {
    let mut out = FilterOutcome::default();
    let Some(med) = median(readings) else {
        return out;
    };
    for &value in readings {
        if (value - med).abs() <= threshold {
            out.kept.push(value);
        } else {
            out.discarded.push(Discarded {
                value,
                reference: med,
            });
        }
    }
    if out.kept.is_empty() {
        out.kept.push(med);
        out.fallback = Some(med);
    }
    out
}
