//! Structured diagnostics.
//!
//! Every component reports what it absorbed (invalid readings, outliers,
//! skipped units, vote disagreements, version mismatches) through an
//! [`EventSink`] instead of printing. The default sink forwards to `tracing`;
//! tests capture events with [`MemorySink`].

use std::sync::{Mutex, PoisonError};

use crate::aggregate::NoDataReason;

/// Where in a decision a vote was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The decision compared as one value.
    Whole,
    /// One fan of one zone.
    Cell { zone: usize, fan: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Reading outside the physical window; dropped before aggregation.
    InvalidReading { unit: usize, value: f64 },
    /// Reading rejected by the outlier filter.
    OutlierDiscarded {
        unit: usize,
        value: f64,
        reference: f64,
    },
    /// Median-deviation filter kept nothing and fell back to the median.
    MedianFallback { unit: usize, median: f64 },
    /// Valid readings existed but the filter rejected all of them.
    AllOutliers { unit: usize },
    NoValidData { unit: usize, reason: NoDataReason },
    /// Unit left out of a pressure decision.
    UnitSkipped { unit: usize },
    ReplicaFailed {
        replica: usize,
        name: String,
        message: String,
    },
    /// No single majority; the tie-break picked `chosen`.
    VoteTie {
        position: Position,
        tied: Vec<usize>,
        chosen: usize,
    },
    /// Majority found, but these replicas disagreed with it.
    VoteOutvoted {
        position: Position,
        dissenters: Vec<usize>,
    },
    VersionMismatch {
        attempt: u32,
        primary: String,
        secondary: String,
    },
    Reconciled { attempts: u32 },
}

impl Event {
    /// Stable snake_case name, used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::InvalidReading { .. } => "invalid_reading",
            Event::OutlierDiscarded { .. } => "outlier_discarded",
            Event::MedianFallback { .. } => "median_fallback",
            Event::AllOutliers { .. } => "all_outliers",
            Event::NoValidData { .. } => "no_valid_data",
            Event::UnitSkipped { .. } => "unit_skipped",
            Event::ReplicaFailed { .. } => "replica_failed",
            Event::VoteTie { .. } => "vote_tie",
            Event::VoteOutvoted { .. } => "vote_outvoted",
            Event::VersionMismatch { .. } => "version_mismatch",
            Event::Reconciled { .. } => "reconciled",
        }
    }
}

/// Single capability: record one event.
pub trait EventSink: Send + Sync {
    fn record(&self, event: Event);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: Event) {
        let kind = event.kind();
        match event {
            Event::InvalidReading { unit, value } => {
                tracing::warn!(kind, unit, value, "invalid reading ignored");
            }
            Event::OutlierDiscarded {
                unit,
                value,
                reference,
            } => {
                tracing::warn!(kind, unit, value, reference, "outlier ignored");
            }
            Event::MedianFallback { unit, median } => {
                tracing::debug!(kind, unit, median, "no reading near median; using median");
            }
            Event::AllOutliers { unit } => {
                tracing::warn!(kind, unit, "unit has only outlier readings");
            }
            Event::NoValidData { unit, reason } => {
                tracing::warn!(kind, unit, reason = reason.as_str(), "no valid data");
            }
            Event::UnitSkipped { unit } => {
                tracing::warn!(kind, unit, "unit skipped");
            }
            Event::ReplicaFailed {
                replica,
                name,
                message,
            } => {
                tracing::error!(kind, replica, name = %name, message = %message, "replica failed");
            }
            Event::VoteTie {
                position,
                tied,
                chosen,
            } => {
                tracing::warn!(
                    kind,
                    position = ?position,
                    tied = ?tied,
                    chosen,
                    "no majority; tie-break applied"
                );
            }
            Event::VoteOutvoted {
                position,
                dissenters,
            } => {
                tracing::info!(
                    kind,
                    position = ?position,
                    dissenters = ?dissenters,
                    "replicas outvoted"
                );
            }
            Event::VersionMismatch {
                attempt,
                primary,
                secondary,
            } => {
                tracing::warn!(
                    kind,
                    attempt,
                    primary = %primary,
                    secondary = %secondary,
                    "output mismatch"
                );
            }
            Event::Reconciled { attempts } => {
                tracing::debug!(kind, attempts, "versions agree");
            }
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: Event) {}
}

/// Keeps events in memory for inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events with the given [`Event::kind`].
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn record(&self, event: Event) {
        (**self).record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_counts_by_kind() {
        let sink = MemorySink::new();
        sink.record(Event::UnitSkipped { unit: 0 });
        sink.record(Event::UnitSkipped { unit: 2 });
        sink.record(Event::Reconciled { attempts: 1 });
        assert_eq!(sink.count("unit_skipped"), 2);
        assert_eq!(sink.count("reconciled"), 1);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.events().is_empty());
    }
}
