//! Reduce one unit's readings to a single representative value.
//!
//! Pipeline: physical-window screen → outlier filter → mean. The mean is
//! taken over the filter survivors by default ([`MeanOver::Survivors`]);
//! [`MeanOver::Valid`] keeps the filter as a diagnostic and averages every
//! in-window reading instead. Both produce [`Aggregate::NoValidData`] when the
//! filter leaves nothing.

use crate::events::{Event, EventSink};
use crate::filter::{OutlierFilter, OutlierPolicy};
use crate::stats::mean;

/// Exclusive physical window; non-finite readings are always outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingWindow {
    pub min_exclusive: Option<f64>,
    pub max_exclusive: Option<f64>,
}

impl ReadingWindow {
    /// Tyre pressure sensors: 0 PSI means a dead sensor, 100+ PSI is nonsense.
    pub const PRESSURE_PSI: Self = Self {
        min_exclusive: Some(0.0),
        max_exclusive: Some(100.0),
    };
    /// Only screens non-finite values.
    pub const UNBOUNDED: Self = Self {
        min_exclusive: None,
        max_exclusive: None,
    };

    #[inline]
    pub fn admits(&self, value: f64) -> bool {
        value.is_finite()
            && self.min_exclusive.is_none_or(|lo| value > lo)
            && self.max_exclusive.is_none_or(|hi| value < hi)
    }
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self::PRESSURE_PSI
    }
}

/// Which reading set the representative mean is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeanOver {
    /// Readings that survived outlier filtering.
    #[default]
    Survivors,
    /// Every in-window reading; filtering only decides all-outlier units.
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// The unit had no readings at all.
    Empty,
    /// Every reading was outside the physical window.
    AllInvalid,
    /// The outlier filter rejected every valid reading.
    AllOutliers,
}

impl NoDataReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoDataReason::Empty => "empty",
            NoDataReason::AllInvalid => "all_invalid",
            NoDataReason::AllOutliers => "all_outliers",
        }
    }
}

/// Representative value of a unit, or an explicit "no valid data" marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    Value(f64),
    NoValidData(NoDataReason),
}

impl Aggregate {
    pub fn value(self) -> Option<f64> {
        match self {
            Aggregate::Value(v) => Some(v),
            Aggregate::NoValidData(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregator {
    window: ReadingWindow,
    filter: OutlierFilter,
    mean_over: MeanOver,
}

impl Aggregator {
    pub fn new(window: ReadingWindow, policy: OutlierPolicy, mean_over: MeanOver) -> Self {
        Self {
            window,
            filter: OutlierFilter::new(policy),
            mean_over,
        }
    }

    pub fn window(&self) -> ReadingWindow {
        self.window
    }

    pub fn filter(&self) -> &OutlierFilter {
        &self.filter
    }

    pub fn mean_over(&self) -> MeanOver {
        self.mean_over
    }

    pub fn aggregate(&self, readings: &[f64], unit: usize, sink: &dyn EventSink) -> Aggregate {
        if readings.is_empty() {
            return no_data(unit, NoDataReason::Empty, sink);
        }

        let mut valid = Vec::with_capacity(readings.len());
        for &value in readings {
            if self.window.admits(value) {
                valid.push(value);
            } else {
                sink.record(Event::InvalidReading { unit, value });
            }
        }
        if valid.is_empty() {
            return no_data(unit, NoDataReason::AllInvalid, sink);
        }

        let survivors = self.filter.filter(&valid, unit, sink);
        if survivors.is_empty() {
            sink.record(Event::AllOutliers { unit });
            return no_data(unit, NoDataReason::AllOutliers, sink);
        }

        let basis = match self.mean_over {
            MeanOver::Survivors => &survivors,
            MeanOver::Valid => &valid,
        };
        match mean(basis) {
            Some(v) => Aggregate::Value(v),
            None => no_data(unit, NoDataReason::Empty, sink),
        }
    }
}

fn no_data(unit: usize, reason: NoDataReason, sink: &dyn EventSink) -> Aggregate {
    sink.record(Event::NoValidData { unit, reason });
    Aggregate::NoValidData(reason)
}
