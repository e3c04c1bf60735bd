//! Tyre pressure warnings.
//!
//! The decision is the list of tyre indices whose aggregated pressure is
//! below target, ordered by ascending pressure; equal pressures keep tyre
//! order. Two independently written versions implement [`DecisionFunction`]
//! so they can be compared by the N-version reconciler.

use std::sync::Arc;

use redund_traits::DecisionFunction;

use crate::aggregate::Aggregator;
use crate::config::PressureParams;
use crate::events::{Event, EventSink, TracingSink};
use crate::stats::mean;

/// One evaluation: readings per tyre and the target pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureCase {
    pub units: Vec<Vec<f64>>,
    pub target: f64,
}

impl PressureCase {
    pub fn new(units: Vec<Vec<f64>>, target: f64) -> Self {
        Self { units, target }
    }
}

/// Indices of under-target units, sorted ascending by aggregated value.
/// Units without valid data are skipped, never flagged.
pub fn decide_pressure(
    units: &[Vec<f64>],
    target: f64,
    aggregator: &Aggregator,
    sink: &dyn EventSink,
) -> Vec<usize> {
    let mut low: Vec<(usize, f64)> = Vec::new();
    for (idx, readings) in units.iter().enumerate() {
        let Some(value) = aggregator.aggregate(readings, idx, sink).value() else {
            sink.record(Event::UnitSkipped { unit: idx });
            continue;
        };
        if value < target {
            low.push((idx, value));
        }
    }
    sort_by_value(low)
}

// sort_by is stable: equal values keep index order.
fn sort_by_value(mut low: Vec<(usize, f64)>) -> Vec<usize> {
    low.sort_by(|a, b| a.1.total_cmp(&b.1));
    low.into_iter().map(|(idx, _)| idx).collect()
}

/// Fault-tolerant version: window screen, outlier filter, robust mean.
pub struct ScreenedPressure {
    aggregator: Aggregator,
    sink: Arc<dyn EventSink>,
}

impl ScreenedPressure {
    pub fn new(params: &PressureParams) -> Self {
        Self::with_sink(params, Arc::new(TracingSink))
    }

    pub fn with_sink(params: &PressureParams, sink: Arc<dyn EventSink>) -> Self {
        Self {
            aggregator: params.aggregator(),
            sink,
        }
    }

    pub fn evaluate(&self, case: &PressureCase) -> Vec<usize> {
        decide_pressure(&case.units, case.target, &self.aggregator, self.sink.as_ref())
    }
}

impl DecisionFunction<PressureCase> for ScreenedPressure {
    type Output = Vec<usize>;

    fn name(&self) -> &str {
        "screened"
    }

    fn decide(
        &self,
        input: &PressureCase,
    ) -> Result<Vec<usize>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.evaluate(input))
    }
}

/// Independent second version: zero PSI marks a dead sensor, everything else
/// is averaged as-is. No filtering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonZeroMeanPressure;

impl NonZeroMeanPressure {
    pub fn evaluate(&self, case: &PressureCase) -> Vec<usize> {
        let mut low = Vec::new();
        for (idx, readings) in case.units.iter().enumerate() {
            let live: Vec<f64> = readings.iter().copied().filter(|&p| p != 0.0).collect();
            if let Some(avg) = mean(&live)
                && avg < case.target
            {
                low.push((idx, avg));
            }
        }
        sort_by_value(low)
    }
}

impl DecisionFunction<PressureCase> for NonZeroMeanPressure {
    type Output = Vec<usize>;

    fn name(&self) -> &str {
        "non-zero-mean"
    }

    fn decide(
        &self,
        input: &PressureCase,
    ) -> Result<Vec<usize>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.evaluate(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    #[test]
    fn equal_values_keep_index_order() {
        let order = sort_by_value(vec![(3, 5.0), (1, 2.0), (0, 5.0), (2, 2.0)]);
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn skipped_units_are_reported() {
        let sink = MemorySink::new();
        let agg = PressureParams::default().aggregator();
        let units = [vec![0.0, -2.0, 200.0], vec![15.0, 15.0], vec![8.0, 9.0]];
        let out = decide_pressure(&units, 10.0, &agg, &sink);
        assert_eq!(out, vec![2]);
        assert!(sink.events().contains(&Event::UnitSkipped { unit: 0 }));
    }

    #[test]
    fn non_zero_mean_keeps_negative_readings() {
        // The second version only drops exact zeros.
        let case = PressureCase::new(vec![vec![0.0, -2.0, 200.0], vec![8.0, 9.0]], 10.0);
        assert_eq!(NonZeroMeanPressure.evaluate(&case), vec![1]);
    }
}
