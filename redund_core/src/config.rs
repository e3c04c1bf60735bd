//! Runtime parameter types for the decision functions.
//!
//! These are the structs the core works with. They are separate from the
//! TOML-deserialized config in `redund_config`; see `conversions`.

use crate::aggregate::{Aggregator, MeanOver, ReadingWindow};
use crate::filter::OutlierPolicy;
use crate::reconcile::Reconciler;
use crate::validate::Bounds;
use crate::vote::TieBreakPolicy;

/// Tyre pressure aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureParams {
    pub window: ReadingWindow,
    pub outlier: OutlierPolicy,
    pub mean_over: MeanOver,
}

impl Default for PressureParams {
    fn default() -> Self {
        Self {
            window: ReadingWindow::PRESSURE_PSI,
            outlier: OutlierPolicy::LeaveOneOut { ratio: 0.5 },
            mean_over: MeanOver::Survivors,
        }
    }
}

impl PressureParams {
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.window, self.outlier, self.mean_over)
    }
}

/// Climate zone control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateParams {
    /// Every temperature reading must lie here or the case is rejected.
    pub temperature: Bounds,
    /// Input duties are validated against, and outputs clamped to, this range.
    pub duty: Bounds,
    /// Median-deviation filter threshold in °C.
    pub median_threshold: f64,
    /// Duty change when the zone's fans are all idle (mean duty 0).
    pub idle_boost: f64,
    /// Duty change otherwise.
    pub step: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            temperature: Bounds::TEMPERATURE_C,
            duty: Bounds::DUTY_PERCENT,
            median_threshold: 5.0,
            idle_boost: 20.0,
            step: 10.0,
        }
    }
}

impl ClimateParams {
    /// Temperatures are already validated, so the window only screens non-finite values.
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(
            ReadingWindow::UNBOUNDED,
            OutlierPolicy::MedianDeviation {
                threshold: self.median_threshold,
            },
            MeanOver::Survivors,
        )
    }
}

/// Replication and voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingCfg {
    pub replicas: usize,
    pub tie_break: TieBreakPolicy,
}

impl Default for VotingCfg {
    fn default() -> Self {
        Self {
            replicas: 3,
            tie_break: TieBreakPolicy::EarliestTied,
        }
    }
}

/// N-version comparator retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileCfg {
    pub max_attempts: u32,
}

impl Default for ReconcileCfg {
    fn default() -> Self {
        Self {
            max_attempts: Reconciler::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconcileCfg {
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.max_attempts)
    }
}
