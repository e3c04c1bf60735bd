//! `From` implementations bridging `redund_config` types to `redund_core` types.

use crate::aggregate::{MeanOver, ReadingWindow};
use crate::climate::ClimateCase;
use crate::config::{ClimateParams, PressureParams, ReconcileCfg, VotingCfg};
use crate::error::RedundError;
use crate::filter::OutlierPolicy;
use crate::pressure::PressureCase;
use crate::validate::Bounds;
use crate::vote::TieBreakPolicy;

// ── PressureParams ───────────────────────────────────────────────────────────

impl From<&redund_config::PressureCfg> for PressureParams {
    fn from(c: &redund_config::PressureCfg) -> Self {
        let outlier = match c.outlier {
            redund_config::OutlierKind::LeaveOneOut => {
                OutlierPolicy::LeaveOneOut { ratio: c.ratio }
            }
            redund_config::OutlierKind::MedianDeviation => OutlierPolicy::MedianDeviation {
                threshold: c.threshold,
            },
        };
        Self {
            window: ReadingWindow {
                min_exclusive: Some(c.min_psi),
                max_exclusive: Some(c.max_psi),
            },
            outlier,
            mean_over: c.mean_over.into(),
        }
    }
}

impl From<redund_config::MeanOverCfg> for MeanOver {
    fn from(c: redund_config::MeanOverCfg) -> Self {
        match c {
            redund_config::MeanOverCfg::Survivors => MeanOver::Survivors,
            redund_config::MeanOverCfg::Valid => MeanOver::Valid,
        }
    }
}

// ── ClimateParams ────────────────────────────────────────────────────────────

impl From<&redund_config::ClimateCfg> for ClimateParams {
    fn from(c: &redund_config::ClimateCfg) -> Self {
        Self {
            temperature: Bounds::new(c.temp_min, c.temp_max),
            duty: Bounds::new(c.duty_min, c.duty_max),
            median_threshold: c.median_threshold,
            idle_boost: c.idle_boost,
            step: c.step,
        }
    }
}

// ── VotingCfg ────────────────────────────────────────────────────────────────

impl From<redund_config::TieBreakCfg> for TieBreakPolicy {
    fn from(c: redund_config::TieBreakCfg) -> Self {
        match c {
            redund_config::TieBreakCfg::FirstReplica => TieBreakPolicy::FirstReplica,
            redund_config::TieBreakCfg::EarliestTied => TieBreakPolicy::EarliestTied,
        }
    }
}

impl From<&redund_config::VotingCfg> for VotingCfg {
    fn from(c: &redund_config::VotingCfg) -> Self {
        Self {
            replicas: c.replicas,
            tie_break: c.tie_break.into(),
        }
    }
}

// ── ReconcileCfg ─────────────────────────────────────────────────────────────

impl From<&redund_config::ReconcileCfg> for ReconcileCfg {
    fn from(c: &redund_config::ReconcileCfg) -> Self {
        Self {
            max_attempts: c.max_attempts,
        }
    }
}

// ── Cases ────────────────────────────────────────────────────────────────────

impl From<&redund_config::PressureCaseCfg> for PressureCase {
    fn from(c: &redund_config::PressureCaseCfg) -> Self {
        Self::new(c.units.clone(), c.target)
    }
}

impl TryFrom<&redund_config::ClimateCaseCfg> for ClimateCase {
    type Error = RedundError;

    fn try_from(c: &redund_config::ClimateCaseCfg) -> Result<Self, Self::Error> {
        Self::from_parts(c.desired, c.error, c.temps.clone(), c.fans.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sections_match_runtime_defaults() {
        let cfg = redund_config::Config::default();
        assert_eq!(PressureParams::from(&cfg.pressure), PressureParams::default());
        assert_eq!(ClimateParams::from(&cfg.climate), ClimateParams::default());
        assert_eq!(VotingCfg::from(&cfg.voting), VotingCfg::default());
        assert_eq!(ReconcileCfg::from(&cfg.reconcile), ReconcileCfg::default());
    }

    #[test]
    fn climate_case_shape_checked() {
        let c = redund_config::ClimateCaseCfg {
            desired: 25.0,
            error: 3.0,
            temps: vec![vec![20.0], vec![18.0]],
            fans: vec![vec![10.0, 10.0]],
            expected: None,
        };
        assert!(matches!(
            ClimateCase::try_from(&c),
            Err(RedundError::ShapeMismatch { .. })
        ));
    }
}
