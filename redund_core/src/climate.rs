//! Zone-based climate control.
//!
//! Each zone has one or more temperature readings and one duty cycle per fan.
//! The zone temperature is the median-filtered mean of its readings. Inside
//! `[desired - error, desired + error]` duties are left alone; below the band
//! every fan is pushed up, above it every fan is pulled down. The step is
//! larger when the zone's fans are all idle.

use std::sync::Arc;

use redund_traits::DecisionFunction;

use crate::config::ClimateParams;
use crate::error::{Quantity, RedundError, Result};
use crate::events::{EventSink, TracingSink};
use crate::stats::mean;
use crate::validate::{Bounds, validate, validate_all};

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub temps: Vec<f64>,
    pub duties: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateCase {
    pub desired_temp: f64,
    pub error: f64,
    pub zones: Vec<Zone>,
}

impl ClimateCase {
    /// Pair per-zone temperature readings with per-zone fan duties.
    pub fn from_parts(
        desired_temp: f64,
        error: f64,
        temps: Vec<Vec<f64>>,
        fans: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if temps.len() != fans.len() {
            return Err(RedundError::shape(format!(
                "{} temperature zones but {} fan zones",
                temps.len(),
                fans.len()
            )));
        }
        let zones = temps
            .into_iter()
            .zip(fans)
            .map(|(temps, duties)| Zone { temps, duties })
            .collect();
        Ok(Self {
            desired_temp,
            error,
            zones,
        })
    }
}

/// New duty cycles per zone. Fails fast, before any zone is adjusted, when the
/// setpoint, a temperature or a duty is outside its bounds, or the tolerance is negative.
pub fn decide_climate(
    case: &ClimateCase,
    params: &ClimateParams,
    sink: &dyn EventSink,
) -> Result<Vec<Vec<f64>>> {
    validate(case.desired_temp, params.temperature, Quantity::Temperature)?;
    validate(
        case.error,
        Bounds::new(0.0, f64::INFINITY),
        Quantity::Tolerance,
    )?;
    for zone in &case.zones {
        validate_all(&zone.temps, params.temperature, Quantity::Temperature)?;
    }
    for zone in &case.zones {
        validate_all(&zone.duties, params.duty, Quantity::FanDuty)?;
    }

    let band = Bounds::new(case.desired_temp - case.error, case.desired_temp + case.error);
    let aggregator = params.aggregator();

    let mut out = Vec::with_capacity(case.zones.len());
    for (idx, zone) in case.zones.iter().enumerate() {
        // A zone without readings keeps its duties.
        let adjusted = match aggregator.aggregate(&zone.temps, idx, sink).value() {
            Some(temp) => adjust_zone(&zone.duties, temp, band, params),
            None => zone.duties.clone(),
        };
        out.push(adjusted);
    }
    Ok(out)
}

/// Output is always a fresh vector clamped to `params.duty`.
pub fn adjust_zone(duties: &[f64], temp: f64, band: Bounds, params: &ClimateParams) -> Vec<f64> {
    if band.contains(temp) {
        return duties.to_vec();
    }
    let delta = if mean(duties).unwrap_or(0.0) == 0.0 {
        params.idle_boost
    } else {
        params.step
    };
    let signed = if temp < band.lower { delta } else { -delta };
    duties
        .iter()
        .map(|d| params.duty.clamp(d + signed))
        .collect()
}

/// [`decide_climate`] as a replicable decision function.
pub struct ClimateController {
    params: ClimateParams,
    sink: Arc<dyn EventSink>,
}

impl ClimateController {
    pub fn new(params: ClimateParams) -> Self {
        Self::with_sink(params, Arc::new(TracingSink))
    }

    pub fn with_sink(params: ClimateParams, sink: Arc<dyn EventSink>) -> Self {
        Self { params, sink }
    }

    pub fn params(&self) -> &ClimateParams {
        &self.params
    }
}

impl DecisionFunction<ClimateCase> for ClimateController {
    type Output = Vec<Vec<f64>>;

    fn name(&self) -> &str {
        "climate"
    }

    fn decide(
        &self,
        input: &ClimateCase,
    ) -> std::result::Result<Vec<Vec<f64>>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(decide_climate(input, &self.params, self.sink.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use rstest::rstest;

    fn band(desired: f64, error: f64) -> Bounds {
        Bounds::new(desired - error, desired + error)
    }

    #[test]
    fn idle_zone_gets_larger_boost() {
        let p = ClimateParams::default();
        assert_eq!(adjust_zone(&[0.0, 0.0], 18.0, band(25.0, 3.0), &p), vec![20.0, 20.0]);
        assert_eq!(adjust_zone(&[10.0, 0.0], 18.0, band(25.0, 3.0), &p), vec![20.0, 10.0]);
    }

    #[test]
    fn decrease_clamps_at_zero() {
        let p = ClimateParams::default();
        assert_eq!(adjust_zone(&[10.0, 0.0], 20.0, band(15.0, 3.0), &p), vec![0.0, 0.0]);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let p = ClimateParams::default();
        assert_eq!(adjust_zone(&[40.0], 22.0, band(25.0, 3.0), &p), vec![40.0]);
        assert_eq!(adjust_zone(&[40.0], 28.0, band(25.0, 3.0), &p), vec![40.0]);
    }

    #[test]
    fn zone_count_mismatch_is_shape_error() {
        let err = ClimateCase::from_parts(25.0, 3.0, vec![vec![20.0]], vec![]).unwrap_err();
        assert!(matches!(err, RedundError::ShapeMismatch { .. }));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let case = ClimateCase::from_parts(25.0, -1.0, vec![vec![20.0]], vec![vec![0.0]]).unwrap();
        let err = decide_climate(&case, &ClimateParams::default(), &NullSink).unwrap_err();
        match err {
            RedundError::RangeViolation(rv) => assert_eq!(rv.quantity, Quantity::Tolerance),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(75.0)]
    fn setpoint_outside_temperature_bounds_rejected(#[case] desired: f64) {
        let case = ClimateCase::from_parts(desired, 3.0, vec![vec![20.0]], vec![vec![0.0]]).unwrap();
        let err = decide_climate(&case, &ClimateParams::default(), &NullSink).unwrap_err();
        match err {
            RedundError::RangeViolation(rv) => assert_eq!(rv.quantity, Quantity::Temperature),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zone_without_readings_is_left_alone() {
        let case = ClimateCase::from_parts(25.0, 3.0, vec![vec![]], vec![vec![30.0]]).unwrap();
        let out = decide_climate(&case, &ClimateParams::default(), &NullSink).unwrap();
        assert_eq!(out, vec![vec![30.0]]);
    }
}
