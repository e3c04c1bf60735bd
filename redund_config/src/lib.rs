#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and case-suite parsing for the redundancy tools.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; omitted keys take the documented defaults.
//! - Case suites (`[[pressure]]` / `[[climate]]` tables) and tyre-reading
//!   CSV files live in [`suite`].
use serde::Deserialize;

pub mod suite;

pub use suite::{
    ClimateCaseCfg, PressureCaseCfg, Suite, TyreReadingRow, load_pressure_csv, load_suite,
    load_suite_toml, pressure_cases_from_rows,
};

/// Outlier rule applied to each tyre's readings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierKind {
    /// Compare each reading with the mean of the others (`ratio`).
    #[default]
    LeaveOneOut,
    /// Compare each reading with the median of all (`threshold`).
    MedianDeviation,
}

/// Which readings the final mean is taken over.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeanOverCfg {
    #[default]
    Survivors,
    Valid,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakCfg {
    FirstReplica,
    #[default]
    EarliestTied,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PressureCfg {
    /// Readings at or below this are invalid (PSI).
    pub min_psi: f64,
    /// Readings at or above this are invalid (PSI).
    pub max_psi: f64,
    pub outlier: OutlierKind,
    /// Leave-one-out relative deviation, in (0, 1].
    pub ratio: f64,
    /// Median-deviation absolute threshold (PSI), > 0.
    pub threshold: f64,
    pub mean_over: MeanOverCfg,
}

impl Default for PressureCfg {
    fn default() -> Self {
        Self {
            min_psi: 0.0,
            max_psi: 100.0,
            outlier: OutlierKind::LeaveOneOut,
            ratio: 0.5,
            threshold: 5.0,
            mean_over: MeanOverCfg::Survivors,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClimateCfg {
    pub temp_min: f64,
    pub temp_max: f64,
    pub duty_min: f64,
    pub duty_max: f64,
    /// Median filter threshold in °C
    pub median_threshold: f64,
    /// Duty change when every fan in the zone is idle
    pub idle_boost: f64,
    pub step: f64,
}

impl Default for ClimateCfg {
    fn default() -> Self {
        Self {
            temp_min: -40.0,
            temp_max: 60.0,
            duty_min: 0.0,
            duty_max: 100.0,
            median_threshold: 5.0,
            idle_boost: 20.0,
            step: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VotingCfg {
    /// Re-executions per climate case (TMR = 3)
    pub replicas: usize,
    pub tie_break: TieBreakCfg,
}

impl Default for VotingCfg {
    fn default() -> Self {
        Self {
            replicas: 3,
            tie_break: TieBreakCfg::EarliestTied,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReconcileCfg {
    /// Comparisons before a mismatch is declared persistent
    pub max_attempts: u32,
}

impl Default for ReconcileCfg {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pressure: PressureCfg,
    #[serde(default)]
    pub climate: ClimateCfg,
    #[serde(default)]
    pub voting: VotingCfg,
    #[serde(default)]
    pub reconcile: ReconcileCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is left to the caller.
pub fn load_config(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pressure
        let p = &self.pressure;
        if !(p.min_psi.is_finite() && p.max_psi.is_finite()) {
            eyre::bail!("pressure.min_psi and pressure.max_psi must be finite");
        }
        if p.min_psi >= p.max_psi {
            eyre::bail!("pressure.min_psi must be < pressure.max_psi");
        }
        if !(p.ratio > 0.0 && p.ratio <= 1.0) {
            eyre::bail!("pressure.ratio must be in (0.0, 1.0]");
        }
        if !(p.threshold > 0.0 && p.threshold.is_finite()) {
            eyre::bail!("pressure.threshold must be > 0");
        }

        // Climate
        let c = &self.climate;
        if !(c.temp_min.is_finite() && c.temp_max.is_finite()) || c.temp_min > c.temp_max {
            eyre::bail!("climate.temp_min must be <= climate.temp_max");
        }
        if !(c.duty_min.is_finite() && c.duty_max.is_finite()) || c.duty_min > c.duty_max {
            eyre::bail!("climate.duty_min must be <= climate.duty_max");
        }
        if c.duty_min < 0.0 || c.duty_max > 100.0 {
            eyre::bail!("climate duty range must lie within [0, 100]");
        }
        if !(c.median_threshold > 0.0 && c.median_threshold.is_finite()) {
            eyre::bail!("climate.median_threshold must be > 0");
        }
        if c.idle_boost.is_sign_negative() || !c.idle_boost.is_finite() {
            eyre::bail!("climate.idle_boost must be >= 0");
        }
        if c.step.is_sign_negative() || !c.step.is_finite() {
            eyre::bail!("climate.step must be >= 0");
        }

        // Voting
        if self.voting.replicas == 0 {
            eyre::bail!("voting.replicas must be >= 1");
        }
        if self.voting.replicas > 99 {
            eyre::bail!("voting.replicas is unreasonably large (>99)");
        }

        // Reconcile
        if self.reconcile.max_attempts == 0 {
            eyre::bail!("reconcile.max_attempts must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
