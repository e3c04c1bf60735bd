//! Case suites and tyre-reading CSV files.
//!
//! A suite is a TOML document of `[[pressure]]` and `[[climate]]` tables,
//! each one evaluation. Pressure cases can also come from a CSV file with
//! one row per reading.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PressureCaseCfg {
    pub target: f64,
    /// Readings per tyre, tyre `i` at index `i`.
    pub units: Vec<Vec<f64>>,
    /// Known-good warning list, checked when present.
    #[serde(default)]
    pub expected: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClimateCaseCfg {
    pub desired: f64,
    pub error: f64,
    /// Temperature readings per zone.
    pub temps: Vec<Vec<f64>>,
    /// Fan duties per zone, percent.
    pub fans: Vec<Vec<f64>>,
    /// Known-good duties, checked when present.
    #[serde(default)]
    pub expected: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Suite {
    pub pressure: Vec<PressureCaseCfg>,
    pub climate: Vec<ClimateCaseCfg>,
}

impl Suite {
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty() && self.climate.is_empty()
    }
}

pub fn load_suite_toml(s: &str) -> Result<Suite, toml::de::Error> {
    toml::from_str::<Suite>(s)
}

pub fn load_suite(path: &Path) -> eyre::Result<Suite> {
    let text =
        std::fs::read_to_string(path).map_err(|e| eyre::eyre!("read suite {:?}: {}", path, e))?;
    load_suite_toml(&text).map_err(|e| eyre::eyre!("parse suite {:?}: {}", path, e))
}

/// Tyre reading CSV schema.
///
/// Expected headers:
/// case,target,tyre,psi
///
/// Example:
/// case,target,tyre,psi
/// 1,32.0,0,31.5
/// 1,32.0,0,31.9
/// 1,32.0,1,28.0
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TyreReadingRow {
    pub case: u32,
    pub target: f64,
    pub tyre: usize,
    pub psi: f64,
}

/// Group reading rows into cases, in order of first appearance.
///
/// Every row of a case must carry the same target, and the tyre indices of
/// a case must be exactly `0..n`.
pub fn pressure_cases_from_rows(rows: &[TyreReadingRow]) -> eyre::Result<Vec<PressureCaseCfg>> {
    let mut ids: Vec<u32> = Vec::new();
    let mut cases: Vec<PressureCaseCfg> = Vec::new();
    for row in rows {
        let idx = match ids.iter().position(|&id| id == row.case) {
            Some(i) => i,
            None => {
                ids.push(row.case);
                cases.push(PressureCaseCfg {
                    target: row.target,
                    units: Vec::new(),
                    expected: None,
                });
                cases.len() - 1
            }
        };
        let case = &mut cases[idx];
        if case.target.to_bits() != row.target.to_bits() {
            eyre::bail!(
                "case {} has conflicting targets {} and {}",
                row.case,
                case.target,
                row.target
            );
        }
        // Dense indices grow by at most one per new tyre.
        if row.tyre > case.units.len() {
            eyre::bail!(
                "case {} has no readings for tyre {}; tyre indices must be dense",
                row.case,
                case.units.len()
            );
        }
        if row.tyre == case.units.len() {
            case.units.push(Vec::new());
        }
        case.units[row.tyre].push(row.psi);
    }
    for (id, case) in ids.iter().zip(&cases) {
        if let Some(gap) = case.units.iter().position(Vec::is_empty) {
            eyre::bail!("case {id} has no readings for tyre {gap}; tyre indices must be dense");
        }
    }
    Ok(cases)
}

pub fn load_pressure_csv(path: &Path) -> eyre::Result<Vec<PressureCaseCfg>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open readings CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["case", "target", "tyre", "psi"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "readings CSV must have headers 'case,target,tyre,psi', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TyreReadingRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("readings CSV {:?} has no rows", path);
    }

    pressure_cases_from_rows(&rows)
}
