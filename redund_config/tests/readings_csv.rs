use std::fs::File;
use std::io::Write;

use redund_config::{
    PressureCaseCfg, TyreReadingRow, load_pressure_csv, load_suite_toml, pressure_cases_from_rows,
};
use rstest::rstest;
use tempfile::tempdir;

fn row(case: u32, target: f64, tyre: usize, psi: f64) -> TyreReadingRow {
    TyreReadingRow {
        case,
        target,
        tyre,
        psi,
    }
}

#[rstest]
fn rows_group_by_case_in_first_appearance_order() {
    let rows = [
        row(7, 5.0, 0, 10.0),
        row(2, 100.0, 1, 30.0),
        row(7, 5.0, 1, 1.0),
        row(2, 100.0, 0, 10.0),
        row(7, 5.0, 0, 11.0),
    ];
    let cases = pressure_cases_from_rows(&rows).unwrap();
    assert_eq!(
        cases,
        vec![
            PressureCaseCfg {
                target: 5.0,
                units: vec![vec![10.0, 11.0], vec![1.0]],
                expected: None,
            },
            PressureCaseCfg {
                target: 100.0,
                units: vec![vec![10.0], vec![30.0]],
                expected: None,
            },
        ]
    );
}

#[rstest]
fn conflicting_targets_rejected() {
    let rows = [row(1, 5.0, 0, 10.0), row(1, 6.0, 1, 10.0)];
    let err = pressure_cases_from_rows(&rows).expect_err("targets differ");
    assert!(format!("{err}").contains("conflicting targets"));
}

#[rstest]
fn sparse_tyre_indices_rejected() {
    let rows = [row(1, 5.0, 0, 10.0), row(1, 5.0, 2, 10.0)];
    let err = pressure_cases_from_rows(&rows).expect_err("tyre 1 missing");
    assert!(format!("{err}").contains("tyre 1"));
}

#[rstest]
#[case(usize::MAX)]
#[case(1_000_000_000_000)]
fn huge_tyre_index_is_an_error(#[case] tyre: usize) {
    let err = pressure_cases_from_rows(&[row(1, 5.0, tyre, 10.0)]).expect_err("not dense");
    assert!(format!("{err}").contains("tyre 0"));
}

#[rstest]
fn csv_with_huge_tyre_index_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "case,target,tyre,psi").unwrap();
    writeln!(f, "1,5,18446744073709551615,10").unwrap();
    let err = load_pressure_csv(&path).expect_err("not dense");
    assert!(format!("{err}").contains("tyre indices must be dense"));
}

#[rstest]
fn csv_headers_enforced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "case,tyre,psi").unwrap();
    writeln!(f, "1,0,10.0").unwrap();
    let err = load_pressure_csv(&path).expect_err("header mismatch");
    assert!(format!("{err}").contains("case,target,tyre,psi"));
}

#[rstest]
fn csv_loads_cases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "case,target,tyre,psi").unwrap();
    writeln!(f, "1,5.0,0,10.0").unwrap();
    writeln!(f, "1,5.0,1,1.0").unwrap();
    writeln!(f, "1,5.0,2,10.0").unwrap();
    let cases = load_pressure_csv(&path).unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].units, vec![vec![10.0], vec![1.0], vec![10.0]]);
}

#[rstest]
fn csv_bad_number_reports_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "case,target,tyre,psi").unwrap();
    writeln!(f, "1,5.0,0,ten").unwrap();
    let err = load_pressure_csv(&path).expect_err("psi is not a number");
    assert!(format!("{err}").contains("invalid CSV row 2"));
}

#[rstest]
fn suite_parses_both_kinds() {
    let suite = load_suite_toml(
        r#"
[[pressure]]
target = 5.0
units = [[10.0], [1.0]]
expected = [1]

[[climate]]
desired = 25.0
error = 3.0
temps = [[23.0]]
fans = [[0.0, 0.0, 0.0]]
"#,
    )
    .unwrap();
    assert_eq!(suite.pressure.len(), 1);
    assert_eq!(suite.pressure[0].expected, Some(vec![1]));
    assert_eq!(suite.climate[0].expected, None);
    assert_eq!(suite.climate[0].fans, vec![vec![0.0, 0.0, 0.0]]);
    assert!(!suite.is_empty());
}
