#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(suite) = redund_config::load_suite_toml(data) else {
        return;
    };
    // Every parsed pressure case must survive the CSV row grouping path too.
    let rows: Vec<redund_config::TyreReadingRow> = suite
        .pressure
        .iter()
        .enumerate()
        .flat_map(|(case, c)| {
            c.units.iter().enumerate().flat_map(move |(tyre, readings)| {
                readings.iter().map(move |&psi| redund_config::TyreReadingRow {
                    case: case as u32,
                    target: c.target,
                    tyre,
                    psi,
                })
            })
        })
        .collect();
    let _ = redund_config::pressure_cases_from_rows(&rows);
});
