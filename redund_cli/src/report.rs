//! Result files: one `Test Case {n}: {json}` line per case.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use eyre::WrapErr;
use serde::Serialize;
use serde_json::Value;

const PREFIX: &str = "Test Case ";

pub fn format_line<T: Serialize + ?Sized>(case: usize, decision: &T) -> eyre::Result<String> {
    Ok(format!("{PREFIX}{case}: {}", serde_json::to_string(decision)?))
}

pub fn write_results(path: &Path, lines: &[String]) -> eyre::Result<()> {
    let mut text = String::new();
    for line in lines {
        let _ = writeln!(text, "{line}");
    }
    std::fs::write(path, text).wrap_err_with(|| format!("write results {path:?}"))
}

/// Parse a result file into `case -> decision`. Blank lines are ignored.
pub fn read_results(path: &Path) -> eyre::Result<BTreeMap<usize, Value>> {
    let text =
        std::fs::read_to_string(path).wrap_err_with(|| format!("read results {path:?}"))?;
    parse_results(&text).wrap_err_with(|| format!("parse results {path:?}"))
}

pub fn parse_results(text: &str) -> eyre::Result<BTreeMap<usize, Value>> {
    let mut out = BTreeMap::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((case, decision)) = line
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.split_once(": "))
        else {
            eyre::bail!("line {}: expected 'Test Case <n>: <decision>'", idx + 1);
        };
        let case: usize = case
            .trim()
            .parse()
            .map_err(|e| eyre::eyre!("line {}: bad case number {case:?}: {e}", idx + 1))?;
        let decision: Value = serde_json::from_str(decision)
            .map_err(|e| eyre::eyre!("line {}: bad decision: {e}", idx + 1))?;
        if out.insert(case, decision).is_some() {
            eyre::bail!("line {}: duplicate test case {case}", idx + 1);
        }
    }
    Ok(out)
}

/// A case whose decisions differ, or that only one side has.
#[derive(Debug, PartialEq)]
pub struct CaseDiff {
    pub case: usize,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

pub fn diff_results(a: &BTreeMap<usize, Value>, b: &BTreeMap<usize, Value>) -> Vec<CaseDiff> {
    let mut cases: Vec<usize> = a.keys().chain(b.keys()).copied().collect();
    cases.sort_unstable();
    cases.dedup();
    cases
        .into_iter()
        .filter(|c| a.get(c) != b.get(c))
        .map(|case| CaseDiff {
            case,
            left: a.get(&case).cloned(),
            right: b.get(&case).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn line_uses_compact_json() {
        assert_eq!(format_line(3, &[0usize, 2, 1, 3]).unwrap(), "Test Case 3: [0,2,1,3]");
    }

    #[test]
    fn parse_round_trips_written_lines() {
        let text = "Test Case 1: []\n\nTest Case 2: [1]\n";
        let parsed = parse_results(text).unwrap();
        assert_eq!(parsed.get(&1), Some(&json!([])));
        assert_eq!(parsed.get(&2), Some(&json!([1])));
    }

    #[test]
    fn rejects_garbage_and_duplicates() {
        assert!(parse_results("Case 1: []").is_err());
        assert!(parse_results("Test Case 1: []\nTest Case 1: [2]").is_err());
    }

    #[test]
    fn diff_reports_changed_and_missing_cases() {
        let a = parse_results("Test Case 1: [1]\nTest Case 2: []\nTest Case 3: [0]").unwrap();
        let b = parse_results("Test Case 1: [1]\nTest Case 2: [2]").unwrap();
        let d = diff_results(&a, &b);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].case, 2);
        assert_eq!(d[1].right, None);
    }
}
