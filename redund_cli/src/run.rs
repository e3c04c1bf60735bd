//! Subcommand execution: evaluate case suites and report per case.

use std::path::Path;
use std::sync::Arc;

use redund_config::{ClimateCaseCfg, Config, PressureCaseCfg};
use redund_core::{
    ClimateCase, ClimateController, ClimateParams, Event, EventSink, MemorySink,
    NonZeroMeanPressure, NullSink, PressureCase, PressureParams, ReconcileCfg, RedundError,
    Replicator, ScreenedPressure, TracingSink, Voter, VotingCfg,
};
use redund_sim::{Fault, FaultyReplica};
use serde_json::json;

use crate::error::CliError;
use crate::report::{diff_results, format_line, read_results, write_results};

/// Forwards to `tracing` and keeps a copy for the per-case report.
#[derive(Default)]
struct CaseSink {
    seen: MemorySink,
}

impl EventSink for CaseSink {
    fn record(&self, event: Event) {
        self.seen.record(event.clone());
        TracingSink.record(event);
    }
}

/// Outcome of one pass over a suite.
#[derive(Debug, Default)]
pub struct Summary {
    pub total: usize,
    pub failures: Vec<RedundError>,
    /// Cases whose result differs from their `expected` entry.
    pub unexpected: usize,
}

impl Summary {
    /// Error out with the first failure when any case failed.
    pub fn finish(self, kind: &'static str) -> eyre::Result<()> {
        if self.unexpected > 0 {
            tracing::warn!(kind, unexpected = self.unexpected, "results differ from expected");
        }
        let failed = self.failures.len();
        match self.failures.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(eyre::Report::new(first).wrap_err(CliError::CasesFailed {
                kind,
                failed,
                total: self.total,
            })),
        }
    }
}

pub struct PressureRun {
    pub summary: Summary,
    pub primary_lines: Vec<String>,
    pub peer_lines: Vec<String>,
}

/// Compare the screened version with the second version on every case.
pub fn evaluate_pressure(
    cfg: &Config,
    cases: &[PressureCaseCfg],
    json_out: bool,
) -> eyre::Result<PressureRun> {
    let params = PressureParams::from(&cfg.pressure);
    let reconciler = ReconcileCfg::from(&cfg.reconcile).reconciler();
    let screened = ScreenedPressure::new(&params);
    // Result files only; the reconciler's run reports the diagnostics.
    let screened_quiet = ScreenedPressure::with_sink(&params, Arc::new(NullSink));
    let peer = NonZeroMeanPressure;

    let mut run = PressureRun {
        summary: Summary {
            total: cases.len(),
            ..Summary::default()
        },
        primary_lines: Vec::with_capacity(cases.len()),
        peer_lines: Vec::with_capacity(cases.len()),
    };

    if !json_out {
        println!("\n--- N-Version Comparator ---");
    }
    for (idx, case_cfg) in cases.iter().enumerate() {
        let n = idx + 1;
        let case = PressureCase::from(case_cfg);
        run.primary_lines.push(format_line(n, &screened_quiet.evaluate(&case))?);
        run.peer_lines.push(format_line(n, &peer.evaluate(&case))?);

        let sink = CaseSink::default();
        let result = reconciler.reconcile(&screened, &peer, &case, &sink);
        if !json_out {
            print_mismatches(n, &sink.seen.events());
        }
        match result {
            Ok(r) => {
                let output = serde_json::to_string(&r.output)?;
                if json_out {
                    let line = json!({
                        "case": n,
                        "status": "ok",
                        "attempts": r.attempts,
                        "output": r.output,
                    });
                    println!("{line}");
                } else {
                    println!("[OK] Test Case {n} → Output: {output}");
                }
                if let Some(expected) = &case_cfg.expected
                    && *expected != r.output
                {
                    run.summary.unexpected += 1;
                    if !json_out {
                        println!(
                            "[FAIL] Test Case {n}: expected {}",
                            serde_json::to_string(expected)?
                        );
                    }
                }
            }
            Err(e) => {
                if json_out {
                    println!(
                        "{}",
                        json!({ "case": n, "status": "error", "error": e.to_string() })
                    );
                } else if let RedundError::PersistentMismatch { attempts, .. } = &e {
                    println!(
                        "[ERROR] Persistent mismatch in Test Case {n} after {attempts} attempts."
                    );
                } else {
                    println!("[ERROR] Test Case {n}: {e}");
                }
                run.summary.failures.push(e);
            }
        }
    }
    Ok(run)
}

fn print_mismatches(n: usize, events: &[Event]) {
    for event in events {
        if let Event::VersionMismatch {
            attempt,
            primary,
            secondary,
        } = event
        {
            println!("[WARNING] Output mismatch in Test Case {n} (Attempt {attempt})");
            println!("  Fault-Tolerant: {primary}");
            println!("  V2 Version:     {secondary}");
        }
    }
}

pub fn run_pressure(
    cfg: &Config,
    cases: &[PressureCaseCfg],
    out: &Path,
    peer_out: &Path,
    json_out: bool,
) -> eyre::Result<()> {
    let run = evaluate_pressure(cfg, cases, json_out)?;
    write_results(out, &run.primary_lines)?;
    write_results(peer_out, &run.peer_lines)?;
    tracing::info!(cases = cases.len(), out = ?out, peer_out = ?peer_out, "result files written");
    run.summary.finish("pressure")
}

/// Replicate the climate controller per case and vote the outputs.
///
/// `fault` puts a fault into the replica at the given index.
pub fn evaluate_climate(
    cfg: &Config,
    cases: &[ClimateCaseCfg],
    replicas: usize,
    fault: Option<(Fault, usize)>,
    json_out: bool,
) -> eyre::Result<(Summary, Vec<String>)> {
    if let Some((_, index)) = fault
        && index >= replicas
    {
        return Err(CliError::NoSuchReplica { index, replicas }.into());
    }
    let params = ClimateParams::from(&cfg.climate);
    let voting = VotingCfg::from(&cfg.voting);
    let voter = Voter::new(voting.tie_break);

    let mut summary = Summary {
        total: cases.len(),
        ..Summary::default()
    };
    let mut lines = Vec::with_capacity(cases.len());
    for (idx, case_cfg) in cases.iter().enumerate() {
        let n = idx + 1;
        let sink = Arc::new(CaseSink::default());
        let controller = ClimateController::with_sink(params, sink.clone());

        let result = ClimateCase::try_from(case_cfg).and_then(|case| {
            let mut replicator = Replicator::new();
            for i in 0..replicas {
                replicator = match fault {
                    Some((f, index)) if index == i => replicator.with_variant(FaultyReplica::new(
                        format!("replica-{i}"),
                        &controller,
                        f,
                    )),
                    _ => replicator.with_variant(&controller),
                };
            }
            let set = replicator.replicate(&case, sink.as_ref())?;
            voter.vote_replicas_grid(&set, sink.as_ref())
        });

        match result {
            Ok(duties) => {
                lines.push(format_line(n, &duties)?);
                if json_out {
                    println!("{}", json!({ "case": n, "status": "ok", "output": duties }));
                } else {
                    println!("TC{n}: {}", serde_json::to_string(&duties)?);
                }
                let masked = sink.seen.count("vote_outvoted")
                    + sink.seen.count("vote_tie")
                    + sink.seen.count("replica_failed");
                if masked > 0 {
                    tracing::info!(case = n, masked, "replica disagreement masked by vote");
                }
                if let Some(expected) = &case_cfg.expected
                    && *expected != duties
                {
                    summary.unexpected += 1;
                    if !json_out {
                        println!("[FAIL] TC{n}: expected {}", serde_json::to_string(expected)?);
                    }
                }
            }
            Err(e) => {
                lines.push(format_line(n, &serde_json::Value::Null)?);
                if json_out {
                    println!(
                        "{}",
                        json!({ "case": n, "status": "error", "error": e.to_string() })
                    );
                } else {
                    println!("TC{n}: Error: {e}");
                }
                summary.failures.push(e);
            }
        }
    }
    Ok((summary, lines))
}

pub fn run_climate(
    cfg: &Config,
    cases: &[ClimateCaseCfg],
    replicas: usize,
    fault: Option<(Fault, usize)>,
    out: Option<&Path>,
    json_out: bool,
) -> eyre::Result<()> {
    let (summary, lines) = evaluate_climate(cfg, cases, replicas, fault, json_out)?;
    if let Some(path) = out {
        write_results(path, &lines)?;
        tracing::info!(cases = cases.len(), out = ?path, "result file written");
    }
    summary.finish("climate")
}

/// Dual comparison of two result files.
pub fn run_compare(a: &Path, b: &Path, json_out: bool) -> eyre::Result<()> {
    let left = read_results(a)?;
    let right = read_results(b)?;
    let diffs = diff_results(&left, &right);
    let total = left.len().max(right.len());

    let show = |v: &Option<serde_json::Value>| {
        v.as_ref()
            .map_or_else(|| "<missing>".to_string(), ToString::to_string)
    };
    for d in &diffs {
        if json_out {
            println!(
                "{}",
                json!({ "case": d.case, "status": "differs", "a": d.left, "b": d.right })
            );
        } else {
            println!(
                "[DIFF] Test Case {}: {} vs {}",
                d.case,
                show(&d.left),
                show(&d.right)
            );
        }
    }
    if diffs.is_empty() {
        if !json_out {
            println!("[OK] {total} cases agree");
        }
        return Ok(());
    }
    Err(CliError::ResultsDiffer {
        differing: diffs.len(),
        total,
    }
    .into())
}

const REFERENCE_SUITE: &str = include_str!("../../etc/suite.toml");

/// Run the bundled reference cases under the current config.
pub fn run_self_check(cfg: &Config, json_out: bool) -> eyre::Result<()> {
    let suite = redund_config::load_suite_toml(REFERENCE_SUITE)?;
    let pressure = evaluate_pressure(cfg, &suite.pressure, json_out)?.summary;
    let (climate, _) = evaluate_climate(cfg, &suite.climate, cfg.voting.replicas, None, json_out)?;

    let bad = pressure.unexpected
        + pressure.failures.len()
        + climate.unexpected
        + climate.failures.len();
    if bad > 0 {
        return Err(CliError::SelfCheckFailed(bad).into());
    }
    if json_out {
        println!(
            "{}",
            json!({ "self_check": "ok", "pressure": pressure.total, "climate": climate.total })
        );
    } else {
        println!(
            "self-check ok: {} pressure and {} climate reference cases",
            pressure.total, climate.total
        );
    }
    Ok(())
}
