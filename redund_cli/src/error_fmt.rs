//! Human-readable error descriptions and structured JSON error formatting.

use redund_core::{RangeViolation, RedundError};

use crate::error::CliError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Case failures carry the first underlying error; describe that one.
    if let Some(re) = err.downcast_ref::<RedundError>() {
        let summary = match err.downcast_ref::<CliError>() {
            Some(ce @ CliError::CasesFailed { .. }) => format!("{ce}. First failure: "),
            _ => String::new(),
        };
        return format!("{summary}{}", humanize_core(re));
    }

    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::ResultsDiffer { .. } => format!(
                "What happened: {ce}.\nLikely causes: The two versions disagree on at least one case, or the files come from different suites.\nHow to fix: Inspect the listed cases; rerun `redund pressure` to regenerate both files from the same input."
            ),
            CliError::SelfCheckFailed(_) => format!(
                "What happened: {ce}.\nLikely causes: The config changes the decision rules (outlier policy, bounds, steps) away from the reference behaviour.\nHow to fix: Run self-check without --config to confirm the build, then review the config."
            ),
            CliError::NoSuchReplica { .. } => format!(
                "What happened: {ce}.\nLikely causes: --faulty-replica is not below --replicas.\nHow to fix: Pick an index in 0..replicas."
            ),
            CliError::CasesFailed { .. } => format!(
                "What happened: {ce}.\nLikely causes: See the per-case output above.\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    // String-based heuristics for errors coming from config or input files
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("readings csv must have headers") {
        return "Invalid headers in readings CSV. Expected 'case,target,tyre,psi'.".to_string();
    }

    if lower.contains("invalid configuration") {
        let cause = err.root_cause();
        return format!(
            "What happened: Configuration is invalid ({cause}).\nLikely causes: Out-of-range or inconsistent values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/redund.toml for a sample."
        );
    }

    if lower.contains("parse config") || lower.contains("parse suite") {
        return format!(
            "What happened: A TOML file could not be parsed.\nLikely causes: Syntax error, unknown enum value, or wrong value type.\nHow to fix: Fix the file and rerun. Details: {err:#}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn humanize_core(err: &RedundError) -> String {
    match err {
        RedundError::RangeViolation(rv) => format!(
            "What happened: {rv}.\nLikely causes: A faulty sensor or a corrupted input value.\nHow to fix: Check the {} readings of that case; the case is rejected as a whole.",
            rv.quantity
        ),
        RedundError::ShapeMismatch { detail } => format!(
            "What happened: Shape mismatch ({detail}).\nLikely causes: Zone and fan lists of different lengths, or a replica returning a different layout.\nHow to fix: Give every zone both a temps entry and a fans entry."
        ),
        RedundError::PersistentMismatch { attempts, .. } => format!(
            "What happened: The two versions still disagreed after {attempts} attempts.\nLikely causes: A real design difference between the versions on this input.\nHow to fix: Compare the outputs above; the mismatch is reported, not resolved."
        ),
        RedundError::NoReplicas => "What happened: No replica produced an output.\nLikely causes: Every replica failed.\nHow to fix: Re-run with --log-level=debug to see each replica failure.".to_string(),
        other => format!(
            "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        ),
    }
}

pub fn error_reason_name(err: &RedundError) -> &'static str {
    match err {
        RedundError::RangeViolation(_) => "RangeViolation",
        RedundError::ShapeMismatch { .. } => "ShapeMismatch",
        RedundError::PersistentMismatch { .. } => "PersistentMismatch",
        RedundError::NoReplicas => "NoReplicas",
        RedundError::ReplicaFault { .. } => "ReplicaFault",
        RedundError::InvalidConfig(_) => "InvalidConfig",
    }
}

/// Stable exit codes: 3 range violation, 4 persistent mismatch, 5 shape
/// mismatch, 6 differing result files, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(CliError::ResultsDiffer { .. }) = err.downcast_ref::<CliError>() {
        return 6;
    }
    match err.downcast_ref::<RedundError>() {
        Some(RedundError::RangeViolation(_)) => 3,
        Some(RedundError::PersistentMismatch { .. }) => 4,
        Some(RedundError::ShapeMismatch { .. }) => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(re) = err.downcast_ref::<RedundError>() {
        let msg = humanize(err);
        let reason = error_reason_name(re);
        let details = match re {
            RedundError::RangeViolation(RangeViolation {
                quantity,
                value,
                lower,
                upper,
            }) => Some(json!({
                "quantity": quantity.as_str(),
                "value": value,
                "lower": lower,
                "upper": upper,
            })),
            RedundError::PersistentMismatch {
                attempts,
                primary,
                secondary,
            } => Some(json!({
                "attempts": attempts,
                "primary": primary,
                "secondary": secondary,
            })),
            RedundError::ShapeMismatch { detail } => Some(json!({ "detail": detail })),
            _ => None,
        };
        let obj = if let Some(d) = details {
            json!({ "reason": reason, "details": d, "message": msg })
        } else {
            json!({ "reason": reason, "message": msg })
        };
        return obj.to_string();
    }

    if let Some(CliError::ResultsDiffer { differing, total }) = err.downcast_ref::<CliError>() {
        return json!({
            "reason": "ResultsDiffer",
            "details": { "differing": differing, "total": total },
            "message": humanize(err),
        })
        .to_string();
    }

    // Generic error JSON
    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}
