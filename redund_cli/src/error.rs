use thiserror::Error;

/// Failures reported by the CLI itself rather than a single case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("{failed} of {total} {kind} cases failed")]
    CasesFailed {
        kind: &'static str,
        failed: usize,
        total: usize,
    },
    #[error("{differing} of {total} cases differ between result files")]
    ResultsDiffer { differing: usize, total: usize },
    #[error("{0} reference case(s) did not produce the expected result")]
    SelfCheckFailed(usize),
    #[error("faulty replica {index} does not exist ({replicas} replicas)")]
    NoSuchReplica { index: usize, replicas: usize },
}
