//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "redund", version, about = "Fault-tolerant sensor decisions with redundancy")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit results and logs as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Fault injected into one climate replica.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FaultKind {
    /// Every duty reads 100
    StuckHigh,
    /// Every duty reads 0
    StuckLow,
    /// Every duty is shifted by +15
    Offset,
    /// Uniform noise of ±5 on every duty
    Noise,
    /// The replica fails
    Crash,
    /// The replica never answers
    Timeout,
}

impl FaultKind {
    pub fn to_fault(self) -> redund_sim::Fault {
        use redund_sim::Fault;
        match self {
            FaultKind::StuckHigh => Fault::StuckAt(100.0),
            FaultKind::StuckLow => Fault::StuckAt(0.0),
            FaultKind::Offset => Fault::Offset(15.0),
            FaultKind::Noise => Fault::Noise {
                amplitude: 5.0,
                seed: 0x5EED,
            },
            FaultKind::Crash => Fault::Crash,
            FaultKind::Timeout => Fault::Timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tyre pressure warnings, two versions compared per case
    Pressure {
        /// Case suite TOML ([[pressure]] tables)
        #[arg(
            long,
            value_name = "FILE",
            conflicts_with = "readings",
            required_unless_present = "readings"
        )]
        suite: Option<PathBuf>,
        /// Tyre readings CSV (strict header: case,target,tyre,psi)
        #[arg(long, value_name = "CSV")]
        readings: Option<PathBuf>,
        /// Result file of the fault-tolerant version
        #[arg(long, value_name = "FILE", default_value = "ft_output.txt")]
        out: PathBuf,
        /// Result file of the second version
        #[arg(long = "peer-out", value_name = "FILE", default_value = "v2_output.txt")]
        peer_out: PathBuf,
    },
    /// Zone fan duties, replicated and voted per case
    Climate {
        /// Case suite TOML ([[climate]] tables)
        #[arg(long, value_name = "FILE")]
        suite: PathBuf,
        /// Replica count; overrides [voting] replicas
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..100))]
        replicas: Option<u16>,
        /// Inject this fault into one replica
        #[arg(long, value_enum, value_name = "KIND")]
        fault: Option<FaultKind>,
        /// Index of the replica that gets the fault
        #[arg(
            long = "faulty-replica",
            value_name = "I",
            default_value_t = 1,
            requires = "fault"
        )]
        faulty_replica: usize,
        /// Optional result file
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Compare two result files case by case
    Compare {
        #[arg(value_name = "A")]
        a: PathBuf,
        #[arg(value_name = "B")]
        b: PathBuf,
    },
    /// Validate the config and run the built-in reference cases
    SelfCheck,
}
