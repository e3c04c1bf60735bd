mod cli;
mod error;
mod error_fmt;
mod logging;
mod report;
mod run;

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let _ = color_eyre::install();

    let cfg = match &cli.config {
        Some(path) => redund_config::load_config(path)?,
        None => redund_config::Config::default(),
    };
    cfg.validate().wrap_err("invalid configuration")?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    logging::init_tracing(cli.json, &level, &cfg.logging)?;

    match cli.cmd {
        Commands::Pressure {
            suite,
            readings,
            out,
            peer_out,
        } => {
            let cases = match (suite, readings) {
                (_, Some(csv)) => redund_config::load_pressure_csv(&csv)?,
                (Some(path), None) => redund_config::load_suite(&path)?.pressure,
                (None, None) => eyre::bail!("either --suite or --readings is required"),
            };
            if cases.is_empty() {
                eyre::bail!("no pressure cases to evaluate");
            }
            run::run_pressure(&cfg, &cases, &out, &peer_out, cli.json)
        }
        Commands::Climate {
            suite,
            replicas,
            fault,
            faulty_replica,
            out,
        } => {
            let cases = redund_config::load_suite(&suite)?.climate;
            if cases.is_empty() {
                eyre::bail!("no climate cases in {:?}", suite);
            }
            let replicas = replicas.map_or(cfg.voting.replicas, usize::from);
            let fault = fault.map(|k| (k.to_fault(), faulty_replica));
            run::run_climate(&cfg, &cases, replicas, fault, out.as_deref(), cli.json)
        }
        Commands::Compare { a, b } => run::run_compare(&a, &b, cli.json),
        Commands::SelfCheck => run::run_self_check(&cfg, cli.json),
    }
}
