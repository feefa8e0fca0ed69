// stubgen CLI entry point
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use stubgen_cli::{
    build_locator, failure_lines, load_config, run_batch, scan_type_names, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let report = match &cli.command {
        Commands::Reconstruct { options, types } => {
            let config = load_config(options)?;
            let locator = build_locator(None, &options.classpath)?;
            run_batch(locator, &config, types, options.out.as_deref())?
        }
        Commands::Scan { classes, options } => {
            let config = load_config(options)?;
            let types = scan_type_names(classes)?;
            let locator = build_locator(Some(classes), &options.classpath)?;
            run_batch(locator, &config, &types, options.out.as_deref())?
        }
    };

    for line in failure_lines(&report) {
        eprintln!("{line}");
    }
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
