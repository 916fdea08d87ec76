extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

mod analyze;
mod cli;
mod config;
mod filter;
mod io;
mod quality;
mod reader;
mod record;

use cli::Cli;
use config::Config;

fn try_main(cli: &Cli) -> Result<()> {
    let config = Config::from_cli(cli)?;
    config.log();

    let summary = analyze::run(&config)?;
    summary.log();

    info!("gmNano-LQ complete");
    Ok(())
}

fn main() {
    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    // status reporting is only shown in verbose mode, unless overridden by RUST_LOG
    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    if let Err(err) = try_main(&cli) {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
