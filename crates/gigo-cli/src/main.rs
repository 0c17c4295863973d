//! gigo CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use gigo::GigoError;
use gigo_cli::{Args, error_adapter::to_reportables};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(args.log_level)
        .init();

    info!(command:? = args.command, files = args.files.len(); "Starting gigo");
    debug!(args:?; "Parsed arguments");

    match gigo_cli::run(&args) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Log every reportable of `err` as a rendered miette report.
fn report(err: &GigoError) {
    let reporter = miette::GraphicalReportHandler::new();
    for reportable in to_reportables(err) {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &reportable)
            .expect("Writing to String buffer is infallible");
        error!("{writer}");
    }
}
