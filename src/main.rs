mod cli;
mod globals;
mod ingest;
mod logger;
mod os_utils;
mod run_stats;

use std::{error, process};

use hhmmss::Hhmmss;
use log::{debug, error, info};

use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::ingest::run_ingest;
use crate::logger::setup_output_dir_and_logger;

/// Run system configuration steps prior to starting any other program logic
///
/// Returns the open file limit in effect, if known
///
fn system_configuration_prelude() -> Option<u64> {
    os_utils::attempt_max_open_file_limit()
}

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!(
        "Reading {} paired-end and {} BEDPE evidence sources",
        settings.pe_params.len(),
        settings.bedpe_params.len()
    );

    let start = std::time::Instant::now();

    run_ingest(settings)?;

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let open_file_limit = system_configuration_prelude();

    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        &settings.output_dir,
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Some(limit) = open_file_limit {
        debug!("Open file limit: {limit}");
    }

    if let Err(err) = run(&settings) {
        error!("{err}");
        process::exit(exitcode::DATAERR);
    }
}
