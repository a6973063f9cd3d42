//! Run logger setup
//!

use camino::Utf8Path;

use crate::cli;
use crate::globals::PROGRAM_NAME;
use crate::os_utils::create_dir_all;

/// Log to stderr and to a log file in `output_dir`
///
/// If debug is true set the default logger to the more verbose debug level. Library log output
/// from htslib bindings is limited to warnings in either case.
///
fn setup_logger(output_dir: &Utf8Path, debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let log_filename = output_dir.join(PROGRAM_NAME.to_string() + ".log");
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .level_for("rust_htslib", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

/// Check and create output directory, then setup logger to write there
///
/// Output directory problems are reported as command-line errors, since no logger is available.
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    if let Err(msg) = cli::check_novel_dirname(output_dir, "Output directory") {
        if !clobber {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }

    if let Err(msg) = create_dir_all(output_dir, "output") {
        eprintln!("{msg}");
        std::process::exit(exitcode::CANTCREAT);
    }

    if let Err(e) = setup_logger(output_dir, debug) {
        eprintln!("Unable to setup logger in output directory '{output_dir}': {e}");
        std::process::exit(exitcode::CANTCREAT);
    }
}
