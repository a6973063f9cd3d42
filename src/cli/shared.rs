use clap::Args;
use serde::Serialize;

#[derive(Args, Default, Serialize)]
pub struct SharedSettings {
    /// Overwrite an existing output directory
    #[arg(long)]
    pub clobber: bool,

    /// Turn on extra debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print chromosome progress of every evidence reader directly to stderr
    ///
    /// This is for debugging only, and is independent of the log level.
    ///
    #[arg(hide = true, long)]
    pub trace_readers: bool,
}
