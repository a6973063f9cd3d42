//! Utilities pertaining to filesystem and other os-level settings
//!

use camino::Utf8Path;
use simple_error::{SimpleResult, bail};

/// Create a directory path if it does not exist already
///
/// * `label` - used to describe the directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if let Err(e) = std::fs::create_dir_all(dir) {
        bail!("Can't create new {label} directory at '{dir}': {e}");
    }
    Ok(())
}

/// Attempt to increase open file limit to the system's hard limit on *nix-like systems
///
/// Every evidence source holds one open input stream for the length of the run. This is an optional
/// increase so continue through all failure cases without error.
///
/// Returns the soft limit in effect afterward, if it could be read.
///
pub fn attempt_max_open_file_limit() -> Option<u64> {
    use rlimit::Resource;

    let (soft, hard) = Resource::NOFILE.get().ok()?;
    if soft < hard && rlimit::setrlimit(Resource::NOFILE, hard, hard).is_ok() {
        return Some(hard);
    }
    Some(soft)
}
