use simple_error::{SimpleResult, bail};

/// Check an input filename taken from an evidence source parameter list
///
/// Assumes no logger has been configured yet
///
pub fn check_source_filename(filename: Option<&str>, label: &str, source: &str) -> SimpleResult<()> {
    let Some(filename) = filename.filter(|x| !x.is_empty()) else {
        bail!("{source} does not specify a {label} file");
    };
    let path = std::path::Path::new(&filename);
    if !path.exists() {
        bail!("Can't find {label} file for {source}: '{filename}'");
    }
    if !path.is_file() {
        bail!("{label} file path for {source} does not appear to be a file: '{filename}'");
    }
    Ok(())
}
