mod shared;
mod utils;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use const_format::concatcp;
use serde::Serialize;
use simple_error::{SimpleResult, bail};
use sv_evidence::{BedpeParameters, PairEndParameters};
use unwrap::unwrap;

pub use self::shared::SharedSettings;
use self::utils::check_source_filename;

pub const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Parser, Serialize)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    /// Directory for all output (must not already exist unless --clobber is given)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_output"))]
    pub output_dir: Utf8PathBuf,

    /// Paired-end alignment evidence source, as a comma-delimited list of key:value parameters
    ///
    /// Required keys are bam_file, histo_file, mean, stdev, read_length, min_non_overlap,
    /// discordant_z, back_distance, weight and id. The optional key min_mapping_threshold defaults
    /// to 0. The insert size distribution and pair thresholds of the first source are used for all
    /// sources. This option can be given multiple times.
    ///
    #[arg(long = "pe", value_name = "PARAMS", required = true)]
    pub pe_param_strings: Vec<String>,

    /// Two-interval variant record source in BEDPE format, as a comma-delimited list of key:value
    /// parameters
    ///
    /// Required keys are bedpe_file, weight and id. Records must carry a TYPE:DELETION,
    /// TYPE:DUPLICATION or TYPE:INVERSION annotation column. This option can be given multiple
    /// times.
    ///
    #[arg(long = "bedpe", value_name = "PARAMS")]
    pub bedpe_param_strings: Vec<String>,

    /// Read each evidence source to the end in turn, instead of merging all sources one chromosome
    /// at a time
    ///
    #[arg(long)]
    pub whole_file: bool,

    /// Log and skip malformed BEDPE records instead of stopping
    #[arg(long)]
    pub skip_malformed: bool,

    /// Write each BEDPE record as parsed to a diagnostic file in the output directory
    #[arg(long)]
    pub print_evidence: bool,

    /// Parsed from pe_param_strings
    #[arg(skip)]
    pub pe_params: Vec<PairEndParameters>,

    /// Parsed from bedpe_param_strings
    #[arg(skip)]
    pub bedpe_params: Vec<BedpeParameters>,
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{label} already exists: \"{dirname}\"");
    }
    Ok(())
}

fn parse_pe_source(source_index: usize, param_str: &str) -> SimpleResult<PairEndParameters> {
    let source = format!("--pe source {}", source_index + 1);
    let params = match PairEndParameters::from_param_string(param_str) {
        Ok(x) => x,
        Err(e) => bail!("{source}: {e}"),
    };

    let missing = params.validate();
    if !missing.is_empty() {
        bail!(
            "{source} is missing required parameters: {}",
            missing.join(", ")
        );
    }

    check_source_filename(params.bam_file.as_deref(), "alignment", &source)?;
    check_source_filename(params.histo_file.as_deref(), "insert size histogram", &source)?;

    if params.stdev.is_some_and(|x| x <= 0.0) {
        bail!("{source}: stdev must be greater than 0");
    }
    if params.back_distance.is_some_and(|x| x < 0) {
        bail!("{source}: back_distance must not be negative");
    }
    Ok(params)
}

fn parse_bedpe_source(source_index: usize, param_str: &str) -> SimpleResult<BedpeParameters> {
    let source = format!("--bedpe source {}", source_index + 1);
    let params = match BedpeParameters::from_param_string(param_str) {
        Ok(x) => x,
        Err(e) => bail!("{source}: {e}"),
    };

    let missing = params.validate();
    if !missing.is_empty() {
        bail!(
            "{source} is missing required parameters: {}",
            missing.join(", ")
        );
    }

    check_source_filename(params.bedpe_file.as_deref(), "BEDPE", &source)?;
    Ok(params)
}

/// Validate settings and update parameters that can't be processed by clap
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    if settings.pe_param_strings.is_empty() {
        bail!("At least one --pe source is required");
    }

    settings.pe_params = settings
        .pe_param_strings
        .iter()
        .enumerate()
        .map(|(i, x)| parse_pe_source(i, x))
        .collect::<SimpleResult<Vec<_>>>()?;

    settings.bedpe_params = settings
        .bedpe_param_strings
        .iter()
        .enumerate()
        .map(|(i, x)| parse_bedpe_source(i, x))
        .collect::<SimpleResult<Vec<_>>>()?;

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}

/// Write settings out in json format
pub fn write_settings(output_dir: &Utf8Path, settings: &Settings) {
    use log::info;

    let filename = output_dir.join(SETTINGS_FILENAME);

    info!("Writing settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create settings json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &settings),
        "Unable to write settings json file: '{filename}'"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFiles {
        _dir: tempfile::TempDir,
        bam: String,
        histo: String,
        bedpe: String,
    }

    fn get_test_files() -> TestFiles {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, "").unwrap();
            path.to_str().unwrap().to_string()
        };
        let bam = touch("sample.bam");
        let histo = touch("sample.histo");
        let bedpe = touch("calls.bedpe");
        TestFiles {
            _dir: dir,
            bam,
            histo,
            bedpe,
        }
    }

    fn pe_string(files: &TestFiles) -> String {
        format!(
            "bam_file:{},histo_file:{},mean:300,stdev:30,read_length:100,min_non_overlap:20,\
             discordant_z:3,back_distance:10,weight:1,id:1",
            files.bam, files.histo
        )
    }

    fn parse_args(args: &[&str]) -> Settings {
        let mut full_args = vec!["sv-evidence"];
        full_args.extend_from_slice(args);
        Settings::try_parse_from(full_args).unwrap()
    }

    #[test]
    fn test_validate_settings() {
        let files = get_test_files();
        let pe = pe_string(&files);
        let bedpe = format!("bedpe_file:{},weight:2,id:3", files.bedpe);
        let settings = parse_args(&["--pe", &pe, "--bedpe", &bedpe, "--whole-file"]);
        assert_eq!(settings.output_dir, "sv-evidence_output");

        let settings = validate_and_fix_settings_impl(settings).unwrap();
        assert_eq!(settings.pe_params.len(), 1);
        assert_eq!(settings.pe_params[0].mean, Some(300.0));
        assert_eq!(settings.bedpe_params[0].id, Some(3));
        assert!(settings.whole_file);
    }

    #[test]
    fn test_missing_parameters() {
        let files = get_test_files();
        let pe = format!("bam_file:{},histo_file:{}", files.bam, files.histo);
        let settings = parse_args(&["--pe", &pe]);
        let msg = validate_and_fix_settings_impl(settings)
            .err()
            .unwrap()
            .to_string();
        assert!(msg.contains("--pe source 1 is missing required parameters: mean, stdev"));
    }

    #[test]
    fn test_unknown_parameter() {
        let files = get_test_files();
        let pe = pe_string(&files) + ",insert:3";
        let settings = parse_args(&["--pe", &pe]);
        assert!(validate_and_fix_settings_impl(settings).is_err());
    }

    #[test]
    fn test_missing_input_file() {
        let files = get_test_files();
        let pe = pe_string(&files);
        let settings = parse_args(&["--pe", &pe, "--bedpe", "bedpe_file:./not_there,weight:1,id:1"]);
        let msg = validate_and_fix_settings_impl(settings)
            .err()
            .unwrap()
            .to_string();
        assert!(msg.contains("--bedpe source 1"));
    }

    #[test]
    fn test_pe_source_required() {
        assert!(Settings::try_parse_from(["sv-evidence"]).is_err());
    }
}
