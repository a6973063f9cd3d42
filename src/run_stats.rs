//! Track stats for the whole evidence ingestion run
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use sv_evidence::PairEvidenceStats;
use unwrap::unwrap;

pub const RUN_STATS_FILENAME: &str = "run_stats.json";

#[derive(Default, Serialize)]
pub struct PairSourceStats {
    pub id: i32,
    pub sample_id: usize,
    pub bam_file: String,

    /// Records with both the read and its mate mapped, before any pair filtering
    pub forwarded_record_count: usize,

    /// Reads whose mate was never found in the stream
    pub unpaired_read_count: usize,

    pub pair_stats: PairEvidenceStats,
}

#[derive(Default, Serialize)]
pub struct BedpeSourceStats {
    pub id: i32,
    pub sample_id: usize,
    pub bedpe_file: String,
    pub record_count: usize,
    pub malformed_record_count: usize,
}

#[derive(Serialize)]
pub struct ChromosomeStats {
    pub chrom: String,
    pub breakpoint_count: usize,
}

#[derive(Default, Serialize)]
pub struct IngestRunStats {
    pub pair_sources: Vec<PairSourceStats>,
    pub bedpe_sources: Vec<BedpeSourceStats>,

    /// Breakpoints inserted while stepping through each chromosome, in merge order
    ///
    /// Empty when sources are read in whole-file mode
    pub chromosomes: Vec<ChromosomeStats>,

    pub total_breakpoint_count: usize,
}

/// Write run_stats structure out in json format
pub fn write_ingest_run_stats(output_dir: &Utf8Path, run_stats: &IngestRunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &run_stats),
        "Unable to write run statistics json file: '{filename}'"
    );
}
