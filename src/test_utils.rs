//! Shared fixtures for unit tests
//!

use rust_htslib::bam::{self, Header, HeaderView, header};

use crate::bedpe::BedpeRecord;
use crate::breakpoint::BreakPoint;
use crate::distribution::DistributionState;
use crate::evidence_config::{PairThresholds, SharedEvidenceConfig};
use crate::two_interval_evidence::TwoIntervalEvidence;

pub fn get_test_header() -> HeaderView {
    let mut header = Header::new();
    for chrom in ["chr1", "chr2", "chr3"] {
        header.push_record(
            header::HeaderRecord::new(b"SQ")
                .push_tag(b"SN", chrom)
                .push_tag(b"LN", 10000000),
        );
    }
    HeaderView::from_header(&header)
}

/// Build a 10 base alignment record from SAM fields
///
/// `pos` and `mate_pos` are 1-indexed as in SAM text.
///
#[allow(clippy::too_many_arguments)]
pub fn sam_record(
    header: &HeaderView,
    qname: &str,
    flag: u16,
    chrom: &str,
    pos: i64,
    mapq: u8,
    mate_chrom: &str,
    mate_pos: i64,
) -> bam::Record {
    let cigar = if chrom == "*" { "*" } else { "10M" };
    let sam_line = format!(
        "{qname}\t{flag}\t{chrom}\t{pos}\t{mapq}\t{cigar}\t{mate_chrom}\t{mate_pos}\t0\tACGTACGTAC\tDDDDDDDDDD"
    );
    bam::Record::from_sam(header, sam_line.as_bytes()).unwrap()
}

pub fn get_test_distribution() -> DistributionState {
    DistributionState::from_probabilities(&[0.1, 0.2, 0.4, 0.2, 0.1], 0, 4, 3).unwrap()
}

pub fn get_test_config() -> SharedEvidenceConfig {
    SharedEvidenceConfig {
        distribution: get_test_distribution(),
        pair: PairThresholds {
            min_mapping_threshold: 0,
            min_non_overlap: 5,
            insert_mean: 300.0,
            insert_stdev: 30.0,
            discordant_z: 3.0,
            back_distance: 3,
            read_length: 10,
        },
    }
}

/// Deletion breakpoint with 10 base sides starting at the given positions
///
pub fn get_test_breakpoint(
    distro: &DistributionState,
    chrom1: &str,
    start1: i64,
    chrom2: &str,
    start2: i64,
) -> BreakPoint {
    let line = format!(
        "{chrom1}\t{start1}\t{}\t{chrom2}\t{start2}\t{}\ttest\t0\t+\t-\tTYPE:DELETION",
        start1 + 10,
        start2 + 10
    );
    let record = BedpeRecord::from_line(&line).unwrap();
    TwoIntervalEvidence::build(&record, 1, 0)
        .unwrap()
        .get_breakpoint(distro)
}
