//! > **Breakpoint evidence ingestion for paired-end structural variant calling**
//!
//! Converts discordant read pairs from coordinate-sorted alignment files, and externally called
//! two-interval (BEDPE) variant records, into probability-weighted breakpoint intervals for a
//! downstream clustering engine.
//!

pub use crate::alignment_source::*;
pub use crate::bedpe::*;
pub use crate::bedpe_parameters::*;
pub use crate::bedpe_reader::*;
pub use crate::breakpoint::*;
pub use crate::breakpoint_index::*;
pub use crate::breakpoint_interval::*;
pub use crate::chrom_order::*;
pub use crate::distribution::*;
pub use crate::errors::*;
pub use crate::evidence_config::*;
pub use crate::evidence_reader::*;
pub use crate::insert_size_histogram::*;
pub use crate::pair_end_parameters::*;
pub use crate::pair_evidence::*;
pub use crate::pair_reader::*;
pub use crate::sample_id::*;
pub use crate::two_interval_evidence::*;

pub mod alignment_source;
pub mod bedpe;
pub mod bedpe_parameters;
pub mod bedpe_reader;
pub mod breakpoint;
pub mod breakpoint_index;
pub mod breakpoint_interval;
pub mod chrom_order;
pub mod distribution;
pub mod errors;
pub mod evidence_config;
pub mod evidence_reader;
pub mod insert_size_histogram;
mod log_utils;
pub mod pair_end_parameters;
pub mod pair_evidence;
pub mod pair_reader;
pub mod sample_id;
pub mod two_interval_evidence;

#[cfg(test)]
mod test_utils;
