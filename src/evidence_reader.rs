//! Common protocol for streaming evidence sources, and the driver which merges many sources one
//! chromosome at a time
//!

use std::collections::HashSet;

use log::{debug, info};

use crate::breakpoint_index::BreakpointIndex;
use crate::chrom_order::ChromOrder;
use crate::errors::{EvidenceError, EvidenceResult};
use crate::evidence_config::SharedEvidenceConfig;

/// Lifecycle of an evidence reader
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReaderState {
    /// Required parameters are missing
    Unconfigured,

    /// Parameters are complete, input is not open
    Configured,

    /// Input is open and the first record is buffered
    Open,

    /// At least one record has been consumed
    Streaming,

    /// Input is closed, the reader can't be reused
    Closed,
}

impl ReaderState {
    /// Error for an operation attempted in the wrong state
    pub fn invalid(self, expected: &'static str) -> EvidenceError {
        EvidenceError::InvalidReaderState {
            actual: self,
            expected,
        }
    }

    pub fn is_readable(self) -> bool {
        matches!(self, ReaderState::Open | ReaderState::Streaming)
    }
}

/// A source of breakpoint evidence which can be consumed in full, or stepped through one
/// chromosome at a time in the source's sort order
///
pub trait EvidenceReader {
    /// Sample id drawn for this reader at construction
    fn sample_id(&self) -> usize;

    fn state(&self) -> ReaderState;

    /// Open the input and buffer the first record
    fn initialize(&mut self) -> EvidenceResult<()>;

    /// True if a record is buffered
    fn has_next(&self) -> bool;

    /// Chromosome of the buffered record, or None if the input is exhausted
    fn current_chromosome(&self) -> Option<&str>;

    /// Process the buffered record and all following records on `chrom`
    ///
    /// Stops at the first record on a different chromosome, or at the end of the input. Returns
    /// the number of breakpoints inserted into `index`.
    ///
    fn step_through_chromosome(
        &mut self,
        chrom: &str,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize>;

    /// Process all remaining records
    fn drain(
        &mut self,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize>;

    /// Close the input
    fn terminate(&mut self) -> EvidenceResult<()>;
}

/// Advance all readers together one chromosome at a time
///
/// The next chromosome is the earliest in `chrom_order` of the chromosomes buffered across all
/// readers. Every reader is stepped through that chromosome, then `on_chrom_complete` is called
/// with the chromosome name and the total breakpoints inserted for it, so that per-chromosome
/// working state can be processed and released before moving on. Each chromosome is completed
/// once. A reader which returns to a completed chromosome is not sorted in `chrom_order`, and
/// stops the merge with an error.
///
/// Readers must already be initialized. Returns the total number of breakpoints inserted.
///
pub fn process_readers_by_chromosome<I, F>(
    readers: &mut [&mut dyn EvidenceReader],
    chrom_order: &ChromOrder,
    config: &SharedEvidenceConfig,
    index: &mut I,
    mut on_chrom_complete: F,
) -> EvidenceResult<usize>
where
    I: BreakpointIndex,
    F: FnMut(&str, usize, &mut I),
{
    let mut completed_chroms = HashSet::new();
    let mut total = 0;
    loop {
        let Some(chrom) = chrom_order
            .first(readers.iter().filter_map(|x| x.current_chromosome()))
            .map(|x| x.to_string())
        else {
            break;
        };
        if completed_chroms.contains(&chrom) {
            return Err(EvidenceError::ChromosomeOutOfOrder(chrom));
        }

        debug!("Stepping all evidence readers through chromosome {chrom}");
        let mut chrom_total = 0;
        for reader in readers.iter_mut() {
            if reader.has_next() {
                chrom_total += reader.step_through_chromosome(&chrom, config, &mut *index)?;
            }
        }
        on_chrom_complete(&chrom, chrom_total, index);
        total += chrom_total;
        completed_chroms.insert(chrom);
    }

    info!(
        "Finished processing all evidence readers over {} chromosomes",
        completed_chroms.len()
    );
    Ok(total)
}
