//! Streaming reader of externally called two-interval variant records
//!

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};

use crate::bedpe::BedpeFileReader;
use crate::bedpe_parameters::BedpeParameters;
use crate::breakpoint_index::BreakpointIndex;
use crate::chrom_order::ChromOrder;
use crate::errors::{EvidenceError, EvidenceResult, ParameterError};
use crate::evidence_config::SharedEvidenceConfig;
use crate::evidence_reader::{EvidenceReader, ReaderState};
use crate::sample_id::SampleIdGenerator;
use crate::two_interval_evidence::TwoIntervalEvidence;

/// Reads BEDPE records and inserts one breakpoint per record
///
/// Each record is grouped under the chromosome of whichever side comes later in the reader's
/// chromosome order, and its breakpoint is keyed on that side. Stepping through chromosomes in step
/// with alignment readers requires the file to be sorted on that chromosome, in the same order.
///
pub struct BedpeEvidenceReader {
    params: BedpeParameters,
    state: ReaderState,
    sample_id: usize,

    /// Log and skip malformed records instead of failing
    skip_malformed: bool,

    chrom_order: ChromOrder,

    reader: Option<BedpeFileReader>,

    /// Buffered lookahead evidence
    next: Option<TwoIntervalEvidence>,

    /// Optional destination for the diagnostic text of each consumed record
    evidence_out: Option<Box<dyn Write>>,

    record_count: usize,
    malformed_record_count: usize,
}

impl BedpeEvidenceReader {
    pub fn new(params: BedpeParameters, sample_ids: &SampleIdGenerator) -> Self {
        let state = if params.validate().is_empty() {
            ReaderState::Configured
        } else {
            ReaderState::Unconfigured
        };
        Self {
            params,
            state,
            sample_id: sample_ids.next_id(),
            skip_malformed: false,
            chrom_order: ChromOrder::default(),
            reader: None,
            next: None,
            evidence_out: None,
            record_count: 0,
            malformed_record_count: 0,
        }
    }

    pub fn unconfigured(sample_ids: &SampleIdGenerator) -> Self {
        Self::new(BedpeParameters::default(), sample_ids)
    }

    pub fn with_skip_malformed(mut self, skip_malformed: bool) -> Self {
        self.skip_malformed = skip_malformed;
        self
    }

    /// Group records by chromosome in `chrom_order`, normally the alignment header order
    pub fn with_chrom_order(mut self, chrom_order: ChromOrder) -> Self {
        self.chrom_order = chrom_order;
        self
    }

    /// Write the diagnostic line of each record to `out` as it is consumed
    pub fn with_evidence_output(mut self, out: Box<dyn Write>) -> Self {
        self.evidence_out = Some(out);
        self
    }

    /// Set one parameter by name
    ///
    /// Parameters can only be changed before the input is opened.
    ///
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ParameterError> {
        if !matches!(
            self.state,
            ReaderState::Unconfigured | ReaderState::Configured
        ) {
            return Err(ParameterError::ReaderNotConfigurable {
                key: key.to_string(),
                state: self.state,
            });
        }
        self.params.set(key, value)?;
        self.state = if self.params.validate().is_empty() {
            ReaderState::Configured
        } else {
            ReaderState::Unconfigured
        };
        Ok(())
    }

    pub fn validate(&self) -> Vec<&'static str> {
        self.params.validate()
    }

    pub fn parameters(&self) -> &BedpeParameters {
        &self.params
    }

    /// Start reading from an already opened BEDPE stream
    ///
    pub fn initialize_with_reader(&mut self, reader: BedpeFileReader) -> EvidenceResult<()> {
        if self.state != ReaderState::Configured {
            return Err(self.state.invalid("a configured reader"));
        }
        self.reader = Some(reader);
        self.state = ReaderState::Open;
        self.advance()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn malformed_record_count(&self) -> usize {
        self.malformed_record_count
    }

    fn path(&self) -> Utf8PathBuf {
        self.reader
            .as_ref()
            .map(|x| x.path().to_owned())
            .unwrap_or_default()
    }

    /// Parse records until the next valid one is buffered or the file ends
    ///
    fn advance(&mut self) -> EvidenceResult<()> {
        self.next = None;
        let weight = self.params.weight.unwrap_or_default();
        let id = self.params.id.unwrap_or_default();
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };

        loop {
            let error = match reader.read_record() {
                Ok(None) => return Ok(()),
                Ok(Some(record)) => match TwoIntervalEvidence::build(&record, weight, id) {
                    Ok(evidence) => {
                        self.next = Some(evidence);
                        return Ok(());
                    }
                    Err(source) => EvidenceError::MalformedRecord {
                        path: reader.path().to_owned(),
                        line: reader.line_number(),
                        source,
                    },
                },
                Err(e @ EvidenceError::MalformedRecord { .. }) => e,
                Err(e) => return Err(e),
            };

            if !self.skip_malformed {
                return Err(error);
            }
            warn!("Skipping {error}");
            self.malformed_record_count += 1;
        }
    }

    fn process_records(
        &mut self,
        chrom: Option<&str>,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize> {
        if !self.state.is_readable() {
            return Err(self.state.invalid("an open reader"));
        }

        let mut breakpoint_count = 0;
        while let Some(evidence) = self.next.as_ref() {
            if chrom.is_some_and(|c| evidence.group_chrom(&self.chrom_order) != c) {
                break;
            }
            self.state = ReaderState::Streaming;
            if let Some(out) = self.evidence_out.as_mut() {
                evidence
                    .print_evidence(out)
                    .map_err(|e| EvidenceError::io("evidence output", e))?;
            }
            evidence.insert_breakpoint(&config.distribution, &self.chrom_order, &mut *index);
            breakpoint_count += 1;
            self.record_count += 1;
            self.advance()?;
        }
        Ok(breakpoint_count)
    }
}

impl EvidenceReader for BedpeEvidenceReader {
    fn sample_id(&self) -> usize {
        self.sample_id
    }

    fn state(&self) -> ReaderState {
        self.state
    }

    fn initialize(&mut self) -> EvidenceResult<()> {
        if self.state != ReaderState::Configured {
            return Err(self.state.invalid("a configured reader"));
        }
        let bedpe_file = self.params.bedpe_file.clone().unwrap_or_default();
        match BedpeFileReader::from_path(Utf8Path::new(&bedpe_file)) {
            Ok(reader) => self.initialize_with_reader(reader),
            Err(e) => {
                self.state = ReaderState::Closed;
                Err(e)
            }
        }
    }

    fn has_next(&self) -> bool {
        self.next.is_some()
    }

    fn current_chromosome(&self) -> Option<&str> {
        self.next.as_ref().map(|x| x.group_chrom(&self.chrom_order))
    }

    fn step_through_chromosome(
        &mut self,
        chrom: &str,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize> {
        self.process_records(Some(chrom), config, index)
    }

    fn drain(
        &mut self,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize> {
        self.process_records(None, config, index)
    }

    fn terminate(&mut self) -> EvidenceResult<()> {
        if self.state == ReaderState::Closed {
            return Err(self.state.invalid("a reader which is not closed"));
        }
        if let Some(out) = self.evidence_out.as_mut() {
            out.flush().map_err(|e| EvidenceError::io("evidence output", e))?;
        }
        if self.malformed_record_count > 0 {
            info!(
                "Skipped {} malformed records in '{}'",
                self.malformed_record_count,
                self.path()
            );
        }
        self.reader = None;
        self.next = None;
        self.state = ReaderState::Closed;
        Ok(())
    }
}
