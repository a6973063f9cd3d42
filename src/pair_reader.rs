//! Streaming reader of paired-end alignment evidence
//!

use camino::Utf8Path;
use log::{debug, info};
use rust_htslib::bam;

use crate::alignment_source::{AlignmentSource, BamAlignmentSource};
use crate::breakpoint_index::BreakpointIndex;
use crate::errors::{EvidenceResult, ParameterError};
use crate::evidence_config::SharedEvidenceConfig;
use crate::evidence_reader::{EvidenceReader, ReaderState};
use crate::log_utils::debug_msg;
use crate::pair_end_parameters::PairEndParameters;
use crate::pair_evidence::{
    DiscordantPairBuilder, PairEvidenceHandler, PairEvidenceStats, PairingCache,
    SourceAttribution,
};
use crate::sample_id::SampleIdGenerator;

/// Reads a coordinate-sorted alignment file and forwards mapped read pairs to a pair evidence
/// handler
///
/// A single buffered record serves both iteration modes. The whole input can be consumed with
/// `drain`, or it can be consumed one chromosome at a time with `step_through_chromosome`, so
/// that many readers can be merged in genome order while only holding per-chromosome state.
///
pub struct PairEvidenceReader {
    params: PairEndParameters,
    state: ReaderState,
    sample_id: usize,

    source: Option<Box<dyn AlignmentSource>>,
    header_text: String,
    ref_names: Vec<String>,

    /// Buffered lookahead record, valid only when `have_next` is true
    record: bam::Record,
    have_next: bool,

    pairing_cache: PairingCache,
    handler: Box<dyn PairEvidenceHandler>,

    /// Number of records with both the read and its mate mapped, forwarded to the handler
    forwarded_record_count: usize,

    /// Print per-chromosome progress for this reader directly to stderr
    trace: bool,
}

impl PairEvidenceReader {
    /// Create a reader from a parameter set, drawing its sample id from `sample_ids`
    ///
    pub fn new(params: PairEndParameters, sample_ids: &SampleIdGenerator) -> Self {
        let state = if params.is_complete() {
            ReaderState::Configured
        } else {
            ReaderState::Unconfigured
        };
        Self {
            params,
            state,
            sample_id: sample_ids.next_id(),
            source: None,
            header_text: String::new(),
            ref_names: Vec::new(),
            record: bam::Record::new(),
            have_next: false,
            pairing_cache: PairingCache::new(),
            handler: Box::new(DiscordantPairBuilder::new()),
            forwarded_record_count: 0,
            trace: false,
        }
    }

    /// Create a reader with no parameters set, to be configured with `set`
    ///
    pub fn unconfigured(sample_ids: &SampleIdGenerator) -> Self {
        Self::new(PairEndParameters::default(), sample_ids)
    }

    /// Replace the default discordant pair handler
    pub fn with_handler(mut self, handler: Box<dyn PairEvidenceHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
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
        self.state = if self.params.is_complete() {
            ReaderState::Configured
        } else {
            ReaderState::Unconfigured
        };
        Ok(())
    }

    /// Names of the required parameters which are still unset
    pub fn validate(&self) -> Vec<&'static str> {
        self.params.validate()
    }

    pub fn parameters(&self) -> &PairEndParameters {
        &self.params
    }

    /// Build the run-wide evidence settings from this reader's parameters
    ///
    /// Must be called before any evidence is processed. When several readers are combined in one
    /// run, the settings of the committing reader apply to all of them.
    ///
    pub fn commit_to_shared_state(&self) -> EvidenceResult<SharedEvidenceConfig> {
        info!(
            "Committing evidence settings from paired-end source {}",
            self.params.id.unwrap_or_default()
        );
        SharedEvidenceConfig::from_pair_end_parameters(&self.params)
    }

    /// Start reading from an already opened alignment source
    ///
    pub fn initialize_with_source(
        &mut self,
        source: Box<dyn AlignmentSource>,
    ) -> EvidenceResult<()> {
        if self.state != ReaderState::Configured {
            return Err(self.state.invalid("a configured reader"));
        }
        self.header_text = source.header_text();
        self.ref_names = source.reference_names();
        self.source = Some(source);
        self.state = ReaderState::Open;

        info!(
            "Opened alignment input for sample {} with {} reference sequences",
            self.sample_id,
            self.ref_names.len()
        );

        self.advance()
    }

    pub fn header_text(&self) -> &str {
        &self.header_text
    }

    pub fn reference_names(&self) -> &[String] {
        &self.ref_names
    }

    pub fn forwarded_record_count(&self) -> usize {
        self.forwarded_record_count
    }

    /// Pair classification counts from the pair handler, if it tracks them
    pub fn pair_stats(&self) -> Option<&PairEvidenceStats> {
        self.handler.stats()
    }

    /// Number of reads still waiting for their mate
    pub fn unpaired_read_count(&self) -> usize {
        self.pairing_cache.len()
    }

    fn attribution(&self) -> SourceAttribution {
        SourceAttribution {
            weight: self.params.weight.unwrap_or_default(),
            id: self.params.id.unwrap_or_default(),
            sample_id: self.sample_id,
        }
    }

    /// Read the next record into the lookahead buffer
    ///
    /// A record without a reference id ends the stream, since all remaining records in a sorted
    /// file are unplaced.
    ///
    fn advance(&mut self) -> EvidenceResult<()> {
        let Some(source) = self.source.as_mut() else {
            self.have_next = false;
            return Ok(());
        };
        match source.read_next(&mut self.record) {
            None => {
                self.have_next = false;
            }
            Some(Err(e)) => {
                self.have_next = false;
                return Err(e.into());
            }
            Some(Ok(())) => {
                self.have_next = self.record.tid() >= 0;
            }
        }
        Ok(())
    }

    /// Forward the buffered record to the pair handler if both the read and its mate are mapped
    ///
    fn forward_current(
        &mut self,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> usize {
        if self.record.is_unmapped() || self.record.is_mate_unmapped() {
            return 0;
        }
        self.forwarded_record_count += 1;
        let attribution = self.attribution();
        self.handler.process_pair(
            &self.record,
            &self.ref_names,
            &mut self.pairing_cache,
            index,
            &attribution,
            config,
        )
    }

    /// Consume buffered records until the input ends, or until the buffered record is not on
    /// `chrom` if a chromosome is given
    ///
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
        while self.have_next {
            if chrom.is_some_and(|c| self.current_chromosome() != Some(c)) {
                break;
            }
            self.state = ReaderState::Streaming;
            breakpoint_count += self.forward_current(config, &mut *index);
            self.advance()?;
        }
        Ok(breakpoint_count)
    }
}

impl EvidenceReader for PairEvidenceReader {
    fn sample_id(&self) -> usize {
        self.sample_id
    }

    fn state(&self) -> ReaderState {
        self.state
    }

    /// Open the alignment file and buffer the first record
    ///
    /// Failure to open is final, the reader is closed and can't be retried.
    ///
    fn initialize(&mut self) -> EvidenceResult<()> {
        if self.state != ReaderState::Configured {
            return Err(self.state.invalid("a configured reader"));
        }
        let bam_file = self.params.bam_file.clone().unwrap_or_default();
        match BamAlignmentSource::from_path(Utf8Path::new(&bam_file)) {
            Ok(source) => self.initialize_with_source(Box::new(source)),
            Err(e) => {
                self.state = ReaderState::Closed;
                Err(e)
            }
        }
    }

    fn has_next(&self) -> bool {
        self.have_next
    }

    fn current_chromosome(&self) -> Option<&str> {
        if !self.have_next {
            return None;
        }
        let tid = usize::try_from(self.record.tid()).ok()?;
        self.ref_names.get(tid).map(|x| x.as_str())
    }

    fn step_through_chromosome(
        &mut self,
        chrom: &str,
        config: &SharedEvidenceConfig,
        index: &mut dyn BreakpointIndex,
    ) -> EvidenceResult<usize> {
        debug_msg!(
            self.trace,
            "Sample {} stepping through chromosome {chrom}",
            self.sample_id
        );
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
        if !self.pairing_cache.is_empty() {
            debug!(
                "Sample {} closed with {} reads missing their mate",
                self.sample_id,
                self.pairing_cache.len()
            );
        }
        self.source = None;
        self.have_next = false;
        self.pairing_cache.clear();
        self.state = ReaderState::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::alignment_source::InMemoryAlignmentSource;
    use crate::breakpoint_index::ChromBreakpointIndex;
    use crate::errors::EvidenceError;
    use crate::test_utils::{get_test_config, get_test_header, sam_record};

    /// Handler which records the name of every forwarded read
    struct RecordingHandler {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl PairEvidenceHandler for RecordingHandler {
        fn process_pair(
            &mut self,
            record: &bam::Record,
            _ref_names: &[String],
            _pairing_cache: &mut PairingCache,
            _index: &mut dyn BreakpointIndex,
            _attribution: &SourceAttribution,
            _config: &SharedEvidenceConfig,
        ) -> usize {
            self.seen
                .borrow_mut()
                .push(String::from_utf8_lossy(record.qname()).to_string());
            0
        }
    }

    fn complete_params() -> PairEndParameters {
        PairEndParameters::from_param_string(
            "bam_file:./not_there.bam,histo_file:not_there.histo,mean:300,stdev:30,\
             read_length:10,min_non_overlap:5,discordant_z:3,back_distance:3,weight:1,id:4",
        )
        .unwrap()
    }

    /// Reader over in-memory records with a recording handler
    fn get_recording_reader(
        records: Vec<bam::Record>,
        header: bam::HeaderView,
    ) -> (PairEvidenceReader, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handler = RecordingHandler { seen: seen.clone() };
        let mut reader = PairEvidenceReader::new(complete_params(), &SampleIdGenerator::new())
            .with_handler(Box::new(handler));
        reader
            .initialize_with_source(Box::new(InMemoryAlignmentSource::new(header, records)))
            .unwrap();
        (reader, seen)
    }

    fn chrom_sync_records(header: &bam::HeaderView) -> Vec<bam::Record> {
        vec![
            sam_record(header, "a", 97, "chr1", 100, 60, "chr2", 100),
            sam_record(header, "b", 97, "chr1", 200, 60, "chr3", 100),
            sam_record(header, "c", 97, "chr2", 100, 60, "chr1", 100),
            sam_record(header, "d", 97, "chr2", 200, 60, "chr3", 100),
            sam_record(header, "e", 97, "chr3", 100, 60, "chr1", 200),
        ]
    }

    #[test]
    fn test_step_through_chromosome() {
        let header = get_test_header();
        let records = chrom_sync_records(&header);
        let (mut reader, seen) = get_recording_reader(records, header);
        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();

        assert_eq!(reader.state(), ReaderState::Open);
        assert!(reader.has_next());
        assert_eq!(reader.current_chromosome(), Some("chr1"));

        reader
            .step_through_chromosome("chr1", &config, &mut index)
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
        assert_eq!(reader.current_chromosome(), Some("chr2"));
        assert_eq!(reader.state(), ReaderState::Streaming);

        // Stepping through a chromosome other than the current one consumes nothing
        reader
            .step_through_chromosome("chr3", &config, &mut index)
            .unwrap();
        assert_eq!(seen.borrow().len(), 2);

        reader
            .step_through_chromosome("chr2", &config, &mut index)
            .unwrap();
        assert_eq!(reader.current_chromosome(), Some("chr3"));
        reader
            .step_through_chromosome("chr3", &config, &mut index)
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["a", "b", "c", "d", "e"]);
        assert!(!reader.has_next());
        assert_eq!(reader.current_chromosome(), None);
        assert_eq!(reader.forwarded_record_count(), 5);
    }

    #[test]
    fn test_drain() {
        let header = get_test_header();
        let records = chrom_sync_records(&header);
        let (mut reader, seen) = get_recording_reader(records, header);
        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();

        reader
            .step_through_chromosome("chr1", &config, &mut index)
            .unwrap();
        reader.drain(&config, &mut index).unwrap();
        assert_eq!(*seen.borrow(), vec!["a", "b", "c", "d", "e"]);
        assert!(!reader.has_next());
    }

    #[test]
    fn test_unmapped_records() {
        let header = get_test_header();
        let records = vec![
            // mate unmapped
            sam_record(&header, "a", 105, "chr1", 100, 60, "=", 100),
            sam_record(&header, "b", 97, "chr1", 200, 60, "chr3", 100),
            // unplaced unmapped read ends the stream
            sam_record(&header, "u", 77, "*", 0, 0, "*", 0),
            sam_record(&header, "c", 97, "chr2", 100, 60, "chr1", 100),
        ];
        let (mut reader, seen) = get_recording_reader(records, header);
        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();

        reader
            .step_through_chromosome("chr1", &config, &mut index)
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["b"]);
        assert!(!reader.has_next());
        assert_eq!(reader.current_chromosome(), None);

        reader.drain(&config, &mut index).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_discordant_pairs_reach_index() {
        let header = get_test_header();
        let records = vec![
            sam_record(&header, "del", 97, "chr1", 1001, 60, "=", 5001),
            sam_record(&header, "ok", 99, "chr1", 2001, 60, "=", 2101),
            sam_record(&header, "ok", 147, "chr1", 2101, 60, "=", 2001),
            sam_record(&header, "del", 145, "chr1", 5001, 60, "=", 1001),
            sam_record(&header, "lone", 97, "chr2", 101, 60, "chr3", 101),
        ];
        let ids = SampleIdGenerator::new();
        let _ = ids.next_id();
        let mut reader = PairEvidenceReader::new(complete_params(), &ids);
        assert_eq!(reader.sample_id(), 1);
        reader
            .initialize_with_source(Box::new(InMemoryAlignmentSource::new(header, records)))
            .unwrap();

        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();
        let n = reader
            .step_through_chromosome("chr1", &config, &mut index)
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(index.chrom_count("chr1"), 1);
        assert_eq!(reader.unpaired_read_count(), 0);
        let stats = reader.pair_stats().unwrap();
        assert_eq!(stats.deletion_count, 1);
        assert_eq!(stats.concordant_pair_count, 1);

        let n = reader.drain(&config, &mut index).unwrap();
        assert_eq!(n, 0);
        assert_eq!(reader.unpaired_read_count(), 1);

        reader.terminate().unwrap();
        assert_eq!(reader.unpaired_read_count(), 0);
        assert_eq!(reader.state(), ReaderState::Closed);
    }

    #[test]
    fn test_configuration_states() {
        let ids = SampleIdGenerator::new();
        let mut reader = PairEvidenceReader::unconfigured(&ids);
        assert_eq!(reader.state(), ReaderState::Unconfigured);
        assert_eq!(reader.validate().len(), 10);
        assert_eq!(reader.sample_id(), 0);

        assert!(matches!(
            reader.initialize(),
            Err(EvidenceError::InvalidReaderState {
                actual: ReaderState::Unconfigured,
                ..
            })
        ));

        assert_eq!(
            reader.set("not_a_param", "1"),
            Err(ParameterError::UnknownKey("not_a_param".to_string()))
        );

        let params = complete_params();
        for key in PairEndParameters::REQUIRED_KEYS {
            assert_eq!(reader.state(), ReaderState::Unconfigured);
            let value = match key {
                "bam_file" => params.bam_file.clone().unwrap(),
                "histo_file" => params.histo_file.clone().unwrap(),
                _ => "1".to_string(),
            };
            reader.set(key, &value).unwrap();
        }
        assert!(reader.validate().is_empty());
        assert_eq!(reader.state(), ReaderState::Configured);

        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();
        assert!(matches!(
            reader.drain(&config, &mut index),
            Err(EvidenceError::InvalidReaderState { .. })
        ));
    }

    #[test]
    fn test_open_failure_is_final() {
        let mut reader = PairEvidenceReader::new(complete_params(), &SampleIdGenerator::new());
        assert!(reader.initialize().is_err());
        assert_eq!(reader.state(), ReaderState::Closed);
        assert!(reader.initialize().is_err());
        assert!(!reader.has_next());
    }

    #[test]
    fn test_commit_missing_parameters() {
        let reader = PairEvidenceReader::unconfigured(&SampleIdGenerator::new());
        assert!(matches!(
            reader.commit_to_shared_state(),
            Err(EvidenceError::MissingParameters(x)) if x.len() == 10
        ));
    }

    #[test]
    fn test_set_after_open() {
        let header = get_test_header();
        let records = chrom_sync_records(&header);
        let (mut reader, _) = get_recording_reader(records, header);
        assert_eq!(reader.state(), ReaderState::Open);

        let result = reader.set("weight", "7");
        assert_eq!(
            result,
            Err(ParameterError::ReaderNotConfigurable {
                key: "weight".to_string(),
                state: ReaderState::Open,
            })
        );
        assert_eq!(reader.parameters().weight, Some(1));
        assert_eq!(reader.state(), ReaderState::Open);
    }

    #[test]
    fn test_closed_reader_is_not_reusable() {
        let header = get_test_header();
        let records = chrom_sync_records(&header);
        let (mut reader, _) = get_recording_reader(records, header);
        let config = get_test_config();
        let mut index = ChromBreakpointIndex::new();

        reader.terminate().unwrap();
        assert!(!reader.has_next());
        assert!(reader
            .step_through_chromosome("chr1", &config, &mut index)
            .is_err());
        assert!(reader.terminate().is_err());
        assert_eq!(
            reader.set("mean", "100"),
            Err(ParameterError::ReaderNotConfigurable {
                key: "mean".to_string(),
                state: ReaderState::Closed,
            })
        );
        assert_eq!(reader.parameters().mean, Some(300.0));
    }
}
