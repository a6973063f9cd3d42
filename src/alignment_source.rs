//! Alignment record sources for the paired-end evidence reader
//!

use camino::Utf8Path;
use log::info;
use rust_htslib::bam::{self, Read};

use crate::errors::EvidenceResult;

/// A stream of alignment records in coordinate-sorted order
///
pub trait AlignmentSource {
    /// Full text of the alignment file header
    fn header_text(&self) -> String;

    /// Reference names indexed by the numeric reference id used in alignment records
    fn reference_names(&self) -> Vec<String>;

    /// Read the next record into `record`
    ///
    /// Returns None at the end of the stream.
    ///
    fn read_next(&mut self, record: &mut bam::Record) -> Option<rust_htslib::errors::Result<()>>;
}

fn get_header_reference_names(header: &bam::HeaderView) -> Vec<String> {
    header
        .target_names()
        .into_iter()
        .map(|x| String::from_utf8_lossy(x).to_string())
        .collect()
}

/// Alignment source over a BAM, CRAM or SAM file
///
pub struct BamAlignmentSource {
    reader: bam::Reader,
}

impl BamAlignmentSource {
    pub fn from_path(path: &Utf8Path) -> EvidenceResult<Self> {
        info!("Opening alignment file '{path}'");
        let reader = bam::Reader::from_path(path)?;
        Ok(Self { reader })
    }
}

impl AlignmentSource for BamAlignmentSource {
    fn header_text(&self) -> String {
        String::from_utf8_lossy(self.reader.header().as_bytes()).to_string()
    }

    fn reference_names(&self) -> Vec<String> {
        get_header_reference_names(self.reader.header())
    }

    fn read_next(&mut self, record: &mut bam::Record) -> Option<rust_htslib::errors::Result<()>> {
        self.reader.read(record)
    }
}

/// Alignment source over records already held in memory
///
pub struct InMemoryAlignmentSource {
    header: bam::HeaderView,
    records: std::vec::IntoIter<bam::Record>,
}

impl InMemoryAlignmentSource {
    pub fn new(header: bam::HeaderView, records: Vec<bam::Record>) -> Self {
        Self {
            header,
            records: records.into_iter(),
        }
    }
}

impl AlignmentSource for InMemoryAlignmentSource {
    fn header_text(&self) -> String {
        String::from_utf8_lossy(self.header.as_bytes()).to_string()
    }

    fn reference_names(&self) -> Vec<String> {
        get_header_reference_names(&self.header)
    }

    fn read_next(&mut self, record: &mut bam::Record) -> Option<rust_htslib::errors::Result<()>> {
        let next = self.records.next()?;
        *record = next;
        Some(Ok(()))
    }
}
