//! BEDPE two-interval record parsing
//!

use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use rust_htslib::bgzf;

use crate::errors::{EvidenceError, EvidenceResult, MalformedEvidenceRecord};

/// One BEDPE record
///
/// Coordinates are in the half-open convention of the file. All raw columns are retained in
/// `fields` so that free-form annotations can be scanned.
///
#[derive(Clone, Debug, PartialEq)]
pub struct BedpeRecord {
    pub chrom1: String,
    pub start1: i64,
    pub end1: i64,
    pub chrom2: String,
    pub start2: i64,
    pub end2: i64,
    pub name: String,
    pub score: String,
    pub strand1: String,
    pub strand2: String,
    pub fields: Vec<String>,
}

const MIN_BEDPE_COLUMNS: usize = 10;

impl BedpeRecord {
    /// Parse a tab-delimited BEDPE line
    ///
    pub fn from_line(line: &str) -> Result<Self, MalformedEvidenceRecord> {
        let fields = line
            .trim_end_matches(['\n', '\r'])
            .split('\t')
            .map(|x| x.to_string())
            .collect::<Vec<_>>();
        if fields.len() < MIN_BEDPE_COLUMNS {
            return Err(MalformedEvidenceRecord::TooFewColumns(fields.len()));
        }

        fn parse_pos(
            fields: &[String],
            index: usize,
            label: &'static str,
        ) -> Result<i64, MalformedEvidenceRecord> {
            fields[index]
                .parse::<i64>()
                .map_err(|_| MalformedEvidenceRecord::InvalidCoordinate {
                    field: label,
                    value: fields[index].clone(),
                })
        }

        Ok(Self {
            chrom1: fields[0].clone(),
            start1: parse_pos(&fields, 1, "start1")?,
            end1: parse_pos(&fields, 2, "end1")?,
            chrom2: fields[3].clone(),
            start2: parse_pos(&fields, 4, "start2")?,
            end2: parse_pos(&fields, 5, "end2")?,
            name: fields[6].clone(),
            score: fields[7].clone(),
            strand1: fields[8].clone(),
            strand2: fields[9].clone(),
            fields,
        })
    }

    /// Annotation columns following the ten standard BEDPE columns
    ///
    pub fn annotations(&self) -> &[String] {
        &self.fields[MIN_BEDPE_COLUMNS..]
    }
}

fn is_header_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Streaming BEDPE reader over a plain text or bgzipped file
///
pub struct BedpeFileReader {
    path: Utf8PathBuf,
    reader: Box<dyn BufRead>,
    line_number: usize,
    buffer: String,
}

impl BedpeFileReader {
    pub fn from_path(path: &Utf8Path) -> EvidenceResult<Self> {
        info!("Opening BEDPE file '{path}'");
        let reader = bgzf::Reader::from_path(path)?;
        Ok(Self::new(path, Box::new(BufReader::new(reader))))
    }

    /// `path` is only used to label error messages
    pub fn new(path: &Utf8Path, reader: Box<dyn BufRead>) -> Self {
        Self {
            path: path.to_owned(),
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Line number of the most recently returned record
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record, skipping blank and header lines
    ///
    /// Returns None at the end of the file. A malformed line is reported with its line number, and
    /// reading may continue with the following line.
    ///
    pub fn read_record(&mut self) -> EvidenceResult<Option<BedpeRecord>> {
        loop {
            self.buffer.clear();
            let bytes = self
                .reader
                .read_line(&mut self.buffer)
                .map_err(|e| EvidenceError::io(&self.path, e))?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.is_empty() || is_header_line(line) {
                continue;
            }

            return BedpeRecord::from_line(line).map(Some).map_err(|source| {
                EvidenceError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line_number,
                    source,
                }
            });
        }
    }
}
