//! Read the empirical insert size histogram for one paired-end library
//!

use std::io::{BufRead, BufReader};

use camino::Utf8Path;
use log::info;
use rust_htslib::bgzf;

use crate::errors::{EvidenceError, EvidenceResult};

/// Insert size densities over a contiguous range of insert sizes [start,end]
///
#[derive(Clone, Debug, PartialEq)]
pub struct InsertSizeHistogram {
    pub densities: Vec<f64>,
    pub start: i64,
    pub end: i64,
}

impl InsertSizeHistogram {
    pub fn size(&self) -> usize {
        self.densities.len()
    }
}

/// Parse histogram content with one `insert_size<TAB>density` pair per line
///
/// Insert sizes must be consecutive and increasing.
///
fn parse_histogram<R: BufRead>(reader: R, path: &Utf8Path) -> EvidenceResult<InsertSizeHistogram> {
    let format_error = |line_no: usize, message: String| EvidenceError::Histogram {
        path: path.to_owned(),
        message: format!("line {line_no}: {message}"),
    };

    let mut densities = Vec::new();
    let mut start = 0;
    let mut last_size: Option<i64> = None;
    for (line_index, line) in reader.lines().enumerate() {
        let line_no = line_index + 1;
        let line = line.map_err(|e| EvidenceError::io(path, e))?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let (Some(size_str), Some(density_str)) = (words.next(), words.next()) else {
            return Err(format_error(
                line_no,
                format!("expected 2 columns in '{line}'"),
            ));
        };
        let insert_size = size_str
            .parse::<i64>()
            .map_err(|_| format_error(line_no, format!("invalid insert size '{size_str}'")))?;
        let density = density_str
            .parse::<f64>()
            .map_err(|_| format_error(line_no, format!("invalid density '{density_str}'")))?;

        match last_size {
            None => start = insert_size,
            Some(last) if insert_size != last + 1 => {
                return Err(format_error(
                    line_no,
                    format!("insert size {insert_size} does not follow {last}"),
                ));
            }
            _ => {}
        }
        last_size = Some(insert_size);
        densities.push(density);
    }

    let Some(end) = last_size else {
        return Err(format_error(0, "histogram is empty".to_string()));
    };

    Ok(InsertSizeHistogram {
        densities,
        start,
        end,
    })
}

/// Read insert size histogram from a plain text or bgzipped file
///
pub fn read_histogram(path: &Utf8Path) -> EvidenceResult<InsertSizeHistogram> {
    info!("Reading insert size histogram from file '{path}'");

    let reader = bgzf::Reader::from_path(path)?;
    let histogram = parse_histogram(BufReader::new(reader), path)?;

    info!(
        "Insert size histogram covers sizes {}-{}",
        histogram.start, histogram.end
    );
    Ok(histogram)
}
