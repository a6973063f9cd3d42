use std::fmt;

use crate::distribution::DistributionState;
use crate::errors::MalformedEvidenceRecord;

/// Alignment or breakend strand
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_is_reverse(is_reverse: bool) -> Self {
        if is_reverse {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    /// Parse the strand from the first character of a strand token, such as a BEDPE strand column
    ///
    pub fn from_token(token: &str) -> Result<Self, MalformedEvidenceRecord> {
        match token.as_bytes().first() {
            Some(b'+') => Ok(Strand::Forward),
            Some(b'-') => Ok(Strand::Reverse),
            _ => Err(MalformedEvidenceRecord::InvalidStrand(token.to_string())),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A stranded interval on one chromosome
///
/// Coordinates are zero-indexed and fully closed, [start,end]. Half-open input intervals have
/// their end decremented on ingest, and any display of the interval increments it again.
///
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

impl GenomicInterval {
    /// Create from a half-open [start,end) interval
    ///
    pub fn from_half_open(chrom: &str, start: i64, end: i64, strand: Strand) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end: end - 1,
            strand,
        }
    }

    /// Half-open end coordinate, for display and bed-style output
    pub fn display_end(&self) -> i64 {
        self.end + 1
    }

    pub fn size(&self) -> i64 {
        self.end - self.start + 1
    }
}

impl fmt::Debug for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.chrom, self.start, self.end, self.strand
        )
    }
}

/// One side of a breakpoint, with the ln-probability of the breakpoint at each position of the
/// interval
///
/// `ln_probs[i]` corresponds to position `interval.start + i`, so the probability vector is always
/// the same length as the insert size distribution.
///
#[derive(Clone, Debug, PartialEq)]
pub struct BreakpointInterval {
    pub interval: GenomicInterval,
    pub ln_probs: Vec<f64>,
}

impl BreakpointInterval {
    /// Position of the most probable breakpoint location
    ///
    pub fn max_prob_pos(&self) -> Option<i64> {
        let (index, _) = self
            .ln_probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some(self.interval.start + index as i64)
    }
}

/// Anchor the insert size distribution onto `interval` to produce one side of a breakpoint
///
/// For a forward-strand interval the breakpoint is expected downstream of the interval end, so
/// the distribution starts `back_distance` bases before the end and is laid out in forward order.
/// For a reverse-strand interval the layout is mirrored around the interval start.
///
/// `partner` is the interval on the other side of the breakpoint. It is currently not consulted.
///
pub fn anchor_breakpoint_interval(
    interval: &GenomicInterval,
    _partner: &GenomicInterval,
    distribution: &DistributionState,
) -> BreakpointInterval {
    let size = distribution.size() as i64;
    let back_distance = distribution.back_distance;

    let (start, end) = match interval.strand {
        Strand::Forward => {
            let start = interval.end - back_distance;
            (start, start + size - 1)
        }
        Strand::Reverse => {
            let end = interval.start + back_distance;
            (end - size + 1, end)
        }
    };

    let ln_probs = match interval.strand {
        Strand::Forward => distribution.ln_distro.clone(),
        Strand::Reverse => distribution.ln_distro.iter().rev().copied().collect(),
    };

    BreakpointInterval {
        interval: GenomicInterval {
            chrom: interval.chrom.clone(),
            start,
            end,
            strand: interval.strand,
        },
        ln_probs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_distribution() -> DistributionState {
        DistributionState::from_probabilities(&[0.1, 0.2, 0.4, 0.2, 0.1], 0, 4, 3).unwrap()
    }

    fn interval(start: i64, end: i64, strand: Strand) -> GenomicInterval {
        GenomicInterval {
            chrom: "chr1".to_string(),
            start,
            end,
            strand,
        }
    }

    #[test]
    fn test_strand_from_token() {
        assert_eq!(Strand::from_token("+"), Ok(Strand::Forward));
        assert_eq!(Strand::from_token("-1"), Ok(Strand::Reverse));
        assert_eq!(
            Strand::from_token("."),
            Err(MalformedEvidenceRecord::InvalidStrand(".".to_string()))
        );
        assert!(Strand::from_token("").is_err());
    }

    #[test]
    fn test_half_open_conversion() {
        let x = GenomicInterval::from_half_open("chr2", 10, 20, Strand::Forward);
        assert_eq!(x.end, 19);
        assert_eq!(x.display_end(), 20);
        assert_eq!(x.size(), 10);
    }

    #[test]
    fn test_anchor_forward() {
        let distro = test_distribution();
        let target = interval(90, 100, Strand::Forward);
        let partner = interval(500, 510, Strand::Reverse);
        let bpi = anchor_breakpoint_interval(&target, &partner, &distro);

        assert_eq!(bpi.interval.start, 97);
        assert_eq!(bpi.interval.end, 101);
        assert_eq!(bpi.interval.strand, Strand::Forward);

        let expect = [0.1f64, 0.2, 0.4, 0.2, 0.1];
        assert_eq!(bpi.ln_probs.len(), expect.len());
        for (p, e) in bpi.ln_probs.iter().zip(expect) {
            approx::assert_abs_diff_eq!(*p, e.ln(), epsilon = 1e-12);
        }
        assert_eq!(bpi.max_prob_pos(), Some(99));
    }

    #[test]
    fn test_anchor_reverse() {
        let distro = test_distribution();
        let target = interval(50, 60, Strand::Reverse);
        let partner = interval(10, 20, Strand::Forward);
        let bpi = anchor_breakpoint_interval(&target, &partner, &distro);

        assert_eq!(bpi.interval.end, 53);
        assert_eq!(bpi.interval.start, 49);
        assert_eq!(bpi.interval.strand, Strand::Reverse);

        let expect = [0.1f64, 0.2, 0.4, 0.2, 0.1];
        for (p, e) in bpi.ln_probs.iter().zip(expect.iter().rev()) {
            approx::assert_abs_diff_eq!(*p, e.ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_anchor_reversal_law() {
        let distro =
            DistributionState::from_probabilities(&[0.5, 0.3, 0.1, 0.07, 0.03], 0, 4, 2).unwrap();
        let partner = interval(0, 0, Strand::Forward);
        let fwd = anchor_breakpoint_interval(&interval(80, 100, Strand::Forward), &partner, &distro);
        let rev = anchor_breakpoint_interval(&interval(100, 120, Strand::Reverse), &partner, &distro);

        assert_eq!(fwd.ln_probs.len(), distro.size());
        assert_eq!(rev.ln_probs.len(), distro.size());
        let rev_of_rev = rev.ln_probs.iter().rev().copied().collect::<Vec<_>>();
        assert_eq!(fwd.ln_probs, rev_of_rev);

        // Most probable positions mirror each other around the anchoring read ends
        assert_eq!(fwd.max_prob_pos(), Some(98));
        assert_eq!(rev.max_prob_pos(), Some(102));
    }
}
