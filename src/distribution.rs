use crate::errors::{EvidenceError, EvidenceResult};
use crate::insert_size_histogram::InsertSizeHistogram;

/// Breakpoint location distribution shared by every evidence source in one run
///
/// Built once from the insert size histogram and the back distance setting, then only read.
/// Clients hold it by shared reference.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionState {
    /// ln-transformed probability of the breakpoint at each offset of an anchored interval
    pub ln_distro: Vec<f64>,

    /// Insert size corresponding to the first distribution entry
    pub start: i64,

    /// Insert size corresponding to the last distribution entry
    pub end: i64,

    /// Distance into the read from its breakpoint-facing end where the distribution is anchored
    pub back_distance: i64,
}

impl DistributionState {
    /// Create from raw (not log-transformed) probabilities
    ///
    /// The probabilities are normalized before log transformation.
    ///
    pub fn from_probabilities(
        probs: &[f64],
        start: i64,
        end: i64,
        back_distance: i64,
    ) -> EvidenceResult<Self> {
        if probs.is_empty() {
            return Err(EvidenceError::Distribution(
                "distribution is empty".to_string(),
            ));
        }
        if let Some(p) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(EvidenceError::Distribution(format!(
                "invalid probability value {p}"
            )));
        }
        let sum = probs.iter().sum::<f64>();
        if sum <= 0.0 {
            return Err(EvidenceError::Distribution(
                "distribution has no probability mass".to_string(),
            ));
        }

        let ln_distro = probs.iter().map(|p| (p / sum).ln()).collect();
        Ok(Self {
            ln_distro,
            start,
            end,
            back_distance,
        })
    }

    /// Convert the insert size histogram into the distribution of breakpoint locations
    ///
    /// A breakpoint at offset `j` from the anchor is supported by any fragment with an insert
    /// of at least `j`, so each entry is the reverse cumulative sum of the histogram densities.
    ///
    pub fn from_histogram(
        histogram: &InsertSizeHistogram,
        back_distance: i64,
    ) -> EvidenceResult<Self> {
        let mut survival = histogram.densities.clone();
        let mut sum = 0.0;
        for p in survival.iter_mut().rev() {
            sum += *p;
            *p = sum;
        }
        Self::from_probabilities(&survival, histogram.start, histogram.end, back_distance)
    }

    pub fn size(&self) -> usize {
        self.ln_distro.len()
    }
}
