use camino::Utf8Path;
use log::info;

use crate::distribution::DistributionState;
use crate::errors::{EvidenceError, EvidenceResult};
use crate::insert_size_histogram::read_histogram;
use crate::pair_end_parameters::PairEndParameters;

/// Read pair thresholds used to select discordant pairs
///
#[derive(Clone, Debug, PartialEq)]
pub struct PairThresholds {
    pub min_mapping_threshold: u8,
    pub min_non_overlap: u32,
    pub insert_mean: f64,
    pub insert_stdev: f64,
    pub discordant_z: f64,
    pub back_distance: i64,
    pub read_length: u32,
}

impl PairThresholds {
    /// Insert sizes above this value are discordant
    pub fn max_concordant_insert_size(&self) -> f64 {
        self.insert_mean + self.discordant_z * self.insert_stdev
    }
}

/// Run-wide evidence settings shared by all readers and record adapters
///
/// Committed from a single paired-end parameter set before any evidence is processed. When
/// several sources are combined in one run, only the committing source's settings apply.
///
#[derive(Clone, Debug, PartialEq)]
pub struct SharedEvidenceConfig {
    pub distribution: DistributionState,
    pub pair: PairThresholds,
}

impl SharedEvidenceConfig {
    /// Build the shared settings from a complete parameter set, reading the histogram file
    ///
    pub fn from_pair_end_parameters(params: &PairEndParameters) -> EvidenceResult<Self> {
        let missing = params.validate();
        if !missing.is_empty() {
            return Err(EvidenceError::MissingParameters(missing));
        }

        let (
            Some(histo_file),
            Some(mean),
            Some(stdev),
            Some(read_length),
            Some(min_non_overlap),
            Some(discordant_z),
            Some(back_distance),
        ) = (
            params.histo_file.as_deref(),
            params.mean,
            params.stdev,
            params.read_length,
            params.min_non_overlap,
            params.discordant_z,
            params.back_distance,
        )
        else {
            return Err(EvidenceError::MissingParameters(params.validate()));
        };

        let histogram = read_histogram(Utf8Path::new(histo_file))?;
        let distribution = DistributionState::from_histogram(&histogram, back_distance)?;

        let pair = PairThresholds {
            min_mapping_threshold: params.min_mapping_threshold,
            min_non_overlap,
            insert_mean: mean,
            insert_stdev: stdev,
            discordant_z,
            back_distance,
            read_length,
        };

        info!(
            "Committed evidence settings: distribution size {}, back distance {}, max concordant insert size {:.1}",
            distribution.size(),
            back_distance,
            pair.max_concordant_insert_size()
        );

        Ok(Self { distribution, pair })
    }
}
