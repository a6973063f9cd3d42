//! Configuration bundle for one paired-end alignment evidence source
//!

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParameterError;

/// Parse a value for parameter `key`
pub(crate) fn parse_param_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParameterError> {
    value.trim().parse::<T>().map_err(|_| ParameterError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Path parameters set to an empty string are treated as unset
pub(crate) fn parse_path_value(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Split a comma-delimited `key:value` parameter string into key/value pairs
///
pub(crate) fn split_param_string(
    param_str: &str,
) -> impl Iterator<Item = Result<(&str, &str), ParameterError>> {
    param_str
        .split(',')
        .filter(|x| !x.is_empty())
        .map(|x| {
            x.split_once(':')
                .ok_or_else(|| ParameterError::MissingValue(x.to_string()))
        })
}

/// Settings for one paired-end evidence reader
///
/// Every field except `min_mapping_threshold` is required before the reader can be opened. Unset
/// fields are represented as None rather than by a sentinel value, so zero remains a valid setting.
///
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PairEndParameters {
    /// Coordinate sorted alignment file in BAM, CRAM or SAM format
    pub bam_file: Option<String>,

    /// Empirical insert size histogram for the library
    pub histo_file: Option<String>,

    /// Insert size mean
    pub mean: Option<f64>,

    /// Insert size standard deviation
    pub stdev: Option<f64>,

    pub read_length: Option<u32>,

    /// Minimum number of non-overlapping bases between the two reads of a pair
    pub min_non_overlap: Option<u32>,

    /// Number of standard deviations above the mean insert size for a pair to be discordant
    pub discordant_z: Option<f64>,

    pub back_distance: Option<i64>,

    /// Weight given to each breakpoint from this source
    pub weight: Option<i32>,

    /// Identifier of this source
    pub id: Option<i32>,

    /// Minimum mapping quality of both reads of a pair, 0 disables the filter
    #[serde(default)]
    pub min_mapping_threshold: u8,
}

impl PairEndParameters {
    /// Names of the required parameters, in reporting order
    pub const REQUIRED_KEYS: [&'static str; 10] = [
        "bam_file",
        "histo_file",
        "mean",
        "stdev",
        "read_length",
        "min_non_overlap",
        "discordant_z",
        "back_distance",
        "weight",
        "id",
    ];

    /// Parse the command-line form `key:value,key:value,...`
    ///
    pub fn from_param_string(param_str: &str) -> Result<Self, ParameterError> {
        let mut params = Self::default();
        for kv in split_param_string(param_str) {
            let (key, value) = kv?;
            params.set(key, value)?;
        }
        Ok(params)
    }

    /// Set one parameter by name
    ///
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ParameterError> {
        match key {
            "bam_file" => self.bam_file = parse_path_value(value),
            "histo_file" => self.histo_file = parse_path_value(value),
            "mean" => self.mean = Some(parse_param_value(key, value)?),
            "stdev" => self.stdev = Some(parse_param_value(key, value)?),
            "read_length" => self.read_length = Some(parse_param_value(key, value)?),
            "min_non_overlap" => self.min_non_overlap = Some(parse_param_value(key, value)?),
            "discordant_z" => self.discordant_z = Some(parse_param_value(key, value)?),
            "back_distance" => self.back_distance = Some(parse_param_value(key, value)?),
            "weight" => self.weight = Some(parse_param_value(key, value)?),
            "id" => self.id = Some(parse_param_value(key, value)?),
            "min_mapping_threshold" => self.min_mapping_threshold = parse_param_value(key, value)?,
            _ => return Err(ParameterError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Names of the required parameters which are still unset
    ///
    /// An empty result means the parameters are complete.
    ///
    pub fn validate(&self) -> Vec<&'static str> {
        let is_set = [
            self.bam_file.is_some(),
            self.histo_file.is_some(),
            self.mean.is_some(),
            self.stdev.is_some(),
            self.read_length.is_some(),
            self.min_non_overlap.is_some(),
            self.discordant_z.is_some(),
            self.back_distance.is_some(),
            self.weight.is_some(),
            self.id.is_some(),
        ];
        Self::REQUIRED_KEYS
            .iter()
            .zip(is_set)
            .filter(|(_, x)| !x)
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_empty()
    }
}
