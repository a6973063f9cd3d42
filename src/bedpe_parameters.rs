//! Configuration bundle for one BEDPE evidence source
//!

use serde::{Deserialize, Serialize};

use crate::errors::ParameterError;
use crate::pair_end_parameters::{parse_param_value, parse_path_value, split_param_string};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BedpeParameters {
    /// Two-interval variant records in BEDPE format, plain text or bgzipped
    pub bedpe_file: Option<String>,

    /// Weight given to each breakpoint from this source
    pub weight: Option<i32>,

    /// Identifier of this source
    pub id: Option<i32>,
}

impl BedpeParameters {
    pub const REQUIRED_KEYS: [&'static str; 3] = ["bedpe_file", "weight", "id"];

    pub fn from_param_string(param_str: &str) -> Result<Self, ParameterError> {
        let mut params = Self::default();
        for kv in split_param_string(param_str) {
            let (key, value) = kv?;
            params.set(key, value)?;
        }
        Ok(params)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ParameterError> {
        match key {
            "bedpe_file" => self.bedpe_file = parse_path_value(value),
            "weight" => self.weight = Some(parse_param_value(key, value)?),
            "id" => self.id = Some(parse_param_value(key, value)?),
            _ => return Err(ParameterError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn validate(&self) -> Vec<&'static str> {
        let is_set = [
            self.bedpe_file.is_some(),
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
}
