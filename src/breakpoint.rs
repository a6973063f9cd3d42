use std::fmt;

use crate::breakpoint_interval::BreakpointInterval;
use crate::two_interval_evidence::TwoIntervalEvidence;

/// SV type implied by the breakend orientation pattern
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum VariantType {
    Deletion,
    Duplication,
    Inversion,
}

/// Read pair which produced a breakpoint
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairEvidence {
    pub qname: String,
    pub sample_id: usize,
    pub source_id: i32,
}

/// Source evidence of a breakpoint, retained for downstream attribution
///
#[derive(Clone, Debug, PartialEq)]
pub enum EvidenceOrigin {
    TwoInterval(TwoIntervalEvidence),
    Pair(PairEvidence),
}

impl EvidenceOrigin {
    pub fn sample_id(&self) -> Option<usize> {
        match self {
            EvidenceOrigin::TwoInterval(_) => None,
            EvidenceOrigin::Pair(x) => Some(x.sample_id),
        }
    }
}

/// A breakpoint observation with both sides anchored
///
/// Ownership passes to the clustering engine.
///
#[derive(Clone, PartialEq)]
pub struct BreakPoint {
    pub interval_l: BreakpointInterval,
    pub interval_r: BreakpointInterval,
    pub variant_type: VariantType,
    pub weight: i32,
    pub evidence: EvidenceOrigin,
}

impl fmt::Debug for BreakPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BreakPoint: {} l: {:?} r: {:?} weight: {} evidence: {:?}",
            self.variant_type,
            self.interval_l.interval,
            self.interval_r.interval,
            self.weight,
            self.evidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_type_text() {
        assert_eq!("DELETION".parse::<VariantType>(), Ok(VariantType::Deletion));
        assert_eq!(
            "DUPLICATION".parse::<VariantType>(),
            Ok(VariantType::Duplication)
        );
        assert_eq!("INVERSION".parse::<VariantType>(), Ok(VariantType::Inversion));
        assert!("deletion".parse::<VariantType>().is_err());
        assert!("TRANSLOCATION".parse::<VariantType>().is_err());
        assert_eq!(VariantType::Inversion.to_string(), "INVERSION");
    }
}
