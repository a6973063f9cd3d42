//! Adapter from externally called two-interval variant records to breakpoints
//!

use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

use crate::bedpe::BedpeRecord;
use crate::breakpoint::{BreakPoint, EvidenceOrigin, VariantType};
use crate::breakpoint_index::{BreakpointIndex, ClusterEngine};
use crate::breakpoint_interval::{GenomicInterval, Strand, anchor_breakpoint_interval};
use crate::chrom_order::ChromOrder;
use crate::distribution::DistributionState;
use crate::errors::MalformedEvidenceRecord;

const TYPE_PREFIX: &str = "TYPE:";

/// A two-sided variant record in canonical side order
///
/// Sides are ordered so that reciprocal representations of the same event are identical:
/// `side_l.chrom >= side_r.chrom`, and `side_l.start <= side_r.start` on the same chromosome.
///
#[derive(Clone, Debug, PartialEq)]
pub struct TwoIntervalEvidence {
    pub side_l: GenomicInterval,
    pub side_r: GenomicInterval,
    pub variant_type: VariantType,
    pub weight: i32,
    pub id: i32,

    /// Record label written in the id column of the diagnostic output
    pub name: String,
}

/// Put the two sides of a record into canonical order
///
fn canonical_side_order(
    a: GenomicInterval,
    b: GenomicInterval,
) -> (GenomicInterval, GenomicInterval) {
    match a.chrom.cmp(&b.chrom) {
        Ordering::Greater => (a, b),
        Ordering::Less => (b, a),
        Ordering::Equal => {
            if a.start > b.start {
                (b, a)
            } else {
                (a, b)
            }
        }
    }
}

/// Find the variant type from the record's `TYPE:<value>` annotation
///
/// Only the annotation columns following the ten fixed BEDPE columns are searched.
///
/// Repeated annotations are accepted only when they name the same type.
///
fn parse_variant_type(fields: &[String]) -> Result<VariantType, MalformedEvidenceRecord> {
    let mut found: Option<(VariantType, &str)> = None;
    for type_str in fields.iter().filter_map(|x| x.strip_prefix(TYPE_PREFIX)) {
        let variant_type = type_str
            .parse::<VariantType>()
            .map_err(|_| MalformedEvidenceRecord::UnsupportedType(type_str.to_string()))?;
        if let Some((last_type, last_str)) = found {
            if last_type != variant_type {
                return Err(MalformedEvidenceRecord::ConflictingType(
                    last_str.to_string(),
                    type_str.to_string(),
                ));
            }
        }
        found = Some((variant_type, type_str));
    }
    found
        .map(|(x, _)| x)
        .ok_or(MalformedEvidenceRecord::MissingType)
}

impl TwoIntervalEvidence {
    pub fn build(
        record: &BedpeRecord,
        weight: i32,
        id: i32,
    ) -> Result<Self, MalformedEvidenceRecord> {
        let a = GenomicInterval::from_half_open(
            &record.chrom1,
            record.start1,
            record.end1,
            Strand::from_token(&record.strand1)?,
        );
        let b = GenomicInterval::from_half_open(
            &record.chrom2,
            record.start2,
            record.end2,
            Strand::from_token(&record.strand2)?,
        );
        let (side_l, side_r) = canonical_side_order(a, b);
        let variant_type = parse_variant_type(record.annotations())?;

        Ok(Self {
            side_l,
            side_r,
            variant_type,
            weight,
            id,
            name: record.name.clone(),
        })
    }

    /// Anchor the distribution on each side independently to build the breakpoint
    ///
    pub fn get_breakpoint(&self, distribution: &DistributionState) -> BreakPoint {
        BreakPoint {
            interval_l: anchor_breakpoint_interval(&self.side_l, &self.side_r, distribution),
            interval_r: anchor_breakpoint_interval(&self.side_r, &self.side_l, distribution),
            variant_type: self.variant_type,
            weight: self.weight,
            evidence: EvidenceOrigin::TwoInterval(self.clone()),
        }
    }

    /// Diagnostic BEDPE line for this evidence, including the trailing newline
    ///
    pub fn to_text(&self, score: i32) -> String {
        let l = &self.side_l;
        let r = &self.side_r;
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            l.chrom,
            l.start,
            l.display_end(),
            r.chrom,
            r.start,
            r.display_end(),
            self.name,
            score,
            l.strand,
            r.strand
        )
    }

    pub fn print_evidence<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.to_text(0).as_bytes())
    }

    /// Build the evidence and its breakpoint from one record, and pass the breakpoint directly to
    /// the clustering engine
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn ingest(
        record: &BedpeRecord,
        left_index: &mut dyn BreakpointIndex,
        right_index: &mut dyn BreakpointIndex,
        weight: i32,
        id: i32,
        distribution: &DistributionState,
        engine: &mut dyn ClusterEngine,
    ) -> Result<(), MalformedEvidenceRecord> {
        let evidence = Self::build(record, weight, id)?;
        engine.cluster(evidence.get_breakpoint(distribution), left_index, right_index);
        Ok(())
    }

    /// Chromosome of the side which closes this event in `chrom_order`
    ///
    pub fn group_chrom(&self, chrom_order: &ChromOrder) -> &str {
        &chrom_order.closing_side(&self.side_l, &self.side_r).chrom
    }

    /// Build the breakpoint and insert it into `index`, keyed by the interval on the closing side
    ///
    pub fn insert_breakpoint(
        &self,
        distribution: &DistributionState,
        chrom_order: &ChromOrder,
        index: &mut dyn BreakpointIndex,
    ) {
        let breakpoint = self.get_breakpoint(distribution);
        let key = chrom_order
            .closing_side(&breakpoint.interval_l.interval, &breakpoint.interval_r.interval)
            .clone();
        index.insert(&key, Rc::new(breakpoint));
    }
}
