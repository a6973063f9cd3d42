//! Conversion of mapped read pairs into breakpoint evidence
//!

use std::collections::HashMap;
use std::rc::Rc;

use rust_htslib::bam;
use serde::{Deserialize, Serialize};

use crate::breakpoint::{BreakPoint, EvidenceOrigin, PairEvidence, VariantType};
use crate::breakpoint_index::BreakpointIndex;
use crate::breakpoint_interval::{GenomicInterval, Strand, anchor_breakpoint_interval};
use crate::evidence_config::{PairThresholds, SharedEvidenceConfig};

/// Reader-local attribution attached to every breakpoint from one evidence source
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceAttribution {
    pub weight: i32,
    pub id: i32,
    pub sample_id: usize,
}

/// The first read of a pair, held until its mate is found in the alignment stream
///
#[derive(Clone, Debug)]
pub struct CachedRead {
    pub tid: i32,
    pub interval: GenomicInterval,
    pub passes_mapq: bool,
}

/// Reads awaiting their mate, keyed by read name
///
#[derive(Default)]
pub struct PairingCache {
    data: HashMap<Vec<u8>, CachedRead>,
}

impl PairingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn insert(&mut self, qname: &[u8], read: CachedRead) {
        self.data.insert(qname.to_vec(), read);
    }

    pub fn get(&self, qname: &[u8]) -> Option<&CachedRead> {
        self.data.get(qname)
    }

    pub fn remove(&mut self, qname: &[u8]) -> Option<CachedRead> {
        self.data.remove(qname)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Builds breakpoint evidence from alignment records with both the read and its mate mapped
///
pub trait PairEvidenceHandler {
    /// Process one alignment record, inserting any resulting breakpoints into `index`
    ///
    /// Returns the number of breakpoints inserted.
    ///
    fn process_pair(
        &mut self,
        record: &bam::Record,
        ref_names: &[String],
        pairing_cache: &mut PairingCache,
        index: &mut dyn BreakpointIndex,
        attribution: &SourceAttribution,
        config: &SharedEvidenceConfig,
    ) -> usize;

    /// Pair classification counts, for handlers which track them
    fn stats(&self) -> Option<&PairEvidenceStats> {
        None
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PairEvidenceStats {
    pub filtered_record_count: usize,
    pub complete_pair_count: usize,
    pub low_mapq_pair_count: usize,
    pub overlapping_pair_count: usize,
    pub concordant_pair_count: usize,
    pub deletion_count: usize,
    pub duplication_count: usize,
    pub inversion_count: usize,
}

impl PairEvidenceStats {
    pub fn discordant_pair_count(&self) -> usize {
        self.deletion_count + self.duplication_count + self.inversion_count
    }
}

/// Outcome of comparing the two reads of a complete pair
#[derive(Debug, PartialEq)]
enum PairClass {
    Overlapping,
    Concordant,
    Discordant(VariantType),
}

/// Classify a pair from its two read intervals, where `read_l` precedes `read_r` in the
/// alignment sort order
///
fn classify_pair(
    read_l: &GenomicInterval,
    read_r: &GenomicInterval,
    thresholds: &PairThresholds,
) -> PairClass {
    let same_chrom = read_l.chrom == read_r.chrom;
    if same_chrom {
        let overlap = std::cmp::min(read_l.end, read_r.end)
            - std::cmp::max(read_l.start, read_r.start)
            + 1;
        let max_overlap = thresholds.read_length as i64 - thresholds.min_non_overlap as i64;
        if overlap > max_overlap {
            return PairClass::Overlapping;
        }
    }

    match (read_l.strand, read_r.strand) {
        (Strand::Forward, Strand::Reverse) => {
            if !same_chrom {
                return PairClass::Discordant(VariantType::Deletion);
            }
            let insert_size = read_r.end - read_l.start + 1;
            if insert_size as f64 > thresholds.max_concordant_insert_size() {
                PairClass::Discordant(VariantType::Deletion)
            } else {
                PairClass::Concordant
            }
        }
        (Strand::Reverse, Strand::Forward) => PairClass::Discordant(VariantType::Duplication),
        _ => PairClass::Discordant(VariantType::Inversion),
    }
}

fn get_read_interval(record: &bam::Record, ref_names: &[String]) -> Option<GenomicInterval> {
    let chrom = ref_names.get(usize::try_from(record.tid()).ok()?)?;
    Some(GenomicInterval {
        chrom: chrom.clone(),
        start: record.pos(),
        end: record.cigar().end_pos() - 1,
        strand: Strand::from_is_reverse(record.is_reverse()),
    })
}

/// Default pair evidence handler, producing a breakpoint from each discordant read pair
///
/// The first read of each pair is cached by name. When the mate arrives, the pair is classified
/// by strand orientation, read overlap and insert size.
///
#[derive(Default)]
pub struct DiscordantPairBuilder {
    pub stats: PairEvidenceStats,
}

impl DiscordantPairBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_filtered(record: &bam::Record) -> bool {
        record.is_secondary()
            || record.is_supplementary()
            || record.is_duplicate()
            || record.is_quality_check_failed()
    }
}

impl PairEvidenceHandler for DiscordantPairBuilder {
    fn process_pair(
        &mut self,
        record: &bam::Record,
        ref_names: &[String],
        pairing_cache: &mut PairingCache,
        index: &mut dyn BreakpointIndex,
        attribution: &SourceAttribution,
        config: &SharedEvidenceConfig,
    ) -> usize {
        if Self::is_filtered(record) {
            self.stats.filtered_record_count += 1;
            return 0;
        }

        let Some(interval) = get_read_interval(record, ref_names) else {
            self.stats.filtered_record_count += 1;
            return 0;
        };
        let passes_mapq = record.mapq() >= config.pair.min_mapping_threshold;

        let qname = record.qname();
        let Some(mate) = pairing_cache.remove(qname) else {
            pairing_cache.insert(
                qname,
                CachedRead {
                    tid: record.tid(),
                    interval,
                    passes_mapq,
                },
            );
            return 0;
        };

        self.stats.complete_pair_count += 1;
        if !(passes_mapq && mate.passes_mapq) {
            self.stats.low_mapq_pair_count += 1;
            return 0;
        }

        let (read_l, read_r) = if (mate.tid, mate.interval.start) <= (record.tid(), interval.start)
        {
            (mate.interval, interval)
        } else {
            (interval, mate.interval)
        };

        let variant_type = match classify_pair(&read_l, &read_r, &config.pair) {
            PairClass::Overlapping => {
                self.stats.overlapping_pair_count += 1;
                return 0;
            }
            PairClass::Concordant => {
                self.stats.concordant_pair_count += 1;
                return 0;
            }
            PairClass::Discordant(x) => x,
        };

        match variant_type {
            VariantType::Deletion => self.stats.deletion_count += 1,
            VariantType::Duplication => self.stats.duplication_count += 1,
            VariantType::Inversion => self.stats.inversion_count += 1,
        }

        let distribution = &config.distribution;
        let breakpoint = BreakPoint {
            interval_l: anchor_breakpoint_interval(&read_l, &read_r, distribution),
            interval_r: anchor_breakpoint_interval(&read_r, &read_l, distribution),
            variant_type,
            weight: attribution.weight,
            evidence: EvidenceOrigin::Pair(PairEvidence {
                qname: String::from_utf8_lossy(qname).to_string(),
                sample_id: attribution.sample_id,
                source_id: attribution.id,
            }),
        };
        // Keyed on the current read, which closes the pair in the input sort order
        let key = breakpoint.interval_r.interval.clone();
        index.insert(&key, Rc::new(breakpoint));
        1
    }

    fn stats(&self) -> Option<&PairEvidenceStats> {
        Some(&self.stats)
    }
}
