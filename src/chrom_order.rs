//! Chromosome sort order shared by all evidence sources in a merge
//!

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::breakpoint_interval::GenomicInterval;

/// Order in which chromosomes are stepped through when merging evidence sources
///
/// Chromosomes in the reference list, normally the alignment header sequence names, sort by their
/// position in that list. Any other chromosome sorts after all listed chromosomes, and these are
/// ordered by name. The default order has no reference list, so all chromosomes are ordered by
/// name.
///
#[derive(Clone, Debug, Default)]
pub struct ChromOrder {
    ranks: HashMap<String, usize>,
}

impl ChromOrder {
    pub fn new(chrom_names: &[String]) -> Self {
        let mut ranks = HashMap::new();
        for (rank, chrom) in chrom_names.iter().enumerate() {
            ranks.entry(chrom.clone()).or_insert(rank);
        }
        Self { ranks }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.ranks.get(a), self.ranks.get(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }

    /// The earliest of `chroms` in this order
    pub fn first<'a>(&self, chroms: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
        chroms.into_iter().min_by(|a, b| self.compare(a, b))
    }

    /// Of the two sides of an event, the one whose chromosome is stepped through last
    ///
    /// All evidence for the event is available once this side's chromosome has been read, so
    /// readers group and key events on it. Sides on the same chromosome resolve to `side_r`.
    ///
    pub fn closing_side<'a>(
        &self,
        side_l: &'a GenomicInterval,
        side_r: &'a GenomicInterval,
    ) -> &'a GenomicInterval {
        if self.compare(&side_l.chrom, &side_r.chrom) == Ordering::Greater {
            side_l
        } else {
            side_r
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint_interval::Strand;

    fn interval(chrom: &str, start: i64) -> GenomicInterval {
        GenomicInterval {
            chrom: chrom.to_string(),
            start,
            end: start + 9,
            strand: Strand::Forward,
        }
    }

    #[test]
    fn test_reference_order() {
        let names = ["chr2", "chr10", "chr1"].map(String::from);
        let order = ChromOrder::new(&names);
        assert_eq!(order.compare("chr2", "chr10"), Ordering::Less);
        assert_eq!(order.compare("chr1", "chr10"), Ordering::Greater);
        assert_eq!(order.compare("chr1", "chr1"), Ordering::Equal);

        // Unlisted chromosomes follow all listed ones, by name
        assert_eq!(order.compare("chrUn", "chr1"), Ordering::Greater);
        assert_eq!(order.compare("chrM", "chrUn"), Ordering::Less);

        assert_eq!(order.first(["chr1", "chrM", "chr10"]), Some("chr10"));
        assert_eq!(order.first(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_default_order() {
        let order = ChromOrder::default();
        assert_eq!(order.compare("chr10", "chr2"), Ordering::Less);
        assert_eq!(order.first(["chr2", "chr10"]), Some("chr10"));
    }

    #[test]
    fn test_closing_side() {
        let names = ["chr1", "chr2", "chr3"].map(String::from);
        let order = ChromOrder::new(&names);

        let (a, b) = (interval("chr3", 100), interval("chr2", 500));
        assert_eq!(order.closing_side(&a, &b).chrom, "chr3");
        assert_eq!(order.closing_side(&b, &a).chrom, "chr3");

        let (a, b) = (interval("chr1", 100), interval("chr1", 500));
        assert_eq!(order.closing_side(&a, &b).start, 500);
    }
}
