//! Interfaces to the downstream breakpoint index and clustering engine, with minimal in-memory
//! implementations
//!

use std::collections::HashMap;
use std::rc::Rc;

use bio::data_structures::interval_tree::IntervalTree;

use crate::breakpoint::BreakPoint;
use crate::breakpoint_interval::GenomicInterval;

/// Spatial store of breakpoints, keyed by one of their anchored intervals
///
pub trait BreakpointIndex {
    fn insert(&mut self, key: &GenomicInterval, breakpoint: Rc<BreakPoint>);
}

/// Consumer of fully built breakpoints
///
pub trait ClusterEngine {
    fn cluster(
        &mut self,
        breakpoint: BreakPoint,
        left_index: &mut dyn BreakpointIndex,
        right_index: &mut dyn BreakpointIndex,
    );
}

/// Breakpoints indexed by chromosome and interval
///
#[derive(Default)]
pub struct ChromBreakpointIndex {
    chroms: HashMap<String, IntervalTree<i64, Rc<BreakPoint>>>,
    counts: HashMap<String, usize>,
}

impl ChromBreakpointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn chrom_count(&self, chrom: &str) -> usize {
        self.counts.get(chrom).copied().unwrap_or(0)
    }

    /// Find all breakpoints with a key interval intersecting the closed range [start,end]
    ///
    pub fn find_overlaps(&self, chrom: &str, start: i64, end: i64) -> Vec<Rc<BreakPoint>> {
        match self.chroms.get(chrom) {
            Some(tree) if start <= end => tree
                .find(start..end + 1)
                .map(|x| x.data().clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Remove all breakpoints keyed on `chrom`, returning the number removed
    ///
    /// Used to release per-chromosome working state once a chromosome has been fully processed.
    ///
    pub fn drain_chrom(&mut self, chrom: &str) -> usize {
        self.chroms.remove(chrom);
        self.counts.remove(chrom).unwrap_or(0)
    }
}

impl BreakpointIndex for ChromBreakpointIndex {
    /// A key with start after end is indexed over the same positions with its ends swapped
    fn insert(&mut self, key: &GenomicInterval, breakpoint: Rc<BreakPoint>) {
        let (start, end) = (key.start.min(key.end), key.start.max(key.end));
        self.chroms
            .entry(key.chrom.clone())
            .or_insert_with(IntervalTree::new)
            .insert(start..end + 1, breakpoint);
        *self.counts.entry(key.chrom.clone()).or_default() += 1;
    }
}

/// Cluster engine which only indexes each breakpoint, left and right intervals into the left and
/// right indexes respectively
///
#[derive(Default)]
pub struct InsertOnlyClusterEngine {
    clustered_count: usize,
}

impl InsertOnlyClusterEngine {
    pub fn clustered_count(&self) -> usize {
        self.clustered_count
    }
}

impl ClusterEngine for InsertOnlyClusterEngine {
    fn cluster(
        &mut self,
        breakpoint: BreakPoint,
        left_index: &mut dyn BreakpointIndex,
        right_index: &mut dyn BreakpointIndex,
    ) {
        let breakpoint = Rc::new(breakpoint);
        left_index.insert(&breakpoint.interval_l.interval, breakpoint.clone());
        right_index.insert(&breakpoint.interval_r.interval, breakpoint.clone());
        self.clustered_count += 1;
    }
}
