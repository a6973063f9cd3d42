use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of sample ids for evidence readers
///
/// One generator is shared by all reader kinds in a run, and each reader draws one id when it is
/// created. Ids are handed out in increasing order starting from zero.
///
#[derive(Debug, Default)]
pub struct SampleIdGenerator {
    next: AtomicUsize,
}

impl SampleIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}
