//! Symbol frequency analysis over sample sequences

use super::types::Sample;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Occurrence count per distinct sample value
///
/// Keys iterate in ascending sample order, which fixes the leaf insertion
/// order used by the prefix tree builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    counts: BTreeMap<Sample, usize>,
    total: usize,
}

impl FrequencyTable {
    /// Count of `symbol`, zero when absent
    pub fn count(&self, symbol: Sample) -> usize {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of samples analyzed
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn contains(&self, symbol: Sample) -> bool {
        self.counts.contains_key(&symbol)
    }

    /// (symbol, count) pairs in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Sample, usize)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }

    /// Distinct symbols in ascending order
    pub fn symbols(&self) -> btree_map::Keys<'_, Sample, usize> {
        self.counts.keys()
    }

    /// Smallest and largest symbol present
    pub fn value_range(&self) -> Option<(Sample, Sample)> {
        let min = *self.counts.keys().next()?;
        let max = *self.counts.keys().next_back()?;
        Some((min, max))
    }
}

/// Build a frequency table in one pass over `samples`
pub fn analyze(samples: &[Sample]) -> FrequencyTable {
    let mut counts = BTreeMap::new();
    for &sample in samples {
        *counts.entry(sample).or_insert(0usize) += 1;
    }
    FrequencyTable {
        counts,
        total: samples.len(),
    }
}
