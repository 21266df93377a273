//! Per-portal index from arrival state to the variants usable from it.

use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;

/// Contiguous range of variant IDs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VariantSpan {
    pub start: u64,
    pub count: u64,
}

impl VariantSpan {
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn range(&self) -> Range<u64> {
        self.start..self.start + self.count
    }
}

/// Maps the room state at arrival through a portal to the variants that may
/// follow. Variants of one state must be added back to back.
pub trait VariantStateDict: fmt::Debug {
    fn add(&mut self, state: u64, variant: u64);

    /// Variants usable from `state`, empty when there are none.
    fn get_variant_span(&self, state: u64) -> VariantSpan;

    /// States with at least one variant, ascending.
    fn all_states(&self) -> Vec<u64>;

    fn total_variant_count(&self) -> u64;
}

#[derive(Debug, Default, Clone)]
pub struct VariantStateDictNormal {
    spans: FxHashMap<u64, VariantSpan>,
    total: u64,
}

impl VariantStateDictNormal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VariantStateDict for VariantStateDictNormal {
    fn add(&mut self, state: u64, variant: u64) {
        let span = self.spans.entry(state).or_insert(VariantSpan { start: variant, count: 0 });
        debug_assert_eq!(
            span.start + span.count,
            variant,
            "variants of state {} are not contiguous",
            state
        );
        span.count += 1;
        self.total += 1;
    }

    #[inline(always)]
    fn get_variant_span(&self, state: u64) -> VariantSpan {
        self.spans.get(&state).copied().unwrap_or_default()
    }

    fn all_states(&self) -> Vec<u64> {
        let mut states: Vec<u64> = self.spans.keys().copied().collect();
        states.sort_unstable();
        states
    }

    fn total_variant_count(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans() {
        let mut dict = VariantStateDictNormal::new();
        dict.add(1, 4);
        dict.add(1, 5);
        dict.add(0, 6);
        assert_eq!(dict.get_variant_span(1), VariantSpan { start: 4, count: 2 });
        assert_eq!(dict.get_variant_span(0).range().collect::<Vec<_>>(), vec![6]);
        assert!(dict.get_variant_span(9).is_empty());
        assert_eq!(dict.all_states(), vec![0, 1]);
        assert_eq!(dict.total_variant_count(), 3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not contiguous")]
    fn test_gap_panics() {
        let mut dict = VariantStateDictNormal::new();
        dict.add(2, 0);
        dict.add(2, 3);
    }
}
